// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a note name can't be understood.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid note name '{0}'")]
pub struct NoteParseError(String);

/// The letter name of a pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Letter {
    /// Semitones above C within the same octave.
    fn semitone(self) -> i32 {
        match self {
            Letter::C => 0,
            Letter::D => 2,
            Letter::E => 4,
            Letter::F => 5,
            Letter::G => 7,
            Letter::A => 9,
            Letter::B => 11,
        }
    }

    fn as_char(self) -> char {
        match self {
            Letter::C => 'c',
            Letter::D => 'd',
            Letter::E => 'e',
            Letter::F => 'f',
            Letter::G => 'g',
            Letter::A => 'a',
            Letter::B => 'b',
        }
    }

    fn from_char(c: char) -> Option<Letter> {
        match c.to_ascii_lowercase() {
            'c' => Some(Letter::C),
            'd' => Some(Letter::D),
            'e' => Some(Letter::E),
            'f' => Some(Letter::F),
            'g' => Some(Letter::G),
            'a' => Some(Letter::A),
            'b' => Some(Letter::B),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Accidental {
    Natural,
    Sharp,
    Flat,
}

impl Accidental {
    fn offset(self) -> i32 {
        match self {
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::Flat => -1,
        }
    }
}

/// Spellings for each pitch class. Black keys are always spelled as flats.
const PITCH_CLASSES: [(Letter, Accidental); 12] = [
    (Letter::C, Accidental::Natural),
    (Letter::D, Accidental::Flat),
    (Letter::D, Accidental::Natural),
    (Letter::E, Accidental::Flat),
    (Letter::E, Accidental::Natural),
    (Letter::F, Accidental::Natural),
    (Letter::G, Accidental::Flat),
    (Letter::G, Accidental::Natural),
    (Letter::A, Accidental::Flat),
    (Letter::A, Accidental::Natural),
    (Letter::B, Accidental::Flat),
    (Letter::B, Accidental::Natural),
];

/// A pitch identity such as C4 or Bb3. Middle C (C4) is MIDI note 60.
///
/// Notes are always held in their natural or flat spelling, so the file stem of a note is stable
/// no matter how it was written in a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Note {
    letter: Letter,
    accidental: Accidental,
    octave: i8,
}

impl Note {
    /// Creates the note for the given MIDI note number.
    pub fn from_midi(midi: u8) -> Note {
        let (letter, accidental) = PITCH_CLASSES[usize::from(midi % 12)];
        Note {
            letter,
            accidental,
            octave: (midi / 12) as i8 - 1,
        }
    }

    /// Returns all notes between the two given notes, inclusive.
    pub fn range(lowest: Note, highest: Note) -> impl Iterator<Item = Note> {
        // Out of range notes produce an empty range.
        let (lowest, highest) = match (lowest.midi(), highest.midi()) {
            (Some(lowest), Some(highest)) => (lowest, highest),
            _ => (1, 0),
        };
        let range: RangeInclusive<u8> = lowest..=highest;
        range.map(Note::from_midi)
    }

    /// The MIDI note number for this note, if it lies within 0..=127.
    pub fn midi(&self) -> Option<u8> {
        let midi = (i32::from(self.octave) + 1) * 12
            + self.letter.semitone()
            + self.accidental.offset();
        u8::try_from(midi).ok().filter(|midi| *midi <= 127)
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }

    pub fn accidental(&self) -> Accidental {
        self.accidental
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    /// Whether this note is a white key.
    pub fn is_natural(&self) -> bool {
        self.accidental == Accidental::Natural
    }

    /// The note name without its octave, e.g. "c" or "bb".
    pub fn letter_stem(&self) -> String {
        let mut stem = self.letter.as_char().to_string();
        match self.accidental {
            Accidental::Natural => {}
            Accidental::Flat => stem.push('b'),
            Accidental::Sharp => stem.push('#'),
        }
        stem
    }

    /// The canonical file stem for this note, e.g. "c4" or "bb3". Both the rendered instrument
    /// clips and the spoken letter clips are named by this stem.
    pub fn file_stem(&self) -> String {
        format!("{}{}", self.letter_stem(), self.octave)
    }
}

impl FromStr for Note {
    type Err = NoteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || NoteParseError(s.to_string());
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let letter = chars
            .next()
            .and_then(Letter::from_char)
            .ok_or_else(invalid)?;
        let rest = chars.as_str();

        // "b4" is a natural B while "bb4" is B flat, so the accidental is only consumed when
        // something follows it.
        let (accidental, octave) = match rest.chars().next() {
            Some('#') => (Accidental::Sharp, &rest[1..]),
            Some('b') | Some('B') if rest.len() > 1 => (Accidental::Flat, &rest[1..]),
            _ => (Accidental::Natural, rest),
        };
        let octave: i8 = octave.parse().map_err(|_| invalid())?;

        let note = Note {
            letter,
            accidental,
            octave,
        };
        let midi = note.midi().ok_or_else(invalid)?;

        // Enharmonic spellings share the clip of their canonical name.
        Ok(Note::from_midi(midi))
    }
}

impl TryFrom<String> for Note {
    type Error = NoteParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Note> for String {
    fn from(note: Note) -> Self {
        note.file_stem()
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_stem())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_midi_numbers() {
        assert_eq!(Some(60), "c4".parse::<Note>().unwrap().midi());
        assert_eq!(Some(69), "a4".parse::<Note>().unwrap().midi());
        assert_eq!(Some(21), "a0".parse::<Note>().unwrap().midi());
        assert_eq!(Some(108), "c8".parse::<Note>().unwrap().midi());
        assert_eq!(Some(0), "c-1".parse::<Note>().unwrap().midi());
        assert_eq!(Some(58), "bb3".parse::<Note>().unwrap().midi());
    }

    #[test]
    fn test_from_midi_spells_flats() {
        assert_eq!("c4", Note::from_midi(60).file_stem());
        assert_eq!("db4", Note::from_midi(61).file_stem());
        assert_eq!("eb4", Note::from_midi(63).file_stem());
        assert_eq!("gb4", Note::from_midi(66).file_stem());
        assert_eq!("ab4", Note::from_midi(68).file_stem());
        assert_eq!("bb4", Note::from_midi(70).file_stem());
        assert_eq!("b4", Note::from_midi(71).file_stem());
        assert_eq!("a0", Note::from_midi(21).file_stem());
    }

    #[test]
    fn test_sharps_normalize_to_flats() {
        let note: Note = "c#4".parse().unwrap();
        assert_eq!("db4", note.file_stem());
        assert_eq!(Accidental::Flat, note.accidental());

        let note: Note = "E#4".parse().unwrap();
        assert_eq!("f4", note.file_stem());
    }

    #[test]
    fn test_flat_spellings_of_naturals_normalize() {
        let note: Note = "cb4".parse().unwrap();
        assert_eq!("b3", note.file_stem());
        assert_eq!(Some(59), note.midi());

        let note: Note = "fb4".parse().unwrap();
        assert_eq!("e4", note.file_stem());

        let note: Note = "bb3".parse().unwrap();
        assert_eq!("bb3", note.file_stem());
    }

    #[test]
    fn test_natural_b_is_not_a_flat() {
        let note: Note = "b4".parse().unwrap();
        assert_eq!(Letter::B, note.letter());
        assert!(note.is_natural());
        assert_eq!(Some(71), note.midi());
    }

    #[test]
    fn test_letter_stem() {
        assert_eq!("c", Note::from_midi(60).letter_stem());
        assert_eq!("bb", Note::from_midi(70).letter_stem());
    }

    #[test]
    fn test_invalid_notes() {
        assert!("".parse::<Note>().is_err());
        assert!("h4".parse::<Note>().is_err());
        assert!("c".parse::<Note>().is_err());
        assert!("cx4".parse::<Note>().is_err());
        assert!("g9".parse::<Note>().is_ok());
        assert!("a9".parse::<Note>().is_err());
    }

    #[test]
    fn test_range() {
        let notes: Vec<String> = Note::range(Note::from_midi(60), Note::from_midi(64))
            .map(|note| note.file_stem())
            .collect();
        assert_eq!(vec!["c4", "db4", "d4", "eb4", "e4"], notes);

        assert_eq!(88, Note::range(Note::from_midi(21), Note::from_midi(108)).count());
        assert_eq!(0, Note::range(Note::from_midi(64), Note::from_midi(60)).count());
    }
}
