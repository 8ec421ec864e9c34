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
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::note::Note;
use crate::sfz::SelectionPolicy;

use super::error::ConfigError;

/// An instrument rendered from an SFZ definition.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Instrument {
    /// The SFZ definition, relative to the audio files directory.
    sfz: PathBuf,
    /// The lowest note to render.
    #[serde(default = "default_lowest")]
    lowest: Note,
    /// The highest note to render.
    #[serde(default = "default_highest")]
    highest: Note,
    /// How regions are picked for each note.
    #[serde(default)]
    selection: SelectionPolicy,
}

impl Instrument {
    pub fn sfz(&self) -> &Path {
        &self.sfz
    }

    pub fn lowest(&self) -> Note {
        self.lowest
    }

    pub fn highest(&self) -> Note {
        self.highest
    }

    pub fn selection(&self) -> SelectionPolicy {
        self.selection
    }

    /// Every note from the lowest to the highest, inclusive.
    pub fn notes(&self) -> impl Iterator<Item = Note> {
        Note::range(self.lowest, self.highest)
    }

    pub(super) fn validate(&self, name: &str) -> Result<(), ConfigError> {
        match (self.lowest.midi(), self.highest.midi()) {
            (Some(lowest), Some(highest)) if lowest <= highest => Ok(()),
            (Some(_), Some(_)) => Err(ConfigError::Invalid(format!(
                "instrument {name} has its lowest note {} above its highest note {}",
                self.lowest, self.highest
            ))),
            _ => Err(ConfigError::Invalid(format!(
                "instrument {name} has a note range outside of MIDI"
            ))),
        }
    }
}

/// A0, the lowest key of a piano.
fn default_lowest() -> Note {
    Note::from_midi(21)
}

/// C8, the highest key of a piano.
fn default_highest() -> Note {
    Note::from_midi(108)
}

#[cfg(test)]
mod tests {
    use config::{Config, File, FileFormat};

    use super::*;

    fn parse(yaml: &str) -> Instrument {
        Config::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let instrument = parse("sfz: sfz/piano/map.sfz");

        assert_eq!(Path::new("sfz/piano/map.sfz"), instrument.sfz());
        assert_eq!("a0", instrument.lowest().file_stem());
        assert_eq!("c8", instrument.highest().file_stem());
        assert_eq!(SelectionPolicy::NearestRoot, instrument.selection());
        assert_eq!(88, instrument.notes().count());
        assert!(instrument.validate("piano").is_ok());
    }

    #[test]
    fn test_explicit() {
        let instrument = parse(
            r#"
            sfz: guitar.sfz
            lowest: e2
            highest: e6
            selection: first_match
            "#,
        );

        assert_eq!(Some(40), instrument.lowest().midi());
        assert_eq!(Some(88), instrument.highest().midi());
        assert_eq!(SelectionPolicy::FirstMatch, instrument.selection());
        assert_eq!(49, instrument.notes().count());
    }

    #[test]
    fn test_reversed_range_is_invalid() {
        let instrument = parse(
            r#"
            sfz: guitar.sfz
            lowest: c5
            highest: c4
            "#,
        );
        assert!(matches!(
            instrument.validate("guitar"),
            Err(ConfigError::Invalid(_))
        ));
    }
}
