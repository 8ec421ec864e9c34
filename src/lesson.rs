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

//! Lessons and the files they produce.
//!
//! A lesson is a sequence of prompts. Each prompt plays a random note on a random instrument,
//! waits for the answer spacing, speaks the note's letter and then waits for the prompt spacing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, info};

use crate::assembler::{AssemblyError, ClipSegment, TrackAssembler};
use crate::encoder::{Encoder, ExternalProcessError};
use crate::note::Note;
use crate::silence::SilenceLibrary;
use crate::thumbnail::{self, ThumbnailError};

#[derive(Debug, thiserror::Error)]
pub enum LessonError {
    #[error("Invalid lesson: {0}")]
    Invalid(String),

    #[error("Assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Encoder failed: {0}")]
    Encoder(#[from] ExternalProcessError),

    #[error("Thumbnail failed: {0}")]
    Thumbnail(#[from] ThumbnailError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The parameters of one lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct Lesson {
    level: u32,
    notes: Vec<Note>,
    instruments: Vec<String>,
    prompt_spacing: u32,
    answer_spacing: u32,
    prompts: u32,
}

impl Lesson {
    /// Creates a lesson. A lesson needs at least one note, one instrument and one prompt.
    pub fn new(
        level: u32,
        notes: Vec<Note>,
        instruments: Vec<String>,
        prompt_spacing: u32,
        answer_spacing: u32,
        prompts: u32,
    ) -> Result<Lesson, LessonError> {
        if notes.is_empty() {
            return Err(LessonError::Invalid(format!("level {level} has no notes")));
        }
        if instruments.is_empty() {
            return Err(LessonError::Invalid(format!(
                "level {level} has no instruments"
            )));
        }
        if let Some(instrument) = instruments
            .iter()
            .find(|instrument| instrument.is_empty() || instrument.contains(['/', '\\']))
        {
            return Err(LessonError::Invalid(format!(
                "level {level} has an invalid instrument name '{instrument}'"
            )));
        }
        if prompts == 0 {
            return Err(LessonError::Invalid(format!("level {level} has no prompts")));
        }

        Ok(Lesson {
            level,
            notes,
            instruments,
            prompt_spacing,
            answer_spacing,
            prompts,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Seconds of silence after the spoken letter.
    pub fn prompt_spacing(&self) -> u32 {
        self.prompt_spacing
    }

    /// Seconds of silence between the note and its spoken letter.
    pub fn answer_spacing(&self) -> u32 {
        self.answer_spacing
    }

    pub fn prompts(&self) -> u32 {
        self.prompts
    }

    /// The stem shared by all files of this lesson, e.g. `1-c4-a4-piano-60-100`.
    pub fn file_stem(&self) -> String {
        let mut parts = vec![self.level.to_string()];
        parts.extend(self.notes.iter().map(Note::file_stem));
        parts.extend(self.instruments.iter().cloned());
        parts.push(self.prompt_spacing.to_string());
        parts.push(self.prompts.to_string());
        parts.join("-")
    }

    /// The total silence in the lesson, which is a lower bound on its length.
    pub fn estimated_silence(&self) -> Duration {
        let per_prompt = u64::from(self.prompt_spacing) + u64::from(self.answer_spacing);
        Duration::from_secs(u64::from(self.prompts) * per_prompt)
    }
}

/// Where clips and lesson files live on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    audio_files: PathBuf,
    lessons_dir: PathBuf,
    extension: String,
}

impl Layout {
    pub fn new(
        audio_files: impl Into<PathBuf>,
        lessons_dir: impl Into<PathBuf>,
        extension: impl Into<String>,
    ) -> Layout {
        Layout {
            audio_files: audio_files.into(),
            lessons_dir: lessons_dir.into(),
            extension: extension.into(),
        }
    }

    pub fn audio_files(&self) -> &Path {
        &self.audio_files
    }

    pub fn lessons_dir(&self) -> &Path {
        &self.lessons_dir
    }

    /// The extension of lesson clips and lesson audio.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// The directory holding an instrument's lesson clips.
    pub fn instrument_dir(&self, instrument: &str) -> PathBuf {
        self.audio_files.join("instruments").join(instrument)
    }

    /// The directory holding an instrument's rendered WAV clips.
    pub fn rendered_dir(&self, instrument: &str) -> PathBuf {
        self.instrument_dir(instrument).join("wav")
    }

    pub fn note_clip(&self, instrument: &str, note: &Note) -> PathBuf {
        self.instrument_dir(instrument)
            .join(format!("{}.{}", note.file_stem(), self.extension))
    }

    /// The spoken letter for a note. The letter is the same in every octave.
    pub fn letter_clip(&self, note: &Note) -> PathBuf {
        self.audio_files
            .join("note-letters")
            .join(format!("{}.{}", note.letter_stem(), self.extension))
    }

    pub fn silence_library(&self) -> SilenceLibrary {
        SilenceLibrary::new(self.audio_files.join("silence"), self.extension.clone())
    }

    pub fn lesson_audio(&self, lesson: &Lesson) -> PathBuf {
        self.lessons_dir
            .join(format!("{}.{}", lesson.file_stem(), self.extension))
    }

    pub fn lesson_thumbnail(&self, lesson: &Lesson) -> PathBuf {
        self.lessons_dir.join(format!("{}.png", lesson.file_stem()))
    }

    pub fn lesson_video(&self, lesson: &Lesson) -> PathBuf {
        self.lessons_dir.join(format!("{}.mp4", lesson.file_stem()))
    }
}

/// The files produced for one lesson.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonFiles {
    pub audio: PathBuf,
    pub thumbnail: PathBuf,
    pub video: PathBuf,
}

/// The clips of one prompt: the note followed by the answer spacing, then the spoken letter
/// followed by the prompt spacing.
pub fn prompt_clips(
    layout: &Layout,
    lesson: &Lesson,
    note: &Note,
    instrument: &str,
) -> [ClipSegment; 2] {
    [
        ClipSegment::new(layout.note_clip(instrument, note), lesson.answer_spacing()),
        ClipSegment::new(layout.letter_clip(note), lesson.prompt_spacing()),
    ]
}

/// Assembles the audio of a lesson, drawing each prompt's note and instrument from `rng`.
/// Returns the path of the finished audio file.
pub fn build_audio<R: Rng + ?Sized>(
    layout: &Layout,
    lesson: &Lesson,
    rng: &mut R,
) -> Result<PathBuf, LessonError> {
    let silence = layout.silence_library();
    let mut assembler = TrackAssembler::new(layout.lessons_dir(), &silence)?;

    for prompt in 0..lesson.prompts() {
        let (Some(note), Some(instrument)) = (
            lesson.notes().choose(rng),
            lesson.instruments().choose(rng),
        ) else {
            return Err(LessonError::Invalid(format!(
                "level {} has nothing to draw prompts from",
                lesson.level()
            )));
        };

        debug!(
            prompt,
            note = %note,
            instrument = instrument.as_str(),
            "Appending prompt."
        );
        assembler.append_prompt(&prompt_clips(layout, lesson, note, instrument))?;
    }

    let output = layout.lesson_audio(lesson);
    let bytes = assembler.finalize(&output)?;
    info!(
        level = lesson.level(),
        audio = %output.display(),
        bytes,
        "Built lesson audio."
    );
    Ok(output)
}

/// Produces every file of a lesson: the thumbnail, the audio and finally the video combining
/// both.
pub fn generate_lesson_files(
    layout: &Layout,
    encoder: &Encoder,
    lesson: &Lesson,
    video_quality: u32,
) -> Result<LessonFiles, LessonError> {
    fs::create_dir_all(layout.lessons_dir())?;

    let thumbnail = layout.lesson_thumbnail(lesson);
    thumbnail::draw(lesson, &thumbnail)?;
    info!(thumbnail = %thumbnail.display(), "Drew lesson thumbnail.");

    let audio = build_audio(layout, lesson, &mut rand::thread_rng())?;

    let video = layout.lesson_video(lesson);
    encoder.mux_video(&audio, &thumbnail, &video, video_quality)?;
    info!(video = %video.display(), "Muxed lesson video.");

    Ok(LessonFiles {
        audio,
        thumbnail,
        video,
    })
}
