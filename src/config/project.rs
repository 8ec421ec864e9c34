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
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use config::{Config, File};
use serde::Deserialize;

use crate::encoder::ClipFormat;
use crate::lesson::{Layout, Lesson};

use super::error::ConfigError;
use super::instrument::Instrument;
use super::lesson::LessonConfig;

/// The settings passed to the external encoder.
#[derive(Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EncoderSettings {
    /// An explicit encoder program. Found on the PATH if not given.
    program: Option<PathBuf>,
    sample_rate: u32,
    bitrate_kbps: u32,
    /// Note clips are trimmed to this many seconds when transcoded. Zero keeps the whole clip.
    clip_seconds: u32,
    /// The x264 constant rate factor for lesson videos.
    video_quality: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        EncoderSettings {
            program: None,
            sample_rate: 44100,
            bitrate_kbps: 128,
            clip_seconds: 5,
            video_quality: 23,
        }
    }
}

impl EncoderSettings {
    pub fn program(&self) -> Option<&Path> {
        self.program.as_deref()
    }

    /// Resolves a relative program path against the project directory. Bare names are left for
    /// the PATH lookup.
    fn resolve_program(&mut self, base_dir: &Path) {
        if let Some(program) = self.program.as_mut() {
            if program.is_relative() && program.components().count() > 1 {
                *program = base_dir.join(&*program);
            }
        }
    }

    pub fn clip_format(&self) -> ClipFormat {
        ClipFormat {
            sample_rate: self.sample_rate,
            bitrate_kbps: self.bitrate_kbps,
        }
    }

    pub fn clip_seconds(&self) -> Option<u32> {
        Some(self.clip_seconds).filter(|seconds| *seconds > 0)
    }

    pub fn video_quality(&self) -> u32 {
        self.video_quality
    }
}

/// The project file. Relative paths are resolved against the directory of the file.
#[derive(Deserialize, Clone, Debug)]
pub struct Project {
    /// The root of the instrument, letter and silence clips.
    audio_files: PathBuf,
    /// Where lesson files are written.
    #[serde(default = "default_lessons_dir")]
    lessons_dir: PathBuf,
    /// The extension of lesson clips and lesson audio.
    #[serde(default = "default_clip_extension")]
    clip_extension: String,
    #[serde(default)]
    encoder: EncoderSettings,
    #[serde(default)]
    instruments: BTreeMap<String, Instrument>,
    #[serde(default)]
    lessons: Vec<LessonConfig>,

    #[serde(skip)]
    base_dir: PathBuf,
}

impl Project {
    /// Parses and validates a project from a YAML file.
    pub fn deserialize(path: &Path) -> Result<Project, ConfigError> {
        let mut project = Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<Project>()?;
        project.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        project.encoder.resolve_program(&project.base_dir);
        project.validate()?;
        Ok(project)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.clip_extension.is_empty() || self.clip_extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "clip extension '{}' is not a bare extension",
                self.clip_extension
            )));
        }

        for (name, instrument) in &self.instruments {
            instrument.validate(name)?;
        }

        let mut levels = HashSet::new();
        for lesson in &self.lessons {
            lesson.to_lesson()?;
            if !levels.insert(lesson.level()) {
                return Err(ConfigError::Invalid(format!(
                    "level {} is defined more than once",
                    lesson.level()
                )));
            }
        }
        Ok(())
    }

    pub fn audio_files(&self) -> PathBuf {
        self.base_dir.join(&self.audio_files)
    }

    pub fn lessons_dir(&self) -> PathBuf {
        self.base_dir.join(&self.lessons_dir)
    }

    pub fn clip_extension(&self) -> &str {
        &self.clip_extension
    }

    pub fn encoder(&self) -> &EncoderSettings {
        &self.encoder
    }

    /// The on-disk layout of clips and lesson files.
    pub fn layout(&self) -> Layout {
        Layout::new(
            self.audio_files(),
            self.lessons_dir(),
            self.clip_extension.clone(),
        )
    }

    pub fn instruments(&self) -> &BTreeMap<String, Instrument> {
        &self.instruments
    }

    pub fn instrument(&self, name: &str) -> Option<&Instrument> {
        self.instruments.get(name)
    }

    /// The SFZ definition of an instrument.
    pub fn sfz_path(&self, instrument: &Instrument) -> PathBuf {
        self.audio_files().join(instrument.sfz())
    }

    /// All lessons, in the order they were configured.
    pub fn lessons(&self) -> Result<Vec<Lesson>, ConfigError> {
        self.lessons.iter().map(LessonConfig::to_lesson).collect()
    }
}

fn default_lessons_dir() -> PathBuf {
    PathBuf::from("lessons")
}

fn default_clip_extension() -> String {
    "mp3".to_string()
}
