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
use serde::Deserialize;

use crate::lesson::{Lesson, LessonError};
use crate::note::Note;

use super::error::ConfigError;

/// The configuration of a single lesson.
#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct LessonConfig {
    /// The level of the lesson, unique within a project.
    level: u32,
    /// The notes that prompts are drawn from.
    notes: Vec<Note>,
    /// The instruments that prompts are played on.
    instruments: Vec<String>,
    /// Seconds of silence after each spoken letter.
    #[serde(default = "default_prompt_spacing")]
    prompt_spacing: u32,
    /// Seconds of silence between a note and its spoken letter.
    #[serde(default = "default_answer_spacing")]
    answer_spacing: u32,
    /// The number of prompts in the lesson.
    #[serde(default = "default_prompts")]
    prompts: u32,
}

impl LessonConfig {
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Converts this configuration into a lesson.
    pub fn to_lesson(&self) -> Result<Lesson, ConfigError> {
        Lesson::new(
            self.level,
            self.notes.clone(),
            self.instruments.clone(),
            self.prompt_spacing,
            self.answer_spacing,
            self.prompts,
        )
        .map_err(|e| match e {
            LessonError::Invalid(message) => ConfigError::Invalid(message),
            other => ConfigError::Invalid(other.to_string()),
        })
    }
}

fn default_prompt_spacing() -> u32 {
    60
}

fn default_answer_spacing() -> u32 {
    3
}

fn default_prompts() -> u32 {
    100
}
