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
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::encoder::{ClipFormat, Encoder, ExternalProcessError};

/// One of the canned silence clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SilenceClip {
    OneSecond,
    FiveSeconds,
    TenSeconds,
    OneMinute,
}

impl SilenceClip {
    /// All canned clips, longest first.
    pub const ALL: [SilenceClip; 4] = [
        SilenceClip::OneMinute,
        SilenceClip::TenSeconds,
        SilenceClip::FiveSeconds,
        SilenceClip::OneSecond,
    ];

    pub fn seconds(self) -> u32 {
        match self {
            SilenceClip::OneSecond => 1,
            SilenceClip::FiveSeconds => 5,
            SilenceClip::TenSeconds => 10,
            SilenceClip::OneMinute => 60,
        }
    }

    pub fn file_name(self, extension: &str) -> String {
        format!("{}.{}", self.seconds(), extension)
    }
}

/// Splits a silence of the given length into canned clips, greedily taking the longest clip that
/// still fits. The clip durations always add up to `seconds`.
pub fn decompose(seconds: u32) -> Vec<SilenceClip> {
    let mut remaining = seconds;
    let mut clips = Vec::new();
    for clip in SilenceClip::ALL {
        let count = remaining / clip.seconds();
        clips.extend(std::iter::repeat(clip).take(count as usize));
        remaining -= count * clip.seconds();
    }
    clips
}

/// The directory holding the canned silence clips.
#[derive(Debug, Clone)]
pub struct SilenceLibrary {
    dir: PathBuf,
    extension: String,
}

impl SilenceLibrary {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> SilenceLibrary {
        SilenceLibrary {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The path of the given clip.
    pub fn path(&self, clip: SilenceClip) -> PathBuf {
        self.dir.join(clip.file_name(&self.extension))
    }

    /// The clip files that make up a silence of the given length, in order.
    pub fn segments(&self, seconds: u32) -> Vec<PathBuf> {
        decompose(seconds)
            .into_iter()
            .map(|clip| self.path(clip))
            .collect()
    }

    /// Generates any canned clip that does not exist yet. Returns the clips that were created.
    pub fn ensure(
        &self,
        encoder: &Encoder,
        format: &ClipFormat,
    ) -> Result<Vec<SilenceClip>, ExternalProcessError> {
        fs::create_dir_all(&self.dir)?;

        let mut created = Vec::new();
        for clip in SilenceClip::ALL {
            let path = self.path(clip);
            if path.is_file() {
                continue;
            }
            encoder.silence(clip.seconds(), format, &path)?;
            info!(clip = %path.display(), "Created silence clip.");
            created.push(clip);
        }
        Ok(created)
    }
}
