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

//! Builds long tracks out of clips and silence using two rotating temporary buffers.
//!
//! Each prompt is written into the destination buffer as the full content of the source buffer
//! followed by the prompt's clips, after which the buffers swap roles. No file is ever read and
//! written at the same time, and temporary storage stays at two files however many prompts a
//! track has.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::iter;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::silence::SilenceLibrary;

/// A clip followed by a gap of silence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipSegment {
    pub path: PathBuf,
    /// Seconds of silence after the clip.
    pub trailing_silence: u32,
}

impl ClipSegment {
    pub fn new(path: impl Into<PathBuf>, trailing_silence: u32) -> ClipSegment {
        ClipSegment {
            path: path.into(),
            trailing_silence,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AssemblyError {
    #[error("Missing input clip: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Appends prompts to a track. The buffers are deleted when the assembler is dropped, so a
/// failed assembly never leaves anything behind.
pub struct TrackAssembler<'a> {
    work_dir: TempDir,
    buffers: [PathBuf; 2],
    /// Index of the buffer holding everything assembled so far.
    source: usize,
    silence: &'a SilenceLibrary,
    prompts: usize,
}

impl<'a> TrackAssembler<'a> {
    /// Creates an assembler whose buffers live in a fresh temporary directory under `work_root`.
    pub fn new(
        work_root: &Path,
        silence: &'a SilenceLibrary,
    ) -> Result<TrackAssembler<'a>, AssemblyError> {
        fs::create_dir_all(work_root)?;
        let work_dir = tempfile::Builder::new()
            .prefix(".assembly-")
            .tempdir_in(work_root)?;

        // Both buffers start empty, so the first prompt copies an empty source.
        let buffers = [
            work_dir.path().join("buffer-0"),
            work_dir.path().join("buffer-1"),
        ];
        for buffer in &buffers {
            File::create(buffer)?;
        }

        Ok(TrackAssembler {
            work_dir,
            buffers,
            source: 0,
            silence,
            prompts: 0,
        })
    }

    /// Appends one prompt: each clip in order, each followed by its trailing silence. All inputs
    /// are checked before anything is written.
    pub fn append_prompt(&mut self, clips: &[ClipSegment]) -> Result<(), AssemblyError> {
        let mut inputs = Vec::new();
        for clip in clips {
            inputs.push(clip.path.clone());
            inputs.extend(self.silence.segments(clip.trailing_silence));
        }
        if let Some(missing) = inputs.iter().find(|input| !input.is_file()) {
            return Err(AssemblyError::MissingInput(missing.clone()));
        }

        let destination = 1 - self.source;
        let mut writer = BufWriter::new(File::create(&self.buffers[destination])?);
        for input in iter::once(&self.buffers[self.source]).chain(&inputs) {
            io::copy(&mut File::open(input)?, &mut writer)?;
        }
        writer.flush()?;
        drop(writer);

        // The old source is emptied and becomes the next destination.
        File::create(&self.buffers[self.source])?;
        self.source = destination;
        self.prompts += 1;

        debug!(
            prompt = self.prompts,
            buffer = %self.buffers[self.source].display(),
            inputs = inputs.len(),
            "Appended prompt."
        );
        Ok(())
    }

    /// The number of prompts appended so far.
    pub fn prompts(&self) -> usize {
        self.prompts
    }

    /// Copies the finished track to `output` and discards the buffers. Returns the number of
    /// bytes written.
    pub fn finalize(self, output: &Path) -> Result<u64, AssemblyError> {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)?;
        }
        let bytes = fs::copy(&self.buffers[self.source], output)?;
        debug!(
            output = %output.display(),
            work_dir = %self.work_dir.path().display(),
            bytes,
            "Finalized track."
        );
        Ok(bytes)
    }
}
