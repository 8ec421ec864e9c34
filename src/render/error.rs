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
use std::path::PathBuf;

/// Error types for rendering a single note clip
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Sample file not found: {}", .0.display())]
    SampleMissing(PathBuf),

    #[error("Offset of {offset} frames consumes all of {}", .path.display())]
    EmptyResult { path: PathBuf, offset: u64 },

    #[error("Unable to decode {}: {message}", .path.display())]
    Decode { path: PathBuf, message: String },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
