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

//! Blocking invocations of the external media encoder (ffmpeg).

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info, warn};

/// Environment variable that overrides the encoder program.
pub const ENCODER_ENV: &str = "PITCHDRILL_FFMPEG";

const DEFAULT_PROGRAM: &str = "ffmpeg";

#[derive(Debug, thiserror::Error)]
pub enum ExternalProcessError {
    #[error("Unable to find the encoder program (tried config, $PITCHDRILL_FFMPEG and PATH)")]
    NotFound,

    #[error("Unable to start {}: {source}", .program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} exited with {}: {output}", .program.display(), exit_description(*.exit_code))]
    Failed {
        program: PathBuf,
        exit_code: Option<i32>,
        output: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// The audio format of generated clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFormat {
    pub sample_rate: u32,
    pub bitrate_kbps: u32,
}

impl Default for ClipFormat {
    fn default() -> Self {
        ClipFormat {
            sample_rate: 44100,
            bitrate_kbps: 128,
        }
    }
}

/// The outcome of transcoding a directory of rendered clips.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TranscodeSummary {
    pub transcoded: usize,
    pub failed: Vec<PathBuf>,
}

/// Runs the encoder program. Every call blocks until the child exits.
#[derive(Debug, Clone)]
pub struct Encoder {
    program: PathBuf,
}

impl Encoder {
    pub fn new(program: impl Into<PathBuf>) -> Encoder {
        Encoder {
            program: program.into(),
        }
    }

    /// Finds the encoder program. A configured program wins, then the environment override, then
    /// ffmpeg on the PATH.
    pub fn locate(configured: Option<&Path>) -> Result<Encoder, ExternalProcessError> {
        if let Some(configured) = configured {
            return which::which(configured)
                .map(Encoder::new)
                .map_err(|_| ExternalProcessError::NotFound);
        }

        if let Ok(program) = std::env::var(ENCODER_ENV) {
            if !program.is_empty() {
                return which::which(program)
                    .map(Encoder::new)
                    .map_err(|_| ExternalProcessError::NotFound);
            }
        }

        which::which(DEFAULT_PROGRAM)
            .map(Encoder::new)
            .map_err(|_| ExternalProcessError::NotFound)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Runs the program with the given arguments and waits for it. Any exit status other than
    /// zero is a failure carrying the captured output.
    pub fn run<I, S>(&self, args: I) -> Result<(), ExternalProcessError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args);
        debug!(command = ?command, "Running encoder.");

        let output = command
            .output()
            .map_err(|source| ExternalProcessError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(());
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Err(ExternalProcessError::Failed {
            program: self.program.clone(),
            exit_code: output.status.code(),
            output: combined.trim().to_string(),
        })
    }

    /// Generates a silent stereo clip of the given length.
    pub fn silence(
        &self,
        seconds: u32,
        format: &ClipFormat,
        output: &Path,
    ) -> Result<(), ExternalProcessError> {
        self.run(silence_args(seconds, format, output))
    }

    /// Converts a clip to the given format, optionally trimming it to a maximum length.
    pub fn transcode(
        &self,
        input: &Path,
        output: &Path,
        format: &ClipFormat,
        max_seconds: Option<u32>,
    ) -> Result<(), ExternalProcessError> {
        self.run(transcode_args(input, output, format, max_seconds))
    }

    /// Transcodes every WAV file in `input_dir` into `output_dir`, keeping file stems and using
    /// the given extension. A failed file is logged and does not stop the others.
    pub fn transcode_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        extension: &str,
        format: &ClipFormat,
        max_seconds: Option<u32>,
    ) -> Result<TranscodeSummary, ExternalProcessError> {
        fs::create_dir_all(output_dir)?;

        let mut inputs = Vec::new();
        for entry in fs::read_dir(input_dir)? {
            let path = entry?.path();
            let is_wav = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
            if is_wav && path.is_file() {
                inputs.push(path);
            }
        }
        inputs.sort();

        let mut summary = TranscodeSummary::default();
        for input in inputs {
            let Some(stem) = input.file_stem() else {
                continue;
            };
            let output = output_dir.join(stem).with_extension(extension);
            match self.transcode(&input, &output, format, max_seconds) {
                Ok(()) => {
                    info!(clip = %output.display(), "Transcoded clip.");
                    summary.transcoded += 1;
                }
                Err(e) => {
                    warn!(input = %input.display(), err = %e, "Unable to transcode clip.");
                    summary.failed.push(input);
                }
            }
        }

        Ok(summary)
    }

    /// Combines a still image and an audio track into a video.
    pub fn mux_video(
        &self,
        audio: &Path,
        image: &Path,
        output: &Path,
        quality: u32,
    ) -> Result<(), ExternalProcessError> {
        self.run(mux_args(audio, image, output, quality))
    }
}

fn exit_description(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

fn silence_args(seconds: u32, format: &ClipFormat, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = [
        "-y".to_string(),
        "-f".to_string(),
        "lavfi".to_string(),
        "-i".to_string(),
        format!("anullsrc=r={}:cl=stereo", format.sample_rate),
        "-t".to_string(),
        seconds.to_string(),
        "-b:a".to_string(),
        format!("{}k", format.bitrate_kbps),
        "-acodec".to_string(),
        "libmp3lame".to_string(),
        "-f".to_string(),
        "mp3".to_string(),
    ]
    .into_iter()
    .map(OsString::from)
    .collect();
    args.push(output.as_os_str().to_owned());
    args
}

fn transcode_args(
    input: &Path,
    output: &Path,
    format: &ClipFormat,
    max_seconds: Option<u32>,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-y".into(), "-i".into(), input.into(), "-vn".into()];
    if let Some(max_seconds) = max_seconds {
        args.push("-t".into());
        args.push(max_seconds.to_string().into());
    }
    args.extend(
        [
            "-ar".to_string(),
            format.sample_rate.to_string(),
            "-ac".to_string(),
            "2".to_string(),
            "-b:a".to_string(),
            format!("{}k", format.bitrate_kbps),
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}

fn mux_args(audio: &Path, image: &Path, output: &Path, quality: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-y".into(),
        "-loop".into(),
        "1".into(),
        "-i".into(),
        image.into(),
        "-i".into(),
        audio.into(),
    ];
    args.extend(
        [
            "-c:v".to_string(),
            "libx264".to_string(),
            "-crf".to_string(),
            quality.to_string(),
            "-tune".to_string(),
            "stillimage".to_string(),
            "-c:a".to_string(),
            "aac".to_string(),
            "-b:a".to_string(),
            "192k".to_string(),
            "-shortest".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
        ]
        .map(OsString::from),
    );
    args.push(output.into());
    args
}
