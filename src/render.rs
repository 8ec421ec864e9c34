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

//! Renders one WAV clip per note by pitch shifting the sample of the selected region.

use std::fs;
use std::path::Path;

use tracing::{error, info, warn};

mod error;
mod pcm;
mod resample;

pub use error::RenderError;
pub use pcm::Pcm16;
pub use resample::{db_to_gain, pitch_ratio, resample_linear};

use crate::note::Note;
use crate::sfz::{Region, RegionCatalog, SelectionPolicy};

/// The result of rendering a single note.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rendered {
    /// Frames written to the output file.
    pub frames: usize,
    /// The playback rate relative to the source sample.
    pub ratio: f64,
}

/// The notes that were and were not rendered for an instrument.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderSummary {
    pub rendered: Vec<Note>,
    pub skipped: Vec<Note>,
}

/// Renders the target note from the given region and writes it to `output` as a 16-bit WAV
/// file with the sample's rate and channel count.
///
/// If the region's offset consumes the whole sample, a zero-length file is still written and
/// [RenderError::EmptyResult] is returned.
pub fn render(
    region: &Region,
    target: u8,
    source_dir: &Path,
    output: &Path,
) -> Result<Rendered, RenderError> {
    let sample_path = source_dir.join(region.sample());
    let pcm = Pcm16::load(&sample_path)?;
    let channels = usize::from(pcm.channels).max(1);

    let skip = usize::try_from(region.offset())
        .unwrap_or(usize::MAX)
        .saturating_mul(channels);
    let remaining = pcm.samples.get(skip..).unwrap_or(&[]);

    let ratio = pitch_ratio(target, region.root_key(), region.tune());
    let shifted: Vec<Vec<f32>> =
        resample::to_planar(remaining, channels, db_to_gain(region.volume()))
            .iter()
            .map(|channel| resample_linear(channel, ratio))
            .collect();

    let rendered = Pcm16 {
        sample_rate: pcm.sample_rate,
        channels: pcm.channels,
        samples: resample::to_interleaved(&shifted),
    };
    rendered.write_wav(output)?;

    if remaining.is_empty() {
        return Err(RenderError::EmptyResult {
            path: sample_path,
            offset: region.offset(),
        });
    }

    Ok(Rendered {
        frames: rendered.frames(),
        ratio,
    })
}

/// Renders every given note of an instrument into `output_dir`, naming each file by the note's
/// file stem. Notes that cannot be rendered are logged and skipped.
pub fn render_instrument(
    catalog: &RegionCatalog,
    source_dir: &Path,
    output_dir: &Path,
    notes: impl IntoIterator<Item = Note>,
    policy: SelectionPolicy,
) -> Result<RenderSummary, RenderError> {
    fs::create_dir_all(output_dir)?;

    let mut summary = RenderSummary::default();
    for note in notes {
        let Some(midi) = note.midi() else {
            warn!(note = %note, "Note is outside of the MIDI range, skipping.");
            summary.skipped.push(note);
            continue;
        };
        let Some(region) = policy.select(catalog, midi) else {
            warn!(note = %note, "No region covers note, skipping.");
            summary.skipped.push(note);
            continue;
        };

        let output = output_dir.join(format!("{}.wav", note.file_stem()));
        match render(region, midi, source_dir, &output) {
            Ok(rendered) => {
                info!(
                    note = %note,
                    sample = %region.sample().display(),
                    frames = rendered.frames,
                    ratio = rendered.ratio,
                    "Rendered note."
                );
                summary.rendered.push(note);
            }
            Err(e @ (RenderError::SampleMissing(_) | RenderError::EmptyResult { .. })) => {
                warn!(note = %note, err = %e, "Skipping note.");
                summary.skipped.push(note);
            }
            Err(e) => {
                error!(note = %note, err = %e, "Failed to render note.");
                summary.skipped.push(note);
            }
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::testutil;

    fn region(content: &str) -> Region {
        RegionCatalog::parse(content).unwrap().regions()[0].clone()
    }

    #[test]
    fn test_render_unshifted_is_identical() {
        let dir = tempfile::tempdir().unwrap();
        let samples = vec![0, 100, -100, 32767, -32768, 5, 4, 3];
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 44100, 1, &samples).unwrap();

        let output = dir.path().join("out.wav");
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60"),
            60,
            dir.path(),
            &output,
        )
        .unwrap();

        assert_eq!(samples.len(), rendered.frames);
        assert_eq!(1.0, rendered.ratio);
        let (spec, written) = testutil::read_wav_i16(&output).unwrap();
        assert_eq!(44100, spec.sample_rate);
        assert_eq!(16, spec.bits_per_sample);
        assert_eq!(samples, written);
    }

    #[test]
    fn test_render_major_third_up() {
        let dir = tempfile::tempdir().unwrap();
        let frames = 44100;
        testutil::write_wav_i16(
            &dir.path().join("c4.wav"),
            44100,
            1,
            &testutil::sine(261.63, 44100, frames, 0.5),
        )
        .unwrap();

        let output = dir.path().join("e4.wav");
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60"),
            64,
            dir.path(),
            &output,
        )
        .unwrap();

        let expected = (frames as f64 / 2f64.powf(4.0 / 12.0)).floor() as usize;
        assert_eq!(expected, rendered.frames);
        let (spec, written) = testutil::read_wav_i16(&output).unwrap();
        assert_eq!(44100, spec.sample_rate);
        assert_eq!(expected, written.len());
    }

    #[test]
    fn test_render_lower_note_is_longer() {
        let dir = tempfile::tempdir().unwrap();
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 44100, 1, &[0; 1000]).unwrap();

        let output = dir.path().join("c3.wav");
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60"),
            48,
            dir.path(),
            &output,
        )
        .unwrap();

        assert_eq!(2000, rendered.frames);
    }

    #[test]
    fn test_render_stereo_keeps_channels() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<i16> = [1000, -1000].repeat(100);
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 48000, 2, &samples).unwrap();

        let output = dir.path().join("c5.wav");
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60"),
            72,
            dir.path(),
            &output,
        )
        .unwrap();

        assert_eq!(50, rendered.frames);
        let (spec, written) = testutil::read_wav_i16(&output).unwrap();
        assert_eq!(2, spec.channels);
        assert_eq!(48000, spec.sample_rate);
        assert_eq!([1000, -1000].repeat(50), written);
    }

    #[test]
    fn test_render_offset_and_volume() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<i16> = (0..100).map(|i| i * 100).collect();
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 44100, 1, &samples).unwrap();

        let output = dir.path().join("out.wav");
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60 offset=10 volume=-6.0206"),
            60,
            dir.path(),
            &output,
        )
        .unwrap();

        assert_eq!(90, rendered.frames);
        let (_, written) = testutil::read_wav_i16(&output).unwrap();
        for (written, original) in written.iter().zip(&samples[10..]) {
            assert!((i32::from(*written) - i32::from(*original) / 2).abs() <= 1);
        }
    }

    #[test]
    fn test_render_tune() {
        let dir = tempfile::tempdir().unwrap();
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 44100, 1, &[0; 1200]).unwrap();

        // Tuning down an octave halves the read rate.
        let rendered = render(
            &region("<region> sample=c4.wav pitch_keycenter=60 tune=-1200"),
            60,
            dir.path(),
            &dir.path().join("out.wav"),
        )
        .unwrap();

        assert!((rendered.ratio - 0.5).abs() < 1e-12);
        assert_eq!(2400, rendered.frames);
    }

    #[test]
    fn test_render_offset_consumes_sample() {
        let dir = tempfile::tempdir().unwrap();
        testutil::write_wav_i16(&dir.path().join("c4.wav"), 44100, 1, &[1; 10]).unwrap();

        let output = dir.path().join("out.wav");
        let result = render(
            &region("<region> sample=c4.wav offset=10"),
            60,
            dir.path(),
            &output,
        );

        assert!(matches!(
            result,
            Err(RenderError::EmptyResult { offset: 10, .. })
        ));
        let (_, written) = testutil::read_wav_i16(&output).unwrap();
        assert!(written.is_empty());
    }

    #[test]
    fn test_render_missing_sample() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.wav");

        let result = render(
            &region("<region> sample=gone.wav"),
            60,
            dir.path(),
            &output,
        );

        assert!(matches!(result, Err(RenderError::SampleMissing(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_render_instrument() {
        let dir = tempfile::tempdir().unwrap();
        let source_dir = dir.path().join("sfz");
        fs::create_dir_all(source_dir.join("samples")).unwrap();
        testutil::write_wav_i16(&source_dir.join("samples/c4.wav"), 44100, 1, &[0; 500])
            .unwrap();

        let catalog = RegionCatalog::parse(
            "default_path=samples\n\
             <region> sample=c4.wav lokey=59 hikey=61 pitch_keycenter=60\n\
             <region> sample=missing.wav key=62\n",
        )
        .unwrap();
        let output_dir: PathBuf = dir.path().join("wav");

        let summary = render_instrument(
            &catalog,
            &source_dir,
            &output_dir,
            Note::range("b3".parse().unwrap(), "eb4".parse().unwrap()),
            SelectionPolicy::default(),
        )
        .unwrap();

        let stems = |notes: &[Note]| notes.iter().map(Note::file_stem).collect::<Vec<_>>();
        assert_eq!(vec!["b3", "c4", "db4"], stems(&summary.rendered));
        assert_eq!(vec!["d4", "eb4"], stems(&summary.skipped));
        assert!(output_dir.join("b3.wav").is_file());
        assert!(output_dir.join("c4.wav").is_file());
        assert!(output_dir.join("db4.wav").is_file());
        assert!(!output_dir.join("d4.wav").exists());
    }
}
