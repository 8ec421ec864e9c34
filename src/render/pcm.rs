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
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::default::{get_codecs, get_probe};
use tracing::warn;

use super::error::RenderError;
use super::resample::quantize;

/// Interleaved 16-bit signed PCM audio, the working representation for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Pcm16 {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl Pcm16 {
    /// Loads an audio file and normalizes it to 16-bit PCM, keeping its sample rate and channel
    /// count. WAV files are read with hound, anything else goes through symphonia.
    pub fn load(path: &Path) -> Result<Pcm16, RenderError> {
        if !path.is_file() {
            return Err(RenderError::SampleMissing(path.to_path_buf()));
        }

        let is_wav = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
        if is_wav {
            Self::load_wav(path)
        } else {
            Self::load_decoded(path)
        }
    }

    /// The number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        match self.channels {
            0 => 0,
            channels => self.samples.len() / usize::from(channels),
        }
    }

    /// Writes this audio as a 16-bit PCM WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), RenderError> {
        let mut writer = WavWriter::create(
            path,
            WavSpec {
                channels: self.channels,
                sample_rate: self.sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )?;
        for sample in &self.samples {
            writer.write_sample(*sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    fn load_wav(path: &Path) -> Result<Pcm16, RenderError> {
        let mut reader = WavReader::open(path)?;
        let spec = reader.spec();

        let samples = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Int, 16) => reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Int, bits) => reader
                .samples::<i32>()
                .map(|sample| sample.map(|sample| int_to_i16(sample, bits)))
                .collect::<Result<Vec<_>, _>>()?,
            (SampleFormat::Float, _) => reader
                .samples::<f32>()
                .map(|sample| sample.map(quantize))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(Pcm16 {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    fn load_decoded(path: &Path) -> Result<Pcm16, RenderError> {
        let decode_error = |message: String| RenderError::Decode {
            path: path.to_path_buf(),
            message,
        };

        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(extension) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(extension);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| decode_error(e.to_string()))?;
        let mut format_reader = probed.format;

        let track = format_reader
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| decode_error("no audio track found".to_string()))?;
        let track_id = track.id;
        let mut sample_rate = track.codec_params.sample_rate;
        let mut channels = track
            .codec_params
            .channels
            .map(|channels| channels.count() as u16);
        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| decode_error(e.to_string()))?;

        let mut samples = Vec::new();
        loop {
            let packet = match format_reader.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e)) if e.kind() == ErrorKind::UnexpectedEof => break,
                Err(SymphoniaError::ResetRequired) => {
                    decoder.reset();
                    continue;
                }
                Err(e) => return Err(decode_error(e.to_string())),
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(SymphoniaError::DecodeError(message)) => {
                    warn!(
                        path = %path.display(),
                        err = message,
                        "Skipping undecodable packet."
                    );
                    continue;
                }
                Err(e) => return Err(decode_error(e.to_string())),
            };

            let spec = *decoded.spec();
            sample_rate.get_or_insert(spec.rate);
            channels.get_or_insert(spec.channels.count() as u16);

            let mut buffer = SampleBuffer::<i16>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            samples.extend_from_slice(buffer.samples());
        }

        match (sample_rate, channels) {
            (Some(sample_rate), Some(channels)) if channels > 0 => Ok(Pcm16 {
                sample_rate,
                channels,
                samples,
            }),
            _ => Err(decode_error(
                "unable to determine sample rate and channel count".to_string(),
            )),
        }
    }
}

/// Rescales an integer sample of the given bit depth to 16 bits.
fn int_to_i16(sample: i32, bits_per_sample: u16) -> i16 {
    if bits_per_sample > 16 {
        (sample >> (bits_per_sample - 16)) as i16
    } else {
        (sample << (16 - bits_per_sample)) as i16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil;

    #[test]
    fn test_load_16_bit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        testutil::write_wav_i16(&path, 44100, 2, &[1, -1, 32767, -32768]).unwrap();

        let pcm = Pcm16::load(&path).unwrap();
        assert_eq!(44100, pcm.sample_rate);
        assert_eq!(2, pcm.channels);
        assert_eq!(2, pcm.frames());
        assert_eq!(vec![1, -1, 32767, -32768], pcm.samples);
    }

    #[test]
    fn test_load_24_bit_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        testutil::write_wav_int(&path, 48000, 1, 24, &[8_388_607, -8_388_608, 256, 0]).unwrap();

        let pcm = Pcm16::load(&path).unwrap();
        assert_eq!(48000, pcm.sample_rate);
        assert_eq!(vec![32767, -32768, 1, 0], pcm.samples);
    }

    #[test]
    fn test_load_8_bit_is_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        testutil::write_wav_int(&path, 22050, 1, 8, &[127, -128, 1]).unwrap();

        let pcm = Pcm16::load(&path).unwrap();
        assert_eq!(vec![32512, -32768, 256], pcm.samples);
    }

    #[test]
    fn test_load_float() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.wav");
        testutil::write_wav_f32(&path, 44100, 1, &[0.5, -0.5, 1.5, 0.0]).unwrap();

        let pcm = Pcm16::load(&path).unwrap();
        assert_eq!(vec![16384, -16384, 32767, 0], pcm.samples);
    }

    #[test]
    fn test_load_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.wav");
        assert!(matches!(
            Pcm16::load(&path),
            Err(RenderError::SampleMissing(missing)) if missing == path
        ));
    }

    #[test]
    fn test_load_undecodable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.flac");
        std::fs::write(&path, b"definitely not audio").unwrap();
        assert!(matches!(
            Pcm16::load(&path),
            Err(RenderError::Decode { .. })
        ));
    }

    #[test]
    fn test_load_detects_format_by_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.snd");
        let samples: Vec<i16> = testutil::sine(440.0, 22050, 5000, 0.5)
            .into_iter()
            .flat_map(|sample| [sample, sample / 2])
            .collect();
        testutil::write_wav_i16(&path, 22050, 2, &samples).unwrap();

        let pcm = Pcm16::load(&path).unwrap();
        assert_eq!(22050, pcm.sample_rate);
        assert_eq!(2, pcm.channels);
        assert_eq!(5000, pcm.frames());
        assert_eq!(samples, pcm.samples);
    }

    #[test]
    fn test_write_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let pcm = Pcm16 {
            sample_rate: 32000,
            channels: 1,
            samples: vec![5, 6, 7],
        };
        pcm.write_wav(&path).unwrap();

        assert_eq!(pcm, Pcm16::load(&path).unwrap());
    }

    #[test]
    fn test_write_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.wav");
        let pcm = Pcm16 {
            sample_rate: 44100,
            channels: 2,
            samples: Vec::new(),
        };
        pcm.write_wav(&path).unwrap();

        let loaded = Pcm16::load(&path).unwrap();
        assert_eq!(0, loaded.frames());
        assert_eq!(2, loaded.channels);
    }
}
