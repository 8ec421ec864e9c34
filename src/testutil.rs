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

#[cfg(test)]
use std::{error::Error, fs::File, io::BufWriter, path::Path};

#[cfg(test)]
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

#[cfg(test)]
fn writer(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    sample_format: SampleFormat,
) -> Result<WavWriter<BufWriter<File>>, Box<dyn Error>> {
    Ok(WavWriter::create(
        path,
        WavSpec {
            channels,
            sample_rate,
            bits_per_sample,
            sample_format,
        },
    )?)
}

/// Writes interleaved 16-bit samples to a WAV file.
#[cfg(test)]
pub fn write_wav_i16(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    samples: &[i16],
) -> Result<(), Box<dyn Error>> {
    let mut writer = writer(path, sample_rate, channels, 16, SampleFormat::Int)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes interleaved integer samples of an arbitrary bit depth to a WAV file.
#[cfg(test)]
pub fn write_wav_int(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
    samples: &[i32],
) -> Result<(), Box<dyn Error>> {
    let mut writer = writer(path, sample_rate, channels, bits_per_sample, SampleFormat::Int)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Writes interleaved 32-bit float samples to a WAV file.
#[cfg(test)]
pub fn write_wav_f32(
    path: &Path,
    sample_rate: u32,
    channels: u16,
    samples: &[f32],
) -> Result<(), Box<dyn Error>> {
    let mut writer = writer(path, sample_rate, channels, 32, SampleFormat::Float)?;
    for sample in samples {
        writer.write_sample(*sample)?;
    }
    writer.finalize()?;
    Ok(())
}

/// Reads a 16-bit WAV file back into its spec and interleaved samples.
#[cfg(test)]
pub fn read_wav_i16(path: &Path) -> Result<(WavSpec, Vec<i16>), Box<dyn Error>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();
    let samples = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    Ok((spec, samples))
}

/// Generates a mono sine wave at the given frequency.
#[cfg(test)]
pub fn sine(frequency: f32, sample_rate: u32, frames: usize, amplitude: f32) -> Vec<i16> {
    use std::f32::consts::PI;

    (0..frames)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            (amplitude * (2.0 * PI * frequency * t).sin() * 32767.0).round() as i16
        })
        .collect()
}

/// Writes a file at the given path, creating its parent directories.
#[cfg(test)]
pub fn write_file(path: &Path, content: &[u8]) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    Ok(())
}
