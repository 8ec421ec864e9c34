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

/// The frequency ratio between the target note and the root key, including the tuning offset in
/// cents. Reading input at this rate moves a sample recorded at the root key to the target.
pub fn pitch_ratio(target: u8, root: u8, tune_cents: i32) -> f64 {
    let semitones =
        f64::from(target) - f64::from(root) + f64::from(tune_cents) / 100.0;
    2f64.powf(semitones / 12.0)
}

/// Converts a decibel adjustment to a linear gain factor.
pub fn db_to_gain(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

/// Splits interleaved 16-bit samples into one float buffer per channel, applying the gain.
/// A trailing partial frame is dropped.
pub fn to_planar(samples: &[i16], channels: usize, gain: f32) -> Vec<Vec<f32>> {
    let channels = channels.max(1);
    let mut planar = vec![Vec::with_capacity(samples.len() / channels); channels];
    for frame in samples.chunks_exact(channels) {
        for (channel, sample) in planar.iter_mut().zip(frame) {
            channel.push(f32::from(*sample) / 32768.0 * gain);
        }
    }
    planar
}

/// Resamples one channel by linear interpolation. Output frame `i` reads the input at position
/// `i * ratio`, so a ratio above 1 shortens the signal and raises its pitch. The output has
/// `floor(len / ratio)` frames.
pub fn resample_linear(input: &[f32], ratio: f64) -> Vec<f32> {
    if input.is_empty() || !ratio.is_finite() || ratio <= 0.0 {
        return Vec::new();
    }

    let last = input.len() - 1;
    let output_len = (input.len() as f64 / ratio).floor() as usize;
    (0..output_len)
        .map(|i| {
            let position = i as f64 * ratio;
            let index = position.floor() as usize;
            if index >= last {
                return input[last];
            }
            let fraction = (position - index as f64) as f32;
            input[index] + (input[index + 1] - input[index]) * fraction
        })
        .collect()
}

/// Converts a float sample in [-1.0, 1.0] to 16 bits, clipping anything outside that range.
pub fn quantize(sample: f32) -> i16 {
    (sample * 32768.0).round().clamp(-32768.0, 32767.0) as i16
}

/// Interleaves per-channel float buffers back into 16-bit samples. Channels are truncated to the
/// shortest one.
pub fn to_interleaved(planar: &[Vec<f32>]) -> Vec<i16> {
    let frames = planar.iter().map(Vec::len).min().unwrap_or(0);
    let mut samples = Vec::with_capacity(frames * planar.len());
    for frame in 0..frames {
        for channel in planar {
            samples.push(quantize(channel[frame]));
        }
    }
    samples
}
