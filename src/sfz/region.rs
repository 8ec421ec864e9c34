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
use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::warn;

use crate::note::Note;

/// The root key used when neither `pitch_keycenter` nor `key` is given.
pub const DEFAULT_ROOT_KEY: u8 = 60;

const MAX_MIDI: i64 = 127;

/// The merged opcodes that apply to a single region.
pub type Opcodes = BTreeMap<String, String>;

/// A mapping from a key/velocity range to one sample plus its tuning metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Region {
    /// The sample file, relative to the instrument definition.
    sample: PathBuf,
    lokey: u8,
    hikey: u8,
    lovel: u8,
    hivel: u8,
    /// The note at which the sample plays back unshifted.
    pitch_keycenter: u8,
    /// Tuning offset in cents.
    tune: i32,
    /// Volume adjustment in decibels.
    volume: f32,
    /// Frames to skip at the start of the sample.
    offset: u64,
}

impl Region {
    /// Builds a region from its merged opcodes. Returns None if no sample is given.
    pub fn from_opcodes(opcodes: &Opcodes, default_path: Option<&str>) -> Option<Region> {
        let sample = opcodes
            .get("sample")
            .map(|sample| sample.trim())
            .filter(|sample| !sample.is_empty())?;

        // `key` is shorthand for a single-key region and overrides the individual opcodes.
        let key = opcodes.get("key").and_then(|key| parse_key(key));
        let lokey = key
            .or_else(|| opcodes.get("lokey").and_then(|v| parse_key(v)))
            .unwrap_or(0);
        let hikey = key
            .or_else(|| opcodes.get("hikey").and_then(|v| parse_key(v)))
            .unwrap_or(127);
        let pitch_keycenter = key
            .or_else(|| opcodes.get("pitch_keycenter").and_then(|v| parse_key(v)))
            .unwrap_or(DEFAULT_ROOT_KEY);
        let lovel = parse_int(opcodes, "lovel")
            .map(|v| v.clamp(0, MAX_MIDI) as u8)
            .unwrap_or(0);
        let hivel = parse_int(opcodes, "hivel")
            .map(|v| v.clamp(0, MAX_MIDI) as u8)
            .unwrap_or(127);
        let tune = parse_int(opcodes, "tune")
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0);
        let volume = opcodes
            .get("volume")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .filter(|v| v.is_finite())
            .unwrap_or(0.0);
        let offset = parse_int(opcodes, "offset")
            .map(|v| v.max(0) as u64)
            .unwrap_or(0);

        let (lokey, hikey) = ordered(sample, "key", lokey, hikey);
        let (lovel, hivel) = ordered(sample, "velocity", lovel, hivel);

        Some(Region {
            sample: sample_path(sample, default_path),
            lokey,
            hikey,
            lovel,
            hivel,
            pitch_keycenter,
            tune,
            volume,
            offset,
        })
    }

    /// The sample file, relative to the directory of the instrument definition.
    pub fn sample(&self) -> &Path {
        &self.sample
    }

    pub fn key_range(&self) -> RangeInclusive<u8> {
        self.lokey..=self.hikey
    }

    pub fn velocity_range(&self) -> RangeInclusive<u8> {
        self.lovel..=self.hivel
    }

    pub fn root_key(&self) -> u8 {
        self.pitch_keycenter
    }

    pub fn tune(&self) -> i32 {
        self.tune
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether this region plays for the given note at the given velocity.
    pub fn contains(&self, note: u8, velocity: u8) -> bool {
        self.key_range().contains(&note) && self.velocity_range().contains(&velocity)
    }
}

/// Parses a key opcode, which may be a MIDI note number or a note name such as c4 or f#3.
pub fn parse_key(value: &str) -> Option<u8> {
    let value = value.trim();
    match value.parse::<i64>() {
        Ok(number) => Some(number.clamp(0, MAX_MIDI) as u8),
        Err(_) => value.parse::<Note>().ok().and_then(|note| note.midi()),
    }
}

fn parse_int(opcodes: &Opcodes, name: &str) -> Option<i64> {
    opcodes.get(name).and_then(|v| v.trim().parse::<i64>().ok())
}

/// Swaps reversed ranges so that low <= high always holds.
fn ordered(sample: &str, kind: &str, low: u8, high: u8) -> (u8, u8) {
    if low <= high {
        return (low, high);
    }
    warn!(sample, low, high, "Region has a reversed {} range, swapping.", kind);
    (high, low)
}

/// Joins the sample reference onto the default path. SFZ files written on Windows use
/// backslashes, which are normalized here.
fn sample_path(sample: &str, default_path: Option<&str>) -> PathBuf {
    let sample = sample.replace('\\', "/");
    match default_path.map(str::trim).filter(|path| !path.is_empty()) {
        Some(default_path) => Path::new(&default_path.replace('\\', "/")).join(sample),
        None => PathBuf::from(sample),
    }
}
