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
use serde::{Deserialize, Serialize};

use super::{Region, RegionCatalog};

/// Notes are always rendered at full velocity.
pub const REFERENCE_VELOCITY: u8 = 127;

/// How a region is picked when several contain the target note.
#[derive(Deserialize, Clone, Copy, Serialize, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Prefer the region whose root key is closest to the note, earliest region on ties.
    #[default]
    NearestRoot,
    /// Take the first region that contains the note.
    FirstMatch,
}

impl SelectionPolicy {
    /// Picks the region to render the given note from. Returns None if no region covers the
    /// note at the reference velocity.
    pub fn select<'a>(self, catalog: &'a RegionCatalog, note: u8) -> Option<&'a Region> {
        let mut candidates = catalog
            .regions()
            .iter()
            .filter(|region| region.contains(note, REFERENCE_VELOCITY));

        match self {
            SelectionPolicy::FirstMatch => candidates.next(),
            // A region dedicated to exactly this key beats a wider region with the same root.
            SelectionPolicy::NearestRoot => candidates
                .enumerate()
                .min_by_key(|(index, region)| {
                    let dedicated = region.key_range() == (note..=note);
                    (region.root_key().abs_diff(note), !dedicated, *index)
                })
                .map(|(_, region)| region),
        }
    }
}

/// Picks the region for the given note using the nearest root key policy.
pub fn select(catalog: &RegionCatalog, note: u8) -> Option<&Region> {
    SelectionPolicy::NearestRoot.select(catalog, note)
}
