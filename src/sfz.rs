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

//! Parsing of SFZ instrument definitions into a catalog of sample regions.

use std::fs;
use std::path::{Path, PathBuf};

use pest::Parser;
use pest_derive::Parser;
use serde::Serialize;
use tracing::{debug, warn};

mod error;
mod region;
mod select;

pub use error::ParseError;
pub use region::{parse_key, Region};
pub use select::{select, SelectionPolicy, REFERENCE_VELOCITY};

use region::Opcodes;

#[derive(Parser)]
#[grammar = "src/sfz/grammar.pest"]
struct SfzParser;

/// The ordered regions of one instrument definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegionCatalog {
    default_path: Option<String>,
    regions: Vec<Region>,
}

impl RegionCatalog {
    /// Parses the text of an instrument definition. Regions keep their order of appearance.
    pub fn parse(content: &str) -> Result<RegionCatalog, ParseError> {
        let pairs = SfzParser::parse(Rule::sfz, content)
            .map_err(|e| ParseError::syntax(content, e))?;

        let mut builder = CatalogBuilder::default();
        for pair in pairs.flatten() {
            match pair.as_rule() {
                Rule::header => {
                    let line = pair.line_col().0;
                    if let Some(name) = pair.into_inner().next() {
                        builder.header(name.as_str(), line);
                    }
                }
                Rule::opcode => {
                    let mut inner = pair.into_inner();
                    if let (Some(name), Some(value)) = (inner.next(), inner.next()) {
                        builder.opcode(name.as_str(), value.as_str().trim());
                    }
                }
                Rule::stray => {
                    debug!(
                        line = pair.line_col().0,
                        text = pair.as_str(),
                        "Ignoring malformed SFZ token."
                    );
                }
                _ => {}
            }
        }

        Ok(builder.finish())
    }

    /// Reads and parses an instrument definition from disk. Also returns the directory that the
    /// sample references in the definition are relative to.
    pub fn parse_file(path: &Path) -> Result<(RegionCatalog, PathBuf), ParseError> {
        let content = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(&content)?;
        let source_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Ok((catalog, source_dir))
    }

    /// The default sample path, if the definition declared one.
    pub fn default_path(&self) -> Option<&str> {
        self.default_path.as_deref()
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// The header whose opcodes are currently being read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Section {
    /// Before any header.
    #[default]
    Top,
    Control,
    Global,
    Master,
    Group,
    Region,
    /// A header that has no bearing on regions, such as <curve> or <effect>.
    Other,
}

/// Walks the token stream and collects regions. Each header level holds its own opcodes and a
/// region's opcodes are snapshotted from all levels when the region ends.
#[derive(Default)]
struct CatalogBuilder {
    section: Section,
    default_path: Option<String>,
    global: Opcodes,
    master: Opcodes,
    group: Opcodes,
    region: Opcodes,
    region_line: usize,
    regions: Vec<Region>,
}

impl CatalogBuilder {
    fn header(&mut self, name: &str, line: usize) {
        self.flush_region();

        self.section = match name {
            "control" => Section::Control,
            "global" => {
                self.global.clear();
                self.master.clear();
                self.group.clear();
                Section::Global
            }
            "master" => {
                self.master.clear();
                self.group.clear();
                Section::Master
            }
            "group" => {
                self.group.clear();
                Section::Group
            }
            "region" => {
                self.region_line = line;
                Section::Region
            }
            other => {
                debug!(header = other, line, "Ignoring unsupported SFZ header.");
                Section::Other
            }
        };
    }

    fn opcode(&mut self, name: &str, value: &str) {
        let target = match self.section {
            Section::Top | Section::Control if name == "default_path" => {
                self.default_path = Some(value.to_string());
                return;
            }
            Section::Top | Section::Global => &mut self.global,
            Section::Master => &mut self.master,
            Section::Group => &mut self.group,
            Section::Region => &mut self.region,
            Section::Control | Section::Other => return,
        };
        target.insert(name.to_string(), value.to_string());
    }

    /// Ends the current region, if any, and adds it to the catalog.
    fn flush_region(&mut self) {
        if self.section != Section::Region {
            return;
        }
        let region_opcodes = std::mem::take(&mut self.region);

        // Later levels win on conflicts.
        let merged: Opcodes = self
            .global
            .iter()
            .chain(self.master.iter())
            .chain(self.group.iter())
            .chain(region_opcodes.iter())
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        match Region::from_opcodes(&merged, self.default_path.as_deref()) {
            Some(region) => self.regions.push(region),
            None => warn!(line = self.region_line, "Skipping region: no sample defined."),
        }
    }

    fn finish(mut self) -> RegionCatalog {
        self.flush_region();
        RegionCatalog {
            default_path: self.default_path,
            regions: self.regions,
        }
    }
}
