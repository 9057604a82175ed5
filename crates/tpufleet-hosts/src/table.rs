//! Host table editing
//!
//! Every generation/zone owns one delimited block:
//!
//! ```text
//! # >>> tpufleet v2 us-central1-f >>>
//! 34.10.0.1 v2-1.tpu
//! 34.10.0.2 v2-2.tpu
//! # <<< tpufleet v2 us-central1-f <<<
//! ```
//!
//! The block is rewritten wholesale on every sync. Lines outside any block
//! that name a fleet member are dropped so a member never resolves twice.

use std::collections::HashSet;
use tpufleet_core::Generation;

const BEGIN_PREFIX: &str = "# >>> tpufleet ";
const END_PREFIX: &str = "# <<< tpufleet ";

/// Delimiters of one generation/zone block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMarker {
    pub generation: Generation,
    pub zone: String,
}

impl BlockMarker {
    pub fn new(generation: Generation, zone: impl Into<String>) -> Self {
        Self {
            generation,
            zone: zone.into(),
        }
    }

    pub fn begin(&self) -> String {
        format!("{}{} {} >>>", BEGIN_PREFIX, self.generation, self.zone)
    }

    pub fn end(&self) -> String {
        format!("{}{} {} <<<", END_PREFIX, self.generation, self.zone)
    }

    /// Whether `line` opens a block of the same generation in another zone
    fn opens_sibling(&self, line: &str) -> bool {
        let line = line.trim();
        line.starts_with(&format!("{}{} ", BEGIN_PREFIX, self.generation)) && line != self.begin()
    }
}

/// Line-preserving view of a hosts file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostTable {
    lines: Vec<String>,
}

impl HostTable {
    pub fn parse(content: &str) -> Self {
        Self {
            lines: content.lines().map(str::to_string).collect(),
        }
    }

    pub fn render(&self) -> String {
        if self.lines.is_empty() {
            return String::new();
        }
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Remove lines outside tpufleet blocks that carry any of `names` as a
    /// whole token. Returns the number of removed lines.
    pub fn remove_names(&mut self, names: &HashSet<String>) -> usize {
        let before = self.lines.len();
        let mut in_block = false;

        self.lines.retain(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with(BEGIN_PREFIX) {
                in_block = true;
                return true;
            }
            if trimmed.starts_with(END_PREFIX) {
                in_block = false;
                return true;
            }
            in_block || !names_member(line, names)
        });

        before - self.lines.len()
    }

    /// Drop blocks of `marker`'s generation left behind in other zones.
    /// Returns the number of removed blocks.
    pub fn remove_sibling_blocks(&mut self, marker: &BlockMarker) -> usize {
        let mut removed = 0;
        let mut skipping = false;

        self.lines.retain(|line| {
            if skipping {
                if line.trim_start().starts_with(END_PREFIX) {
                    skipping = false;
                }
                return false;
            }
            if marker.opens_sibling(line) {
                removed += 1;
                skipping = true;
                return false;
            }
            true
        });

        removed
    }

    /// Replace the block for `marker` with `entries`, appending it if absent.
    /// An empty `entries` removes the block.
    pub fn replace_block(&mut self, marker: &BlockMarker, entries: &[String]) {
        let begin = marker.begin();
        let end = marker.end();

        let mut block = Vec::new();
        if !entries.is_empty() {
            block.push(begin.clone());
            block.extend(entries.iter().cloned());
            block.push(end.clone());
        }

        let start = self.lines.iter().position(|l| l.trim() == begin);
        match start {
            Some(start) => {
                // an unterminated block runs to the end of the file
                let stop = self.lines[start..]
                    .iter()
                    .position(|l| l.trim() == end)
                    .map(|offset| start + offset + 1)
                    .unwrap_or(self.lines.len());
                self.lines.splice(start..stop, block);
            }
            None if block.is_empty() => {}
            None => {
                if self.lines.last().is_some_and(|l| !l.trim().is_empty()) {
                    self.lines.push(String::new());
                }
                self.lines.extend(block);
            }
        }
    }

    /// Entries currently inside the block for `marker`
    pub fn block(&self, marker: &BlockMarker) -> Option<&[String]> {
        let begin = marker.begin();
        let end = marker.end();
        let start = self.lines.iter().position(|l| l.trim() == begin)? + 1;
        let len = self.lines[start..].iter().position(|l| l.trim() == end)?;
        Some(&self.lines[start..start + len])
    }
}

/// Whole-token match; comment lines never match.
fn names_member(line: &str, names: &HashSet<String>) -> bool {
    let trimmed = line.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return false;
    }
    trimmed
        .split('#')
        .next()
        .unwrap_or("")
        .split_whitespace()
        .any(|token| names.contains(token))
}
