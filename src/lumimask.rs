//! Golden-JSON luminosity masking
//!
//! Data-taking quality is certified per (run, luminosity block). The golden
//! JSON maps run numbers to lists of inclusive block ranges:
//! `{"356478": [[1, 26], [30, 111]], ...}`. Events outside the certified
//! ranges are dropped before any selection; without a mask, nothing is
//! dropped.

use std::collections::HashMap;
use std::error::Error;
use std::path::Path;

use crate::event::Events;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LumiMask {
    ranges: HashMap<u32, Vec<(u32, u32)>>,
}

impl LumiMask {

    pub fn from_file(path: &dyn AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let raw: HashMap<String, Vec<(u32, u32)>> = serde_json::from_str(text)?;
        let mut ranges = HashMap::with_capacity(raw.len());
        for (run, spans) in raw {
            ranges.insert(run.parse::<u32>()?, spans);
        }
        Ok(Self { ranges })
    }

    /// Is this (run, luminosity block) certified? Range ends are inclusive.
    pub fn contains(&self, run: u32, lumi: u32) -> bool {
        self.ranges.get(&run)
            .map_or(false, |spans| spans.iter().any(|&(lo, hi)| lo <= lumi && lumi <= hi))
    }

    /// Per-event keep flags, aligned with `events`.
    pub fn event_mask(&self, events: &Events) -> Vec<bool> {
        events.run.iter().zip(&events.luminosity_block)
            .map(|(&run, &lumi)| self.contains(run, lumi))
            .collect()
    }
}
