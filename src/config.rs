//! Run configuration in TOML
//!
//! A run file names the input files, the trigger path with its parameters,
//! and optional luminosity masking / threading / output settings:
//!
//! ```text
//! files = ["DYto2E_part1.h5", "DYto2E_part2.h5"]
//! goldenjson = "golden.json"
//! threads = 4
//! output = "histograms.h5"
//!
//! [trigger]
//! path = "ElePt_WPTight_Gsf"
//! trigger_pt = 32.0
//! avoid_ecal_transition_probes = true
//! ```
//!
//! Unknown keys are rejected.

use std::error::Error;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::triggers::Trigger;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Input event files, evaluated one task per file.
    pub files: Vec<PathBuf>,
    pub trigger: TriggerConfig,
    /// Golden JSON of certified (run, luminosity block) ranges.
    pub goldenjson: Option<PathBuf>,
    /// Worker threads; absent means single-threaded.
    pub threads: Option<usize>,
    /// Histogram output file.
    pub output: Option<PathBuf>,
}

/// Trigger path selection. Tagged by the `path` key; each path brings its own
/// parameters, so unknown-key rejection happens per variant.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(tag = "path")]
pub enum TriggerConfig {
    #[serde(rename = "ElePt_CaloIdVT_GsfTrkIdT")]
    ElePtCaloIdVTGsfTrkIdT {
        trigger_pt: f32,
    },
    #[serde(rename = "ElePt_WPTight_Gsf")]
    ElePtWPTightGsf {
        trigger_pt: f32,
        #[serde(default)]
        avoid_ecal_transition_tags: bool,
        #[serde(default)]
        avoid_ecal_transition_probes: bool,
    },
}

impl From<TriggerConfig> for Trigger {
    fn from(cfg: TriggerConfig) -> Self {
        match cfg {
            TriggerConfig::ElePtCaloIdVTGsfTrkIdT { trigger_pt } =>
                Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt },
            TriggerConfig::ElePtWPTightGsf {
                trigger_pt, avoid_ecal_transition_tags, avoid_ecal_transition_probes } =>
                Trigger::ElePtWPTightGsf {
                    trigger_pt, avoid_ecal_transition_tags, avoid_ecal_transition_probes },
        }
    }
}

pub fn read_config_file(path: &dyn AsRef<Path>) -> Result<Config, Box<dyn Error + Send + Sync>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file {}: {e}",
                             path.as_ref().display()))?;
    let config = toml::from_str(&text)
        .map_err(|e| format!("Failed to parse config file {}: {e}",
                             path.as_ref().display()))?;
    Ok(config)
}
