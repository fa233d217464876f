//! Tag-and-Probe orchestration
//!
//! `TagAndProbe` wires everything together: an optional extra event filter,
//! optional luminosity masking, the per-trigger selection over both
//! symmetrized pairings, and the array- or histogram-level products. Entry
//! points come in two flavors: eager (over already-materialized events) and
//! deferred (a per-file graph over the configured fileset, evaluated on
//! demand).

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::event::Events;
use crate::histograms::TnpHistograms;
use crate::io::hdf5::read_events;
use crate::lumimask::LumiMask;
use crate::run::{Deferred, Merge};
use crate::triggers::{ProbeArms, Trigger};

/// Event-level predicate applied before any selection; returns per-event
/// keep flags aligned with its input.
pub type EventPredicate = Arc<dyn Fn(&Events) -> Vec<bool> + Send + Sync>;

/// Mistakes in the run configuration. Raised at construction, never
/// deferred to evaluation time.
#[derive(Debug)]
pub enum ConfigError {
    EmptyFileset,
    MissingGoldenJson(PathBuf),
    BadGoldenJson(PathBuf, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConfigError::EmptyFileset =>
                write!(f, "no input files given"),
            ConfigError::MissingGoldenJson(path) =>
                write!(f, "golden JSON {} does not exist", path.display()),
            ConfigError::BadGoldenJson(path, why) =>
                write!(f, "golden JSON {} could not be parsed: {why}", path.display()),
        }
    }
}

impl std::error::Error for ConfigError {}

/// The eight flattened kinematic arrays of the array-level product:
/// pt and eta of passing/all probes, separately for the two symmetrized
/// pairings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeArrays {
    pub pt_pass1:  Vec<f32>,
    pub pt_pass2:  Vec<f32>,
    pub pt_all1:   Vec<f32>,
    pub pt_all2:   Vec<f32>,
    pub eta_pass1: Vec<f32>,
    pub eta_pass2: Vec<f32>,
    pub eta_all1:  Vec<f32>,
    pub eta_all2:  Vec<f32>,
}

impl From<&ProbeArms> for ProbeArrays {
    fn from(arms: &ProbeArms) -> Self {
        let pts  = |v: &[crate::triggers::Probe]| v.iter().map(|p| p.pt ).collect();
        let etas = |v: &[crate::triggers::Probe]| v.iter().map(|p| p.eta).collect();
        Self {
            pt_pass1:  pts(&arms.pass1), eta_pass1: etas(&arms.pass1),
            pt_pass2:  pts(&arms.pass2), eta_pass2: etas(&arms.pass2),
            pt_all1:   pts(&arms.all1),  eta_all1:  etas(&arms.all1),
            pt_all2:   pts(&arms.all2),  eta_all2:  etas(&arms.all2),
        }
    }
}

impl Merge for ProbeArms {
    fn merge(&mut self, other: Self) { self.extend(other); }
}

impl Merge for ProbeArrays {
    fn merge(&mut self, other: Self) {
        self.pt_pass1 .extend(other.pt_pass1);  self.eta_pass1.extend(other.eta_pass1);
        self.pt_pass2 .extend(other.pt_pass2);  self.eta_pass2.extend(other.eta_pass2);
        self.pt_all1  .extend(other.pt_all1);   self.eta_all1 .extend(other.eta_all1);
        self.pt_all2  .extend(other.pt_all2);   self.eta_all2 .extend(other.eta_all2);
    }
}

impl Merge for TnpHistograms {
    fn merge(&mut self, other: Self) { *self += &other; }
}

#[derive(Clone)]
pub struct TagAndProbe {
    fileset: Vec<PathBuf>,
    trigger: Trigger,
    lumimask: Option<LumiMask>,
    extra_filter: Option<EventPredicate>,
}

impl TagAndProbe {

    /// A selection over a fileset. The golden JSON, when given, must exist
    /// and parse; a missing or malformed one is a configuration mistake and
    /// fails here rather than at evaluation time.
    pub fn new(
        fileset: Vec<PathBuf>,
        trigger: Trigger,
        goldenjson: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        if fileset.is_empty() {
            return Err(ConfigError::EmptyFileset);
        }
        let lumimask = match goldenjson {
            None => None,
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::MissingGoldenJson(path));
                }
                Some(LumiMask::from_file(&path)
                     .map_err(|e| ConfigError::BadGoldenJson(path, e.to_string()))?)
            }
        };
        Ok(Self { fileset, trigger, lumimask, extra_filter: None })
    }

    /// Install an extra event-level filter, applied before the luminosity
    /// mask and any selection.
    pub fn with_extra_filter(mut self, filter: EventPredicate) -> Self {
        self.extra_filter = Some(filter);
        self
    }

    pub fn trigger(&self) -> &Trigger { &self.trigger }
    pub fn fileset(&self) -> &[PathBuf] { &self.fileset }

    /// Eager, array-level selection over materialized events.
    pub fn select(&self, events: &Events) -> ProbeArms {
        run_selection(&self.trigger, &self.lumimask, &self.extra_filter, events)
    }

    /// Eager, histogram-level selection over materialized events.
    pub fn histograms_for(&self, events: &Events) -> TnpHistograms {
        let mut histograms = TnpHistograms::new();
        histograms.fill(&self.select(events));
        histograms
    }

    /// Deferred array-level product over the fileset.
    pub fn probe_arrays(&self) -> Deferred<ProbeArrays> {
        self.deferred(|arms| ProbeArrays::from(&arms))
    }

    /// Deferred histogram-level product over the fileset.
    pub fn histograms(&self) -> Deferred<TnpHistograms> {
        self.deferred(|arms| {
            let mut histograms = TnpHistograms::new();
            histograms.fill(&arms);
            histograms
        })
    }

    /// One task per input file: read, filter, select, project. Tasks own
    /// clones of the configuration so the graph can outlive `self` and be
    /// re-evaluated at will.
    fn deferred<T, F>(&self, project: F) -> Deferred<T>
    where
        T: Merge + Send,
        F: Fn(ProbeArms) -> T + Clone + Send + Sync + 'static,
    {
        let mut graph = Deferred::new();
        for path in &self.fileset {
            let path = path.clone();
            let trigger = self.trigger;
            let lumimask = self.lumimask.clone();
            let extra_filter = self.extra_filter.clone();
            let project = project.clone();
            graph.push(path.clone(), move || {
                let events = read_events(&path)?;
                let arms = run_selection(&trigger, &lumimask, &extra_filter, &events);
                Ok(project(arms))
            });
        }
        graph
    }
}

fn run_selection(
    trigger: &Trigger,
    lumimask: &Option<LumiMask>,
    extra_filter: &Option<EventPredicate>,
    events: &Events,
) -> ProbeArms {
    let mut filtered;
    let mut events = events;
    if let Some(filter) = extra_filter {
        filtered = events.select(&filter(events));
        events = &filtered;
    }
    if let Some(mask) = lumimask {
        filtered = events.select(&mask.event_mask(events));
        events = &filtered;
    }
    trigger.select(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_fileset_is_a_config_error() {
        let trigger = Trigger::ElePtWPTightGsf {
            trigger_pt: 32.0,
            avoid_ecal_transition_tags: true,
            avoid_ecal_transition_probes: false,
        };
        let err = TagAndProbe::new(vec![], trigger, None).err().expect("must fail");
        match err {
            ConfigError::EmptyFileset => {}
            other => panic!("expected EmptyFileset, got {other:?}"),
        }
    }

    #[test]
    fn missing_golden_json_fails_at_construction() {
        let trigger = Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt: 115.0 };
        let missing = PathBuf::from("/no/such/golden.json");
        let err = TagAndProbe::new(vec![PathBuf::from("events.h5")], trigger, Some(missing.clone()))
            .err().expect("must fail");
        match err {
            ConfigError::MissingGoldenJson(path) => assert_eq!(path, missing),
            other => panic!("expected MissingGoldenJson, got {other:?}"),
        }
    }

    #[test]
    fn malformed_golden_json_fails_at_construction() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("golden.json");
        std::fs::write(&path, "not json at all")?;
        let trigger = Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt: 115.0 };
        let err = TagAndProbe::new(vec![PathBuf::from("events.h5")], trigger, Some(path))
            .err().expect("must fail");
        match err {
            ConfigError::BadGoldenJson(..) => Ok(()),
            other => panic!("expected BadGoldenJson, got {other:?}"),
        }
    }

    #[test]
    fn config_errors_have_readable_messages() {
        let message = ConfigError::MissingGoldenJson(PathBuf::from("/tmp/g.json")).to_string();
        assert!(message.contains("/tmp/g.json"));
        assert!(message.contains("does not exist"));
    }
}
