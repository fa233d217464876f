//! Per-trigger selection strategies
//!
//! Each supported HLT path gets its own event prefilter and matching
//! configuration; the probe classification itself (`find_probes`) is shared.
//! The set of paths is closed: dispatch is by explicit variant, not by
//! open-ended trait objects.

pub mod ele_caloidvt_gsftrkidt;
pub mod ele_wptight_gsf;

use crate::event::{delta_r, invariant_mass, Events, TrigObj};
use crate::jagged::Jagged;
use crate::matching::{trigger_match, MatchConfig};
use crate::pairs::Pair;

/// Z-boson mass in GeV.
pub const Z_MASS: f32 = 91.1876;

/// Half-width of the dilepton mass window around [`Z_MASS`], in GeV.
pub const MASS_WINDOW: f32 = 30.0;

/// Kinematics of a probe surviving classification. Event structure is gone:
/// these are the flattened leaves that feed arrays and histograms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Probe {
    pub pt: f32,
    pub eta: f32,
    pub phi: f32,
}

/// Passing/all probes from both symmetrized pairings: arm 1 has the first
/// electron of each combination as tag, arm 2 the second.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProbeArms {
    pub pass1: Vec<Probe>,
    pub all1:  Vec<Probe>,
    pub pass2: Vec<Probe>,
    pub all2:  Vec<Probe>,
}

impl ProbeArms {

    pub fn extend(&mut self, other: ProbeArms) {
        self.pass1.extend(other.pass1);
        self.all1 .extend(other.all1);
        self.pass2.extend(other.pass2);
        self.all2 .extend(other.all2);
    }

    pub fn passing(&self) -> impl Iterator<Item = &Probe> {
        self.pass1.iter().chain(&self.pass2)
    }

    pub fn all(&self) -> impl Iterator<Item = &Probe> {
        self.all1.iter().chain(&self.all2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Trigger {
    /// Single-leg electron trigger with CaloIdVT_GsfTrkIdT identification
    /// filters; matching uses filter bit 11 with an equality test on the
    /// masked value.
    ElePtCaloIdVTGsfTrkIdT {
        trigger_pt: f32,
    },
    /// Single-leg WPTight trigger; matching uses filter bit 1 with an
    /// any-overlap test, a fixed 30 GeV tag side, and optional exclusion of
    /// the ECAL transition gap for tags and/or probes.
    ElePtWPTightGsf {
        trigger_pt: f32,
        avoid_ecal_transition_tags: bool,
        avoid_ecal_transition_probes: bool,
    },
}

impl Trigger {

    /// Selection pt threshold derived from the nominal trigger pt.
    pub fn threshold(&self) -> f32 {
        match *self {
            Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt } => trigger_pt - 10.0,
            Trigger::ElePtWPTightGsf { trigger_pt, .. }    => trigger_pt - 1.0,
        }
    }

    /// Name of the HLT path, for reports.
    pub fn hlt_path(&self) -> String {
        match *self {
            Trigger::ElePtCaloIdVTGsfTrkIdT { trigger_pt } =>
                format!("HLT_Ele{}_CaloIdVT_GsfTrkIdT", trigger_pt as i64),
            Trigger::ElePtWPTightGsf { trigger_pt, .. } =>
                format!("HLT_Ele{}_WPTight_Gsf", trigger_pt as i64),
        }
    }

    /// Run the full selection over materialized events: prefilter, both
    /// symmetrized pairings, probe classification.
    pub fn select(&self, events: &Events) -> ProbeArms {
        match *self {
            Trigger::ElePtCaloIdVTGsfTrkIdT { .. } =>
                ele_caloidvt_gsftrkidt::select(events, self.threshold()),
            Trigger::ElePtWPTightGsf { avoid_ecal_transition_tags,
                                       avoid_ecal_transition_probes, .. } =>
                ele_wptight_gsf::select(events, self.threshold(),
                                        avoid_ecal_transition_tags,
                                        avoid_ecal_transition_probes),
        }
    }
}

/// Cuts and matching requirements of one trigger path's probe classification.
pub(crate) struct Classifier {
    pub tag_match: MatchConfig,
    pub probe_match: MatchConfig,
    /// Explicit tag-side pt cut, on top of tag matching.
    pub tag_pt_min: Option<f32>,
    /// Explicit probe-side pt cut, applied together with tag validation.
    pub probe_pt_min: Option<f32>,
}

/// Classify the probes of one labeled pair set into (passing, all).
///
/// Pairs whose tag fails validation are dropped; events left without a valid
/// tag pair contribute no probes (expected, not an error). Surviving pairs
/// must have non-zero tag-probe separation, a dilepton mass within the Z
/// window and opposite charges; those probes form "all", and the trigger
/// matcher splits out "passing".
pub(crate) fn find_probes(
    zcands: &Jagged<Pair>,
    trigobjs: &Jagged<TrigObj>,
    cfg: &Classifier,
) -> (Vec<Probe>, Vec<Probe>) {

    let tag_matched = trigger_match(zcands, trigobjs, &cfg.tag_match,
                                    |p: &Pair| (p.tag.eta, p.tag.phi));
    let valid_tag = zcands.zip_with(&tag_matched, |p, &matched| {
        matched
            && cfg.tag_pt_min  .map_or(true, |min| p.tag.pt   > min)
            && cfg.probe_pt_min.map_or(true, |min| p.probe.pt > min)
    });
    let zcands = zcands.filter(&valid_tag);

    let has_tag_pair: Vec<bool> = zcands.counts().map(|n| n >= 1).collect();
    let zcands   = zcands  .select_events(&has_tag_pair);
    let trigobjs = trigobjs.select_events(&has_tag_pair);

    let is_z = zcands.map(|p| {
        let dr   = delta_r(p.tag.eta, p.tag.phi, p.probe.eta, p.probe.phi);
        let mass = invariant_mass(&p.tag, &p.probe);
        dr > 0.0
            && (mass - Z_MASS).abs() < MASS_WINDOW
            && p.tag.charge * p.probe.charge == -1
    });
    let all_probes = zcands.filter(&is_z).map(|p| p.probe);

    let probe_matched = trigger_match(&all_probes, &trigobjs, &cfg.probe_match,
                                      |e| (e.eta, e.phi));
    let passing_probes = all_probes.filter(&probe_matched);

    let as_probes = |j: &Jagged<crate::event::Electron>| {
        j.flatten().into_iter()
            .map(|e| Probe { pt: e.pt, eta: e.eta, phi: e.phi })
            .collect()
    };
    (as_probes(&passing_probes), as_probes(&all_probes))
}
