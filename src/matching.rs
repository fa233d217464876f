//! Geometric matching of electron candidates to trigger objects
//!
//! A candidate matches when at least one trigger object passes the pt / id /
//! filter-bit requirements and lies within `dr_max` of it in eta-phi space.
//! How the filter bit is tested differs between trigger paths (equality on
//! the masked value vs any overlap) and is part of the configuration; the
//! two behaviors are deliberately not unified.

use crate::event::{delta_r, TrigObj};
use crate::jagged::Jagged;

/// Particle-type code of electron trigger objects.
pub const ELECTRON_ID: i32 = 11;

/// Matching cone: angular distance must be *strictly* below this.
pub const DR_MATCH_MAX: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BitTest {
    /// `bits & (1 << filterbit) == 1 << filterbit`
    Exact,
    /// `bits & (1 << filterbit) > 0`
    Any,
}

#[derive(Clone, Copy, Debug)]
pub struct MatchConfig {
    pub pt_min: f32,
    pub filterbit: u8,
    pub bit_test: BitTest,
    pub dr_max: f32,
}

impl MatchConfig {

    pub fn new(pt_min: f32, filterbit: u8, bit_test: BitTest) -> Self {
        Self { pt_min, filterbit, bit_test, dr_max: DR_MATCH_MAX }
    }

    fn bit_ok(&self, bits: i32) -> bool {
        let mask = 1_i32 << self.filterbit;
        match self.bit_test {
            BitTest::Exact => bits & mask == mask,
            BitTest::Any   => bits & mask > 0,
        }
    }

    fn accepts(&self, t: &TrigObj) -> bool {
        t.pt > self.pt_min && t.id.abs() == ELECTRON_ID && self.bit_ok(t.filter_bits)
    }
}

/// Per-candidate match flags, event-aligned with `cands`. `eta_phi` projects
/// a candidate onto its angular coordinates, so the same matcher serves
/// electrons, tags and probes.
pub fn trigger_match<T>(
    cands: &Jagged<T>,
    trigobjs: &Jagged<TrigObj>,
    cfg: &MatchConfig,
    eta_phi: impl Fn(&T) -> (f32, f32),
) -> Jagged<bool> {
    assert_eq!(cands.n_events(), trigobjs.n_events(),
               "candidates and trigger objects cover different events");
    let mut matched = Jagged::new();
    for (cs, ts) in cands.iter_events().zip(trigobjs.iter_events()) {
        let trigger_cands: Vec<&TrigObj> = ts.iter().filter(|t| cfg.accepts(t)).collect();
        matched.push_event(cs.iter().map(|c| {
            let (eta, phi) = eta_phi(c);
            trigger_cands.iter().any(|t| delta_r(eta, phi, t.eta, t.phi) < cfg.dr_max)
        }));
    }
    matched
}
