//! Probe histograms
//!
//! 1-D variable-width histograms of probe pt / eta / phi, one pair
//! (passing, all) per variable. The pt spectrum is additionally partitioned
//! into barrel and endcap by probe |eta|. Bin edges are fixed: the eta edges
//! follow detector boundaries and the ECAL transition gap. All histograms
//! carry flow bins.

use ndhistogram::{axis::Variable, ndhistogram, Hist1D, Histogram};

use crate::triggers::{Probe, ProbeArms};

/// Probe |eta| at or below this fills the barrel pt histograms, above it the
/// endcap ones.
pub const BARREL_ENDCAP_SPLIT: f32 = 1.566;

pub const PT_EDGES: [f32; 25] = [
    5.0, 10.0, 15.0, 20.0, 22.0, 26.0, 28.0, 30.0, 32.0, 34.0, 36.0, 38.0, 40.0,
    45.0, 50.0, 60.0, 80.0, 100.0, 110.0, 120.0, 130.0, 140.0, 150.0, 250.0, 400.0,
];

pub const ETA_EDGES: [f32; 49] = [
    -2.5, -2.4, -2.3, -2.2, -2.1, -2.0, -1.9, -1.8, -1.7, -1.566, -1.4442,
    -1.3, -1.2, -1.1, -1.0, -0.9, -0.8, -0.7, -0.6, -0.5, -0.4, -0.3, -0.2, -0.1,
    0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.3,
    1.4442, 1.566, 1.7, 1.8, 1.9, 2.0, 2.1, 2.2, 2.3, 2.4, 2.5,
];

pub const PHI_EDGES: [f32; 20] = [
    -3.32, -2.97, -2.62, -2.27, -1.92, -1.57, -1.22, -0.87, -0.52, -0.18,
    0.18, 0.52, 0.87, 1.22, 1.57, 1.92, 2.27, 2.62, 2.97, 3.32,
];

pub type ProbeHist = Hist1D<Variable<f32>, f64>;

fn hist(edges: &[f32]) -> ProbeHist {
    ndhistogram!(Variable::new(edges.iter().copied()); f64)
}

/// Sum of all bin contents, flow bins included.
pub fn sum_with_flow(h: &ProbeHist) -> f64 {
    h.values().sum()
}

/// Content of the underflow bin.
pub fn underflow(h: &ProbeHist) -> f64 {
    *h.value_at_index(0).unwrap_or(&0.0)
}

/// Passing/all histograms of one probe variable.
#[derive(Clone, Debug)]
pub struct HistPair {
    pub pass: ProbeHist,
    pub all: ProbeHist,
}

/// Which of the two probe categories a fill goes into. Every probe appears
/// in `All`; the trigger-matched subset appears again in `Passing`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Category { Passing, All }

impl HistPair {

    fn new(edges: &[f32]) -> Self {
        Self { pass: hist(edges), all: hist(edges) }
    }

    fn fill(&mut self, value: f32, category: Category) {
        match category {
            Category::Passing => self.pass.fill(&value),
            Category::All     => self.all .fill(&value),
        }
    }
}

impl std::ops::AddAssign<&HistPair> for HistPair {
    fn add_assign(&mut self, rhs: &HistPair) {
        self.pass += &rhs.pass;
        self.all  += &rhs.all;
    }
}

/// The full set of Tag-and-Probe histograms for one trigger selection.
#[derive(Clone, Debug)]
pub struct TnpHistograms {
    pub pt: HistPair,
    pub pt_barrel: HistPair,
    pub pt_endcap: HistPair,
    pub eta: HistPair,
    pub phi: HistPair,
}

impl Default for TnpHistograms {
    fn default() -> Self { Self::new() }
}

impl TnpHistograms {

    pub fn new() -> Self {
        Self {
            pt: HistPair::new(&PT_EDGES),
            pt_barrel: HistPair::new(&PT_EDGES),
            pt_endcap: HistPair::new(&PT_EDGES),
            eta: HistPair::new(&ETA_EDGES),
            phi: HistPair::new(&PHI_EDGES),
        }
    }

    pub fn fill_probe(&mut self, probe: &Probe, category: Category) {
        self.pt.fill(probe.pt, category);
        if probe.eta.abs() <= BARREL_ENDCAP_SPLIT {
            self.pt_barrel.fill(probe.pt, category);
        } else {
            self.pt_endcap.fill(probe.pt, category);
        }
        self.eta.fill(probe.eta, category);
        self.phi.fill(probe.phi, category);
    }

    /// Fill from both symmetrized probe arms. Passing probes are a subset of
    /// all probes, so the passing histograms can never outgrow the all ones.
    pub fn fill(&mut self, arms: &ProbeArms) {
        for probe in arms.all()     { self.fill_probe(probe, Category::All);     }
        for probe in arms.passing() { self.fill_probe(probe, Category::Passing); }
    }
}

impl std::ops::AddAssign<&TnpHistograms> for TnpHistograms {
    fn add_assign(&mut self, rhs: &TnpHistograms) {
        self.pt        += &rhs.pt;
        self.pt_barrel += &rhs.pt_barrel;
        self.pt_endcap += &rhs.pt_endcap;
        self.eta       += &rhs.eta;
        self.phi       += &rhs.phi;
    }
}
