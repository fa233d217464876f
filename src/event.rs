//! Event records and electron/trigger-object kinematics
//!
//! One `Events` value holds a batch of collision events in columnar form:
//! scalar columns (`run`, `luminosity_block`) plus jagged collections of
//! `Electron` and `TrigObj` records. Events are immutable once loaded; all
//! selection produces new, event-aligned values.

use std::f32::consts::{PI, TAU};

use crate::jagged::Jagged;

/// Reconstructed electron candidate. Kinematics are a massless four-vector
/// (pt, eta, phi); `cut_based` is the identification quality tier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Electron {
    pub pt: f32,
    pub eta: f32,
    pub phi: f32,
    pub charge: i32,
    pub cut_based: i32,
}

/// `cut_based` value of the tight identification working point.
pub const CUT_BASED_TIGHT: i32 = 4;

/// Object reconstructed by the online trigger system. `id` is a particle-type
/// code (electron = 11); `filter_bits` records which named online filters the
/// object satisfied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrigObj {
    pub pt: f32,
    pub eta: f32,
    pub phi: f32,
    pub id: i32,
    pub filter_bits: i32,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Events {
    pub run: Vec<u32>,
    pub luminosity_block: Vec<u32>,
    pub electrons: Jagged<Electron>,
    pub trig_objs: Jagged<TrigObj>,
}

impl Events {

    pub fn n_events(&self) -> usize { self.run.len() }

    /// Keep whole events: event `i` survives iff `keep[i]`. All columns stay
    /// aligned.
    pub fn select(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.n_events());
        let pick = |col: &[u32]| col.iter().zip(keep)
            .filter(|(_, &k)| k)
            .map(|(&x, _)| x)
            .collect();
        Self {
            run: pick(&self.run),
            luminosity_block: pick(&self.luminosity_block),
            electrons: self.electrons.select_events(keep),
            trig_objs: self.trig_objs.select_events(keep),
        }
    }
}

/// Signed azimuthal difference `a - b`, wrapped into (-pi, pi].
pub fn delta_phi(a: f32, b: f32) -> f32 {
    let d = (a - b).rem_euclid(TAU);
    if d > PI { d - TAU } else { d }
}

/// Angular distance in eta-phi space, with the wrap-around azimuthal metric.
pub fn delta_r(eta1: f32, phi1: f32, eta2: f32, phi2: f32) -> f32 {
    let deta = eta1 - eta2;
    let dphi = delta_phi(phi1, phi2);
    (deta * deta + dphi * dphi).sqrt()
}

/// Invariant mass of the summed four-momenta of two massless candidates:
/// `m^2 = 2 pt1 pt2 (cosh(deta) - cos(dphi))`.
pub fn invariant_mass(a: &Electron, b: &Electron) -> f32 {
    let m2 = 2.0 * a.pt * b.pt * ((a.eta - b.eta).cosh() - delta_phi(a.phi, b.phi).cos());
    m2.max(0.0).sqrt()
}

/// True outside (or at the limits of) the ECAL barrel-endcap transition gap.
pub fn outside_ecal_gap(eta: f32) -> bool {
    let abs_eta = eta.abs();
    abs_eta < 1.4442 || abs_eta > 1.566
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_eq::assert_float_eq;
    use rstest::rstest;

    pub fn ele(pt: f32, eta: f32, phi: f32, charge: i32) -> Electron {
        Electron { pt, eta, phi, charge, cut_based: CUT_BASED_TIGHT }
    }

    #[rstest(a, b, expected,
             case( 0.1     , -0.1     ,  0.2),
             case(-0.1     ,  0.1     , -0.2),
             case( PI - 0.05, -PI + 0.05, -0.1), // shortest way crosses the pi boundary
             case(-PI + 0.05,  PI - 0.05,  0.1),
             case( 1.0      ,  1.0      ,  0.0),
    )]
    fn delta_phi_wraps(a: f32, b: f32, expected: f32) {
        assert_float_eq!(delta_phi(a, b), expected, abs <= 1e-6);
    }

    #[test]
    fn delta_r_across_phi_boundary() {
        // 0.06 apart in phi (through the boundary), 0.08 apart in eta: dr = 0.1
        let dr = delta_r(1.0, PI - 0.03, 1.08, -PI + 0.03);
        assert_float_eq!(dr, 0.1, abs <= 1e-6);
    }

    #[test]
    fn back_to_back_mass() {
        // massless, equal pt, back to back: m = 2 pt
        let a = ele(45.0, 0.0, 0.0, 1);
        let b = ele(45.0, 0.0, PI, -1);
        assert_float_eq!(invariant_mass(&a, &b), 90.0, abs <= 1e-3);
    }

    #[test]
    fn collinear_mass_is_zero() {
        let a = ele(40.0, 1.2, 0.5, 1);
        let b = ele(20.0, 1.2, 0.5, -1);
        assert_float_eq!(invariant_mass(&a, &b), 0.0, abs <= 1e-2);
    }

    #[rstest(eta, expected,
             case( 0.0  , true ),
             case( 1.4441, true ),
             case( 1.4442, false), // gap edges belong to the gap
             case(-1.5   , false),
             case( 1.566 , false),
             case( 1.5661, true ),
             case(-2.3   , true ),
    )]
    fn ecal_gap_edges(eta: f32, expected: bool) {
        assert_eq!(outside_ecal_gap(eta), expected);
    }

    #[test]
    fn event_selection_keeps_columns_aligned() {
        let events = Events {
            run: vec![1, 1, 2],
            luminosity_block: vec![10, 11, 12],
            electrons: Jagged::from_events(&[
                vec![ele(30.0, 0.1, 0.0, 1)],
                vec![],
                vec![ele(40.0, -1.0, 2.0, -1), ele(50.0, 0.4, -2.0, 1)],
            ]),
            trig_objs: Jagged::from_events(&[vec![], vec![], vec![]]),
        };
        let sel = events.select(&[false, true, true]);
        assert_eq!(sel.run, vec![1, 2]);
        assert_eq!(sel.luminosity_block, vec![11, 12]);
        assert_eq!(sel.electrons.counts().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(sel.trig_objs.n_events(), 2);
    }
}
