//! HLT_ElePt_CaloIdVT_GsfTrkIdT selection
//!
//! Dual-leg-style prefilter: tag-eligible electrons must already sit above
//! the trigger threshold, inside |eta| <= 2.5, outside the ECAL transition
//! gap and pass tight identification; an event needs at least two of them.
//! Matching tests filter bit 11 with an equality check on the masked value.

use crate::event::{outside_ecal_gap, Events, CUT_BASED_TIGHT};
use crate::jagged::Jagged;
use crate::matching::{BitTest, MatchConfig};
use crate::pairs::zcands;
use crate::triggers::{find_probes, Classifier, ProbeArms};

const FILTERBIT: u8 = 11;

/// Keep events with at least two tag-eligible electrons; returns the
/// filtered events and the per-electron eligibility mask, event-aligned.
pub fn filter_events(events: &Events, pt: f32) -> (Events, Jagged<bool>) {
    let enough: Vec<bool> = events.electrons.counts().map(|n| n >= 2).collect();
    let events = events.select(&enough);

    let eligible = events.electrons.map(|e| {
        e.pt > pt
            && e.eta.abs() <= 2.5
            && outside_ecal_gap(e.eta)
            && e.cut_based == CUT_BASED_TIGHT
    });
    let keep: Vec<bool> = eligible.count_true().iter().map(|&n| n >= 2).collect();
    (events.select(&keep), eligible.select_events(&keep))
}

fn classifier(pt: f32) -> Classifier {
    Classifier {
        tag_match:   MatchConfig::new(pt, FILTERBIT, BitTest::Exact),
        probe_match: MatchConfig::new(pt, FILTERBIT, BitTest::Exact),
        tag_pt_min: None,   // prefilter already demands pt > threshold
        probe_pt_min: None,
    }
}

pub fn select(events: &Events, pt: f32) -> ProbeArms {
    let (good_events, eligible) = filter_events(events, pt);
    let ele_for_tnp = good_events.electrons.filter(&eligible);
    let (zc1, zc2) = zcands(&ele_for_tnp);
    let cfg = classifier(pt);
    let (pass1, all1) = find_probes(&zc1, &good_events.trig_objs, &cfg);
    let (pass2, all2) = find_probes(&zc2, &good_events.trig_objs, &cfg);
    ProbeArms { pass1, all1, pass2, all2 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Electron, TrigObj};
    use pretty_assertions::assert_eq;

    fn ele(pt: f32, eta: f32, phi: f32, charge: i32) -> Electron {
        Electron { pt, eta, phi, charge, cut_based: CUT_BASED_TIGHT }
    }

    fn events_with_electrons(electrons: Vec<Vec<Electron>>) -> Events {
        let n = electrons.len();
        Events {
            run: vec![1; n],
            luminosity_block: (0..n as u32).collect(),
            electrons: Jagged::from_events(&electrons),
            trig_objs: Jagged::from_events(&vec![Vec::<TrigObj>::new(); n]),
        }
    }

    #[test]
    fn prefilter_needs_two_eligible_electrons() {
        let good    = ele(40.0, 0.5, 0.0, 1);
        let low_pt  = ele(20.0, 0.5, 1.0, -1);
        let in_gap  = ele(40.0, 1.5, 1.0, -1);
        let forward = ele(40.0, 2.6, 1.0, -1);
        let loose   = Electron { cut_based: 3, ..ele(40.0, -0.5, 1.0, -1) };

        let events = events_with_electrons(vec![
            vec![good, good],            // kept
            vec![good],                  // only one electron
            vec![good, low_pt],          // second fails pt
            vec![good, in_gap],          // second sits in the ECAL gap
            vec![good, forward],         // second beyond |eta| = 2.5
            vec![good, loose],           // second not tight
            vec![good, good, low_pt],    // kept: two of three eligible
        ]);

        let (kept, eligible) = filter_events(&events, 30.0);
        assert_eq!(kept.n_events(), 2);
        assert_eq!(kept.luminosity_block, vec![0, 6]);
        assert_eq!(eligible.count_true(), vec![2, 2]);
        // the mask stays aligned with the *unfiltered* electrons of kept events
        assert_eq!(eligible.event(1), &[true, true, false]);
    }

    #[test]
    fn gap_edge_electron_is_eligible_at_2_5() {
        let edge = ele(40.0, 2.5, 0.0, 1);
        let events = events_with_electrons(vec![vec![edge, edge]]);
        let (kept, _) = filter_events(&events, 30.0);
        assert_eq!(kept.n_events(), 1); // |eta| <= 2.5 is inclusive
    }
}
