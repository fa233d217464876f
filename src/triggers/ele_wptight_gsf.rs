//! HLT_ElePt_WPTight_Gsf selection
//!
//! Single-leg-style prefilter: exactly two electrons, both tight and inside
//! |eta| <= 2.5; pt and ECAL-gap requirements are deferred to the pair stage
//! so they stay configurable. Matching tests filter bit 1 with an
//! any-overlap check; the tag side is fixed at 30 GeV.

use crate::event::{outside_ecal_gap, Events, CUT_BASED_TIGHT};
use crate::jagged::Jagged;
use crate::matching::{BitTest, MatchConfig};
use crate::pairs::{zcands, Pair};
use crate::triggers::{find_probes, Classifier, ProbeArms};

const FILTERBIT: u8 = 1;
const TAG_PT_MIN: f32 = 30.0;

/// Keep events with exactly two electrons, both tight and central.
pub fn filter_events(events: &Events) -> (Events, Jagged<bool>) {
    let two: Vec<bool> = events.electrons.counts().map(|n| n == 2).collect();
    let eligible = {
        let per_electron = events.electrons
            .map(|e| e.eta.abs() <= 2.5 && e.cut_based == CUT_BASED_TIGHT);
        let mut combined = Jagged::new();
        for (ev, &two_here) in per_electron.iter_events().zip(&two) {
            combined.push_event(ev.iter().map(|&ok| ok && two_here));
        }
        combined
    };
    let keep: Vec<bool> = eligible.count_true().iter().map(|&n| n == 2).collect();
    (events.select(&keep), eligible.select_events(&keep))
}

fn classifier(pt: f32) -> Classifier {
    Classifier {
        tag_match:   MatchConfig::new(TAG_PT_MIN, FILTERBIT, BitTest::Any),
        probe_match: MatchConfig::new(pt, FILTERBIT, BitTest::Any),
        tag_pt_min: Some(TAG_PT_MIN),
        probe_pt_min: Some(pt),
    }
}

fn drop_gap(zc: Jagged<Pair>, eta_of: impl Fn(&Pair) -> f32) -> Jagged<Pair> {
    let keep = zc.map(|p| outside_ecal_gap(eta_of(p)));
    zc.filter(&keep)
}

pub fn select(
    events: &Events,
    pt: f32,
    avoid_ecal_transition_tags: bool,
    avoid_ecal_transition_probes: bool,
) -> ProbeArms {
    let (good_events, eligible) = filter_events(events);
    let ele_for_tnp = good_events.electrons.filter(&eligible);
    let (mut zc1, mut zc2) = zcands(&ele_for_tnp);

    if avoid_ecal_transition_tags {
        zc1 = drop_gap(zc1, |p| p.tag.eta);
        zc2 = drop_gap(zc2, |p| p.tag.eta);
    }
    if avoid_ecal_transition_probes {
        zc1 = drop_gap(zc1, |p| p.probe.eta);
        zc2 = drop_gap(zc2, |p| p.probe.eta);
    }

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
    use std::f32::consts::PI;

    fn ele(pt: f32, eta: f32, phi: f32, charge: i32) -> Electron {
        Electron { pt, eta, phi, charge, cut_based: CUT_BASED_TIGHT }
    }

    fn tob(pt: f32, eta: f32, phi: f32) -> TrigObj {
        TrigObj { pt, eta, phi, id: 11, filter_bits: 0b10 }
    }

    #[test]
    fn prefilter_demands_exactly_two_good_electrons() {
        let good  = ele(40.0, 0.5, 0.0, 1);
        let loose = Electron { cut_based: 2, ..good };
        let events = Events {
            run: vec![1; 4],
            luminosity_block: vec![0, 1, 2, 3],
            electrons: Jagged::from_events(&[
                vec![good, good],        // kept
                vec![good],              // one electron
                vec![good, good, good],  // three electrons
                vec![good, loose],       // one fails tight id
            ]),
            trig_objs: Jagged::from_events(&[vec![], vec![], vec![], vec![]]),
        };
        let (kept, eligible) = filter_events(&events);
        assert_eq!(kept.luminosity_block, vec![0]);
        assert_eq!(eligible.count_true(), vec![2]);
    }

    #[test]
    fn gap_exclusion_flags_act_on_the_requested_arm() {
        // e1 central, e2 in the transition gap; both legs trigger-matched.
        let e1 = ele(45.0, 0.2, 0.0, 1);
        let e2 = ele(45.0, 1.5, PI, -1);
        let events = Events {
            run: vec![1],
            luminosity_block: vec![0],
            electrons: Jagged::from_events(&[vec![e1, e2]]),
            trig_objs: Jagged::from_events(&[vec![tob(35.0, 0.2, 0.0), tob(35.0, 1.5, PI)]]),
        };

        // No exclusion: each electron probes once.
        let arms = select(&events, 31.0, false, false);
        assert_eq!(arms.all().count(), 2);
        assert_eq!(arms.passing().count(), 2);

        // Gap probes excluded: only the central electron remains as probe.
        let arms = select(&events, 31.0, false, true);
        let all: Vec<_> = arms.all().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].eta, 0.2);

        // Gap tags excluded: pairs tagged by e2 vanish, so e1 never probes.
        let arms = select(&events, 31.0, true, false);
        let all: Vec<_> = arms.all().collect();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].eta, 1.5);

        // Both excluded: nothing survives.
        let arms = select(&events, 31.0, true, true);
        assert_eq!(arms.all().count(), 0);
    }
}
