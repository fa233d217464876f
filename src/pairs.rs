//! Symmetrized tag/probe pair generation
//!
//! Every unordered 2-combination of the eligible electrons in an event is
//! produced twice: once with the first member as tag and once with the roles
//! swapped. Both leptons of a pair thus get a turn on the probe arm, without
//! assuming which one actually fired the trigger. The resulting double
//! processing of each physical pair is intentional.

use itertools::Itertools;

use crate::event::Electron;
use crate::jagged::Jagged;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pair {
    pub tag: Electron,
    pub probe: Electron,
}

/// All C(n,2) pairs per event, in both role labelings. Events with fewer than
/// two eligible electrons contribute no pairs.
pub fn zcands(eligible: &Jagged<Electron>) -> (Jagged<Pair>, Jagged<Pair>) {
    let mut first_as_tag = Jagged::new();
    let mut second_as_tag = Jagged::new();
    for ev in eligible.iter_events() {
        first_as_tag .push_event(ev.iter().tuple_combinations()
                                 .map(|(&a, &b)| Pair { tag: a, probe: b }));
        second_as_tag.push_event(ev.iter().tuple_combinations()
                                 .map(|(&a, &b)| Pair { tag: b, probe: a }));
    }
    (first_as_tag, second_as_tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ele(pt: f32) -> Electron {
        Electron { pt, eta: 0.0, phi: 0.0, charge: 1, cut_based: 4 }
    }

    #[test]
    fn pair_counts_per_event() {
        let eligible = Jagged::from_events(&[
            vec![ele(1.0), ele(2.0), ele(3.0)], // C(3,2) = 3
            vec![ele(4.0)],                     // too few
            vec![],
            vec![ele(5.0), ele(6.0)],           // C(2,2) = 1
        ]);
        let (zc1, zc2) = zcands(&eligible);
        assert_eq!(zc1.counts().collect::<Vec<_>>(), vec![3, 0, 0, 1]);
        assert_eq!(zc2.counts().collect::<Vec<_>>(), vec![3, 0, 0, 1]);
    }

    #[test]
    fn role_swap_covers_every_pair_twice() {
        let eligible = Jagged::from_events(&[vec![ele(1.0), ele(2.0), ele(3.0)]]);
        let (zc1, zc2) = zcands(&eligible);

        // same underlying electron pairs, only the labels differ
        for (p1, p2) in zc1.event(0).iter().zip(zc2.event(0)) {
            assert_eq!(p1.tag, p2.probe);
            assert_eq!(p1.probe, p2.tag);
        }

        // the union covers each unordered pair exactly twice
        let mut seen: Vec<(u32, u32)> = zc1.event(0).iter().chain(zc2.event(0))
            .map(|p| {
                let (a, b) = (p.tag.pt as u32, p.probe.pt as u32);
                if a < b { (a, b) } else { (b, a) }
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![(1, 2), (1, 2), (1, 3), (1, 3), (2, 3), (2, 3)]);
    }
}
