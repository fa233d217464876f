//! Ragged per-event arrays
//!
//! Event data comes in variable-length per-event lists (electrons, trigger
//! objects, candidate pairs). `Jagged<T>` stores them as one flat buffer plus
//! event offsets, so that boolean-mask filtering and combinatorics can be
//! expressed without ever losing track of event boundaries. Flattening is an
//! explicit, final step.

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub struct Jagged<T> {
    /// `offsets.len() == n_events + 1`; event `i` owns `data[offsets[i]..offsets[i+1]]`
    offsets: Vec<usize>,
    data: Vec<T>,
}

/// Per-event counts do not add up to the length of the flat column.
#[derive(Debug, Clone, PartialEq)]
pub struct LengthMismatch {
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "per-event counts sum to {} but flat column has {} entries",
               self.expected, self.found)
    }
}

impl std::error::Error for LengthMismatch {}

impl<T> Default for Jagged<T> {
    fn default() -> Self { Self::new() }
}

impl<T> Jagged<T> {

    pub fn new() -> Self { Self { offsets: vec![0], data: vec![] } }

    /// Reassemble a jagged array from per-event counts and a flat column.
    pub fn from_flat(counts: &[usize], data: Vec<T>) -> Result<Self, LengthMismatch> {
        let mut offsets = Vec::with_capacity(counts.len() + 1);
        let mut total = 0;
        offsets.push(0);
        for &n in counts {
            total += n;
            offsets.push(total);
        }
        if total != data.len() {
            return Err(LengthMismatch { expected: total, found: data.len() });
        }
        Ok(Self { offsets, data })
    }

    pub fn n_events(&self) -> usize { self.offsets.len() - 1 }
    pub fn n_items (&self) -> usize { self.data.len() }

    pub fn event(&self, i: usize) -> &[T] {
        &self.data[self.offsets[i] .. self.offsets[i+1]]
    }

    pub fn counts(&self) -> impl Iterator<Item = usize> + '_ {
        self.offsets.windows(2).map(|w| w[1] - w[0])
    }

    pub fn iter_events(&self) -> impl Iterator<Item = &[T]> {
        self.offsets.windows(2).map(move |w| &self.data[w[0]..w[1]])
    }

    pub fn push_event(&mut self, items: impl IntoIterator<Item = T>) {
        self.data.extend(items);
        self.offsets.push(self.data.len());
    }

    /// Element-wise transform; event boundaries are unchanged.
    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Jagged<U> {
        Jagged { offsets: self.offsets.clone(), data: self.data.iter().map(f).collect() }
    }

    /// Combine two identically-shaped jagged arrays element by element.
    pub fn zip_with<U, V>(&self, other: &Jagged<U>, mut f: impl FnMut(&T, &U) -> V) -> Jagged<V> {
        assert_eq!(self.offsets, other.offsets, "jagged arrays have different event structure");
        Jagged {
            offsets: self.offsets.clone(),
            data: self.data.iter().zip(&other.data).map(|(a, b)| f(a, b)).collect(),
        }
    }
}

impl<T: Clone> Jagged<T> {

    pub fn from_events(events: &[Vec<T>]) -> Self {
        let mut out = Self::new();
        for ev in events { out.push_event(ev.iter().cloned()); }
        out
    }

    /// Keep whole events: event `i` survives iff `keep[i]`.
    pub fn select_events(&self, keep: &[bool]) -> Self {
        assert_eq!(keep.len(), self.n_events());
        let mut out = Self::new();
        for (ev, &k) in self.iter_events().zip(keep) {
            if k { out.push_event(ev.iter().cloned()); }
        }
        out
    }

    /// Keep elements flagged in an identically-shaped boolean mask,
    /// preserving event boundaries.
    pub fn filter(&self, mask: &Jagged<bool>) -> Self {
        assert_eq!(self.offsets, mask.offsets, "mask has different event structure");
        let mut out = Self::new();
        for (ev, m) in self.iter_events().zip(mask.iter_events()) {
            out.push_event(ev.iter().zip(m).filter(|(_, &k)| k).map(|(x, _)| x.clone()));
        }
        out
    }

    /// Discard event structure.
    pub fn flatten(&self) -> Vec<T> { self.data.clone() }
}

impl Jagged<bool> {
    /// Number of set elements per event.
    pub fn count_true(&self) -> Vec<usize> {
        self.iter_events().map(|ev| ev.iter().filter(|&&b| b).count()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn example() -> Jagged<i32> {
        Jagged::from_events(&[vec![1, 2, 3], vec![], vec![4, 5]])
    }

    #[test]
    fn shape_bookkeeping() {
        let j = example();
        assert_eq!(j.n_events(), 3);
        assert_eq!(j.n_items(), 5);
        assert_eq!(j.counts().collect::<Vec<_>>(), vec![3, 0, 2]);
        assert_eq!(j.event(0), &[1, 2, 3]);
        assert_eq!(j.event(1), &[] as &[i32]);
        assert_eq!(j.event(2), &[4, 5]);
    }

    #[test]
    fn from_flat_checks_lengths() {
        assert_eq!(Jagged::from_flat(&[2, 1], vec![7, 8, 9]).unwrap(),
                   Jagged::from_events(&[vec![7, 8], vec![9]]));
        assert_eq!(Jagged::from_flat(&[2, 2], vec![7, 8, 9]),
                   Err(LengthMismatch { expected: 4, found: 3 }));
    }

    #[test]
    fn event_selection_keeps_alignment() {
        let j = example();
        let sel = j.select_events(&[true, false, true]);
        assert_eq!(sel, Jagged::from_events(&[vec![1, 2, 3], vec![4, 5]]));
    }

    #[test]
    fn mask_filter_keeps_event_boundaries() {
        let j = example();
        let mask = j.map(|&x| x % 2 == 1);
        let odd = j.filter(&mask);
        assert_eq!(odd, Jagged::from_events(&[vec![1, 3], vec![], vec![5]]));
        assert_eq!(mask.count_true(), vec![2, 0, 1]);
    }

    #[test]
    fn zip_with_combines_masks() {
        let j = example();
        let a = j.map(|&x| x > 1);
        let b = j.map(|&x| x < 5);
        let both = a.zip_with(&b, |&x, &y| x && y);
        assert_eq!(both.count_true(), vec![2, 0, 1]);
    }

    #[test]
    #[should_panic]
    fn mismatched_mask_panics() {
        let j = example();
        let short = Jagged::from_events(&[vec![true, false]]);
        j.filter(&short);
    }
}
