//! A single critical set: the choices a chooser would tolerate at a given preference threshold.
//!
//! Grounded on `examples/original_source/src/CriticalSet.h`/`.cpp`.

use crate::ids::ChoiceId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CriticalSet {
    pub preference: i32,
    /// Sorted, deduplicated.
    pub choices: Vec<ChoiceId>,
}

impl CriticalSet {
    #[must_use]
    pub fn new(preference: i32, mut choices: Vec<ChoiceId>) -> Self {
        choices.sort();
        choices.dedup();
        Self { preference, choices }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.choices.len()
    }

    /// `self` is dominated by `other` (a tighter or equal-tightness set): `other`'s preference
    /// threshold is no looser, and `self` is a superset of `other`, so `other`'s slot-coverage
    /// requirement already implies `self`'s.
    #[must_use]
    pub fn covered_by(&self, other: &CriticalSet) -> bool {
        self.preference <= other.preference
            && self
                .choices
                .iter()
                .collect::<std::collections::HashSet<_>>()
                .is_superset(&other.choices.iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn covered_by_requires_superset_and_lower_preference() {
        // b is the tighter set (fewer choices, same threshold); a is a looser superset and is
        // therefore redundant once b is known.
        let a = CriticalSet::new(1, vec![ChoiceId(0), ChoiceId(1)]);
        let b = CriticalSet::new(1, vec![ChoiceId(0)]);
        assert!(a.covered_by(&b));
        assert!(!b.covered_by(&a));
    }
}
