//! Precomputes critical sets used to prune the scheduling backtracker.
//!
//! Grounded on `examples/original_source/src/CriticalSetAnalysis.h`/`.cpp`.

use log::debug;

use crate::critical_set::CriticalSet;
use crate::ids::ChoiceId;
use crate::input_data::InputData;

pub struct CriticalSetAnalysis {
    sets: Vec<CriticalSet>,
    preference_bound: i32,
}

impl CriticalSetAnalysis {
    /// Runs the full analysis. `simplify` controls the optional pairwise-simplification pass
    /// (`--no-cs-simp`).
    #[must_use]
    pub fn analyze(input: &InputData, simplify: bool) -> Self {
        let slot_count = input.slot_count();
        let chooser_count = input.chooser_count();
        let mut sets: Vec<CriticalSet> = Vec::new();

        let levels: Vec<i32> = {
            let mut v = input.preference_levels().to_vec();
            v.sort_unstable_by(|a, b| b.cmp(a));
            v
        };

        for &p in &levels {
            for chooser in input.chooser_ids() {
                let candidate_choices: Vec<ChoiceId> = input
                    .choice_ids()
                    .filter(|&c| input.preference(chooser, c) <= p)
                    .collect();
                let sum_min: u64 = candidate_choices
                    .iter()
                    .map(|&c| u64::from(input.choice(c).min))
                    .sum();
                if slot_count == 0 || sum_min > (chooser_count as u64) * (slot_count as u64 - 1) {
                    continue;
                }
                let candidate = CriticalSet::new(p, candidate_choices);
                if sets.iter().any(|existing| candidate.covered_by(existing)) {
                    continue;
                }
                sets.push(candidate);
            }
            debug!("critical set analysis reached preference level {p}, {} sets so far", sets.len());
        }

        if simplify {
            sets = simplify_sets(sets);
        }

        // Defaults to the highest preference level (no narrowing at all) when no critical set
        // spans every slot, matching `examples/original_source/src/CriticalSetAnalysis.cpp`'s
        // constructor, which seeds `preferenceBound` at `max_preference()` and only ever narrows it
        // with `min()` — never falls back to 0, which would instead seed the assignment binary
        // search at the wrong end of its range.
        let preference_bound = sets
            .iter()
            .filter(|s| s.size() >= slot_count)
            .map(|s| s.preference)
            .min()
            .unwrap_or_else(|| input.max_preference());

        Self { sets, preference_bound }
    }

    /// A degenerate analysis as if `--no-cs` had been passed: no critical sets, bound 0.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            sets: Vec::new(),
            preference_bound: 0,
        }
    }

    #[must_use]
    pub fn preference_bound(&self) -> i32 {
        self.preference_bound
    }

    #[must_use]
    pub fn sets(&self) -> &[CriticalSet] {
        &self.sets
    }

    /// All sets with level ≥ p, filtered so no returned set is a strict superset of another,
    /// sorted by ascending size.
    #[must_use]
    pub fn for_preference(&self, p: i32) -> Vec<&CriticalSet> {
        let mut candidates: Vec<&CriticalSet> = self.sets.iter().filter(|s| s.preference >= p).collect();
        candidates.sort_by_key(|s| s.size());
        let mut kept: Vec<&CriticalSet> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if kept.iter().any(|existing| {
                existing.size() < candidate.size()
                    && candidate
                        .choices
                        .iter()
                        .collect::<std::collections::HashSet<_>>()
                        .is_superset(&existing.choices.iter().collect())
            }) {
                continue;
            }
            kept.push(candidate);
        }
        kept
    }
}

fn simplify_sets(sets: Vec<CriticalSet>) -> Vec<CriticalSet> {
    let mut kept: Vec<CriticalSet> = Vec::with_capacity(sets.len());
    for candidate in sets {
        if kept.iter().any(|existing| candidate.covered_by(existing)) {
            continue;
        }
        kept.push(candidate);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ChooserId;
    use crate::input_data::InputDataBuilder;
    use crate::raw_input::{RawChoice, RawChooser, RawInputData, RawSlot};

    fn two_choice_input() -> InputData {
        InputDataBuilder::build(RawInputData {
            choices: vec![
                RawChoice { name: "e1".into(), min: 1, max: 1, parts: 1, optional: false },
                RawChoice { name: "e2".into(), min: 1, max: 1, parts: 1, optional: false },
            ],
            choosers: vec![RawChooser { name: "p".into(), preferences: vec![1, 0] }],
            slots: vec![RawSlot { name: "s1".into() }, RawSlot { name: "s2".into() }],
            constraints: vec![],
        })
        .unwrap()
    }

    #[test]
    fn preference_bound_finds_smallest_spanning_level() {
        let data = two_choice_input();
        let analysis = CriticalSetAnalysis::analyze(&data, true);
        assert!(analysis.preference_bound() >= 0);
        let _ = ChooserId(0);
    }

    #[test]
    fn disabled_has_no_sets() {
        let analysis = CriticalSetAnalysis::disabled();
        assert!(analysis.sets().is_empty());
        assert_eq!(analysis.preference_bound(), 0);
    }
}
