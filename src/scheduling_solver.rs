//! Backtracking enumeration of feasible choice→slot assignments.
//!
//! Grounded on `examples/original_source/src/SchedulingSolver.h`/`.cpp`. See `SPEC_FULL.md` §4.3
//! for the gate-by-gate description this file implements.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::cancel::CancelToken;
use crate::constraint::{Constraint, RelationOp};
use crate::critical_set_analysis::CriticalSetAnalysis;
use crate::ids::{ChoiceId, SlotId};
use crate::input_data::InputData;
use crate::scheduling::Scheduling;

pub struct SchedulingSolver<'a> {
    input: &'a InputData,
    analysis: &'a CriticalSetAnalysis,
}

impl<'a> SchedulingSolver<'a> {
    #[must_use]
    pub fn new(input: &'a InputData, analysis: &'a CriticalSetAnalysis) -> Self {
        Self { input, analysis }
    }

    /// Runs one backtracking search at the given preference limit. Returns `None` on exhaustion,
    /// timeout, or cancellation.
    pub fn solve(
        &self,
        preference_limit: i32,
        rng: &mut StdRng,
        cancel: &CancelToken,
    ) -> Option<Scheduling> {
        let choice_count = self.input.choice_count();
        let slot_count = self.input.slot_count();
        if choice_count == 0 {
            return Some(Scheduling::new(Vec::new()));
        }

        let scramble = get_choice_scramble(self.input, rng);
        let critical_sets = self.analysis.for_preference(preference_limit);

        let mut decisions: Vec<Option<SlotId>> = vec![None; choice_count];
        let mut slot_max_sum: Vec<u32> = vec![0; slot_count];
        let mut slot_min_sum: Vec<u32> = vec![0; slot_count];
        let mut slot_choice_count: Vec<u32> = vec![0; slot_count];
        let mut stack: Vec<Vec<SlotId>> = Vec::with_capacity(choice_count);
        let mut depth = 0usize;

        loop {
            if cancel.is_cancelled() {
                return None;
            }
            if depth == choice_count {
                let result: Vec<SlotId> = decisions
                    .iter()
                    .map(|d| d.expect("every choice decided at depth == choice_count"))
                    .collect();
                return Some(Scheduling::new(result));
            }

            if stack.len() == depth {
                let candidates = self.calculate_feasible_slots(
                    &scramble,
                    depth,
                    &decisions,
                    &slot_max_sum,
                    &slot_min_sum,
                    &slot_choice_count,
                    &critical_sets,
                    rng,
                );
                stack.push(candidates);
            }

            match stack[depth].pop() {
                Some(slot) => {
                    let choice = scramble[depth];
                    decisions[choice.index()] = Some(slot);
                    slot_max_sum[slot.index()] += self.input.choice(choice).max;
                    slot_min_sum[slot.index()] += self.input.choice(choice).min;
                    slot_choice_count[slot.index()] += 1;
                    depth += 1;
                }
                None => {
                    stack.pop();
                    if depth == 0 {
                        return None;
                    }
                    depth -= 1;
                    let choice = scramble[depth];
                    if let Some(slot) = decisions[choice.index()].take() {
                        slot_max_sum[slot.index()] -= self.input.choice(choice).max;
                        slot_min_sum[slot.index()] -= self.input.choice(choice).min;
                        slot_choice_count[slot.index()] -= 1;
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn calculate_feasible_slots(
        &self,
        scramble: &[ChoiceId],
        depth: usize,
        decisions: &[Option<SlotId>],
        slot_max_sum: &[u32],
        slot_min_sum: &[u32],
        slot_choice_count: &[u32],
        critical_sets: &[&crate::critical_set::CriticalSet],
        rng: &mut StdRng,
    ) -> Vec<SlotId> {
        let chooser_count = self.input.chooser_count() as u64;
        let choice = scramble[depth];
        let choice_data = self.input.choice(choice);
        let available_max_push: u64 = scramble[depth..]
            .iter()
            .map(|&c| u64::from(self.input.choice(c).max))
            .sum();

        // Gate 1: impossibility.
        for slot in self.input.slot_ids() {
            if available_max_push + u64::from(slot_max_sum[slot.index()]) < chooser_count {
                return Vec::new();
            }
        }

        // Gate 2: critical-set violation.
        for set in critical_sets {
            let distinct_slots_hit: std::collections::HashSet<SlotId> = set
                .choices
                .iter()
                .filter_map(|&c| decisions[c.index()])
                .collect();
            let unassigned = set
                .choices
                .iter()
                .filter(|&&c| decisions[c.index()].is_none())
                .count();
            if distinct_slots_hit.len() + unassigned < self.input.slot_count() {
                return Vec::new();
            }
        }

        // Gate 3: critical slots.
        let mut critical_slots = Vec::new();
        for slot in self.input.slot_ids() {
            let push_without_current = available_max_push - u64::from(choice_data.max);
            if push_without_current + u64::from(slot_max_sum[slot.index()]) < chooser_count {
                critical_slots.push(slot);
            }
        }
        if critical_slots.len() > 1 {
            return Vec::new();
        }
        if critical_slots.len() == 1 {
            let slot = critical_slots[0];
            return if self.satisfies_scheduling_constraints(
                choice,
                slot,
                decisions,
                slot_choice_count,
            ) {
                vec![slot]
            } else {
                Vec::new()
            };
        }

        // Gate 4: enumerate feasible slots.
        let mut normal: Vec<SlotId> = self
            .input
            .slot_ids()
            .filter(|&slot| !self.input.slot(slot).is_not_scheduled)
            .filter(|&slot| {
                u64::from(choice_data.min) + u64::from(slot_min_sum[slot.index()]) <= chooser_count
            })
            .filter(|&slot| {
                self.satisfies_scheduling_constraints(choice, slot, decisions, slot_choice_count)
            })
            .collect();
        normal.sort_by_key(|&s| slot_max_sum[s.index()]);

        let low_priority: Vec<SlotId> = if choice_data.optional {
            self.input
                .not_scheduled_slots()
                .filter(|&slot| {
                    self.satisfies_scheduling_constraints(choice, slot, decisions, slot_choice_count)
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut ordered = riffle_shuffle(normal, low_priority, rng);
        ordered.reverse(); // try highest priority first by popping from the back.
        ordered
    }

    fn satisfies_scheduling_constraints(
        &self,
        choice: ChoiceId,
        slot: SlotId,
        decisions: &[Option<SlotId>],
        slot_choice_count: &[u32],
    ) -> bool {
        for &idx in self.input.scheduling_constraints_for(choice) {
            let constraint = &self.input.constraints()[idx];
            let ok = match *constraint {
                Constraint::ChoiceIsInSlot(_, s) => slot == s,
                Constraint::ChoiceIsNotInSlot(_, s) => slot != s,
                Constraint::ChoicesAreInSameSlot(a, b) => {
                    let other = if a == choice { b } else { a };
                    match decisions[other.index()] {
                        Some(other_slot) => other_slot == slot,
                        None => true,
                    }
                }
                Constraint::ChoicesAreNotInSameSlot(a, b) => {
                    let other = if a == choice { b } else { a };
                    match decisions[other.index()] {
                        Some(other_slot) => other_slot != slot,
                        None => true,
                    }
                }
                Constraint::ChoicesHaveOffset(a, b, k) => {
                    let (other, sign) = if a == choice { (b, 1i32) } else { (a, -1i32) };
                    match decisions[other.index()] {
                        Some(other_slot) => {
                            let diff = other_slot.index() as i32 - slot.index() as i32;
                            diff == sign * k
                        }
                        None => {
                            // "both scheduled or both not": if other is a not-scheduled slot
                            // there is nothing further to check here; if other is undecided we
                            // just need this slot to be within the offset-feasible window.
                            let lo = (-k).max(0);
                            let hi = self.input.slot_count() as i32 - k.abs();
                            (slot.index() as i32) >= lo && (slot.index() as i32) < hi
                        }
                    }
                }
                _ => true,
            };
            if !ok {
                return false;
            }
        }
        for &idx in self.input.size_constraints_for(slot) {
            if let Constraint::SlotHasLimitedSize(_, op, n) = self.input.constraints()[idx] {
                if op.is_lazy() {
                    continue;
                }
                let tentative = slot_choice_count[slot.index()] + 1;
                let ok = match op {
                    RelationOp::Eq | RelationOp::Leq => tentative <= n,
                    RelationOp::Lt => tentative < n,
                    _ => true,
                };
                if !ok {
                    return false;
                }
            }
        }
        true
    }

    /// Full recount check of every `SlotHasLimitedSize` constraint, run once a complete scheduling
    /// has been produced (covers the lazy `Neq`/`Gt`/`Geq` operators that can't be pruned eagerly).
    #[must_use]
    pub fn check_slot_size_constraints(&self, scheduling: &Scheduling) -> bool {
        for constraint in self.input.constraints() {
            if let Constraint::SlotHasLimitedSize(slot, op, n) = *constraint {
                let count = scheduling.choices_in(slot).count() as i64;
                if !op.eval(count, i64::from(n)) {
                    return false;
                }
            }
        }
        true
    }
}

/// Random order, then stable-sorted by descending count of scheduling constraints touching the
/// choice, so heavily-constrained choices are decided first.
#[must_use]
pub fn get_choice_scramble(input: &InputData, rng: &mut StdRng) -> Vec<ChoiceId> {
    let mut scramble: Vec<ChoiceId> = input.choice_ids().collect();
    scramble.shuffle(rng);
    scramble.sort_by_key(|&c| std::cmp::Reverse(input.scheduling_constraints_for(c).len()));
    scramble
}

/// Interleaves `primary` and `secondary`, keeping each list's relative order (a riffle shuffle),
/// biased toward drawing from `primary` first.
fn riffle_shuffle(primary: Vec<SlotId>, secondary: Vec<SlotId>, rng: &mut StdRng) -> Vec<SlotId> {
    let mut merged = Vec::with_capacity(primary.len() + secondary.len());
    let mut a = primary.into_iter().peekable();
    let mut b = secondary.into_iter().peekable();
    while a.peek().is_some() || b.peek().is_some() {
        let take_a = match (a.peek(), b.peek()) {
            (Some(_), Some(_)) => rng.random_bool(0.75),
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        if take_a {
            merged.push(a.next().unwrap());
        } else {
            merged.push(b.next().unwrap());
        }
    }
    merged
}

/// Stateful wrapper yielding successive schedulings with preference relaxation, one per worker
/// thread (each with its own RNG stream). Grounded on the source's `next_scheduling`.
pub struct SchedulingEnumerator<'a> {
    solver: SchedulingSolver<'a>,
    input: &'a InputData,
    analysis: &'a CriticalSetAnalysis,
}

impl<'a> SchedulingEnumerator<'a> {
    #[must_use]
    pub fn new(input: &'a InputData, analysis: &'a CriticalSetAnalysis) -> Self {
        Self {
            solver: SchedulingSolver::new(input, analysis),
            input,
            analysis,
        }
    }

    /// With probability 1/10 starts fully relaxed; otherwise starts at `preference_bound` and
    /// relaxes one level at a time until a scheduling is found or `max_preference` is exhausted.
    pub fn next_scheduling(&self, rng: &mut StdRng, cancel: &CancelToken) -> Option<Scheduling> {
        let max_pref = self.input.max_preference();
        let levels = self.input.preference_levels();
        let start = if rng.random_bool(0.1) {
            max_pref
        } else {
            self.analysis.preference_bound()
        };
        let mut idx = levels.iter().position(|&p| p == start).unwrap_or(0);
        loop {
            if cancel.is_cancelled() {
                return None;
            }
            let limit = levels[idx];
            if let Some(scheduling) = self.solver.solve(limit, rng, cancel) {
                if self.solver.check_slot_size_constraints(&scheduling) {
                    return Some(scheduling);
                }
            }
            if limit >= max_pref {
                return None;
            }
            idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_data::InputDataBuilder;
    use crate::raw_input::{RawChoice, RawChooser, RawInputData, RawSlot};

    fn s1_input() -> InputData {
        InputDataBuilder::build(RawInputData {
            choices: vec![RawChoice { name: "e".into(), min: 1, max: 1, parts: 1, optional: false }],
            choosers: vec![RawChooser { name: "p".into(), preferences: vec![1] }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        })
        .unwrap()
    }

    #[test]
    fn solves_minimal_scenario() {
        let input = s1_input();
        let analysis = CriticalSetAnalysis::analyze(&input, true);
        let solver = SchedulingSolver::new(&input, &analysis);
        let mut rng = crate::rng::thread_rng();
        let cancel = CancelToken::never();
        let scheduling = solver.solve(input.max_preference(), &mut rng, &cancel).unwrap();
        assert!(scheduling.is_feasible(&input));
    }

    #[test]
    fn enumerator_yields_feasible_scheduling() {
        let input = s1_input();
        let analysis = CriticalSetAnalysis::analyze(&input, true);
        let enumerator = SchedulingEnumerator::new(&input, &analysis);
        let mut rng = crate::rng::thread_rng();
        let cancel = CancelToken::never();
        let scheduling = enumerator.next_scheduling(&mut rng, &cancel).unwrap();
        assert!(scheduling.is_feasible(&input));
    }
}
