//! Lexicographic solution scoring.
//!
//! Grounded on `examples/original_source/src/Score.h`/`.cpp` and `Scoring.h`/`.cpp`. The minor-score
//! formula follows the spec's explicit `(raw_pref + 1)^E` convention (the same convention the
//! source's `AssignmentSolver` already uses for flow-edge cost), rather than the source's
//! `Scoring::evaluate_minor`, which computes plain `pref^E` — an inconsistency within the source
//! itself that this repo resolves in favour of the edge-cost convention everywhere.

use crate::assignment::Assignment;
use crate::constraint::Constraint;
use crate::input_data::InputData;
use crate::options::Options;
use crate::scheduling::Scheduling;

#[derive(Clone, Copy, Debug)]
pub struct Score {
    pub major: f64,
    pub minor: f64,
}

impl Score {
    #[must_use]
    pub fn invalid() -> Self {
        Self { major: f64::INFINITY, minor: f64::INFINITY }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.major.is_infinite() && self.minor.is_infinite() && self.major.is_sign_positive()
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::invalid()
    }
}

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        let major_eq = self.major == other.major || (self.major.is_nan() && other.major.is_nan());
        major_eq && self.minor == other.minor
    }
}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        use std::cmp::Ordering;
        let major_eq = self.major == other.major || (self.major.is_nan() && other.major.is_nan());
        if major_eq {
            self.minor.partial_cmp(&other.minor)
        } else {
            self.major.partial_cmp(&other.major).or(Some(Ordering::Greater))
        }
    }
}

pub struct Scoring<'a> {
    input: &'a InputData,
    options: &'a Options,
    scaling: f64,
}

impl<'a> Scoring<'a> {
    #[must_use]
    pub fn new(input: &'a InputData, options: &'a Options) -> Self {
        let scaling = (f64::from(input.max_preference()) + 1.0).powf(options.preference_exponent);
        Self { input, options, scaling }
    }

    #[must_use]
    pub fn satisfies_constraints_scheduling(&self, scheduling: &Scheduling) -> bool {
        for constraint in self.input.constraints() {
            let ok = match *constraint {
                Constraint::ChoiceIsInSlot(c, s) => scheduling.slot_of(c) == s,
                Constraint::ChoiceIsNotInSlot(c, s) => scheduling.slot_of(c) != s,
                Constraint::ChoicesAreInSameSlot(a, b) => scheduling.slot_of(a) == scheduling.slot_of(b),
                Constraint::ChoicesAreNotInSameSlot(a, b) => scheduling.slot_of(a) != scheduling.slot_of(b),
                Constraint::ChoicesHaveOffset(a, b, k) => {
                    scheduling.slot_of(b).index() as i32 - scheduling.slot_of(a).index() as i32 == k
                }
                Constraint::SlotHasLimitedSize(s, op, n) => {
                    let count = scheduling.choices_in(s).count() as i64;
                    op.eval(count, i64::from(n))
                }
                _ => true,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn satisfies_constraints_assignment(&self, assignment: &Assignment) -> bool {
        for constraint in self.input.constraints() {
            let ok = match *constraint {
                Constraint::ChoosersHaveSameChoices(p, q, _) => {
                    assignment.choices_ordered(p) == assignment.choices_ordered(q)
                }
                Constraint::ChooserIsInChoice(p, c) => assignment.is_in_choice(p, c),
                Constraint::ChooserIsNotInChoice(p, c) => !assignment.is_in_choice(p, c),
                _ => true,
            };
            if !ok {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn is_feasible(&self, scheduling: &Scheduling, assignment: &Assignment) -> bool {
        if !self.satisfies_constraints_scheduling(scheduling) || !self.satisfies_constraints_assignment(assignment) {
            return false;
        }

        let mut part_counts = vec![0u32; self.input.choice_count()];
        let mut in_slot = vec![vec![false; self.input.slot_count()]; self.input.chooser_count()];
        for p in self.input.chooser_ids() {
            for s in self.input.slot_ids() {
                let c = assignment.choice_of(p, s);
                let slot = scheduling.slot_of(c);
                if in_slot[p.index()][slot.index()] {
                    return false;
                }
                in_slot[p.index()][slot.index()] = true;
                part_counts[c.index()] += 1;
            }
        }
        for c in self.input.choice_ids() {
            let data = self.input.choice(c);
            if part_counts[c.index()] < data.min || part_counts[c.index()] > data.max {
                return false;
            }
        }
        true
    }

    fn evaluate_major(&self, assignment: &Assignment) -> i32 {
        let mut best = 0;
        for p in self.input.chooser_ids() {
            for s in self.input.slot_ids() {
                let c = assignment.choice_of(p, s);
                best = best.max(self.input.preference(p, c));
            }
        }
        best
    }

    fn evaluate_minor(&self, scheduling: &Scheduling, assignment: &Assignment) -> f64 {
        if !self.is_feasible(scheduling, assignment) {
            return f64::INFINITY;
        }
        let mut pref_count = vec![0u32; (self.input.max_preference() + 1) as usize];
        for p in self.input.chooser_ids() {
            for s in self.input.slot_ids() {
                let c = assignment.choice_of(p, s);
                pref_count[self.input.preference(p, c) as usize] += 1;
            }
        }
        let mut sum = 0.0;
        for (pref, &count) in pref_count.iter().enumerate() {
            sum += f64::from(count) * (pref as f64 + 1.0).powf(self.options.preference_exponent) / self.scaling;
        }
        sum
    }

    #[must_use]
    pub fn evaluate(&self, scheduling: &Scheduling, assignment: Option<&Assignment>) -> Score {
        let Some(assignment) = assignment else {
            return Score::invalid();
        };
        let major = if self.options.greedy { f64::NAN } else { f64::from(self.evaluate_major(assignment)) };
        let minor = self.evaluate_minor(scheduling, assignment);
        if (major.is_finite() || major.is_nan()) && minor.is_finite() {
            Score { major, minor }
        } else {
            Score::invalid()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_majors_compare_equal_and_fall_back_to_minor() {
        let a = Score { major: f64::NAN, minor: 1.0 };
        let b = Score { major: f64::NAN, minor: 2.0 };
        assert!(a < b);
    }

    #[test]
    fn lower_minor_wins_when_majors_tie() {
        let a = Score { major: 2.0, minor: 1.0 };
        let b = Score { major: 2.0, minor: 5.0 };
        assert!(a < b);
    }

    #[test]
    fn invalid_is_worse_than_any_finite_score() {
        let finite = Score { major: 0.0, minor: 0.0 };
        assert!(finite < Score::invalid());
    }
}
