//! The chooser→choice mapping produced by the assignment solver, per slot.
//!
//! Grounded on `examples/original_source/src/Assignment.h`/`.cpp`.

use crate::ids::{ChoiceId, ChooserId, SlotId};
use crate::input_data::InputData;

#[derive(Clone, Debug)]
pub struct Assignment {
    /// `data[chooser][slot] = choice`.
    data: Vec<Vec<ChoiceId>>,
}

impl Assignment {
    #[must_use]
    pub fn new(data: Vec<Vec<ChoiceId>>) -> Self {
        Self { data }
    }

    #[must_use]
    pub fn choice_of(&self, chooser: ChooserId, slot: SlotId) -> ChoiceId {
        self.data[chooser.index()][slot.index()]
    }

    #[must_use]
    pub fn choosers_ordered(&self, choice: ChoiceId) -> Vec<ChooserId> {
        let mut out: Vec<ChooserId> = self
            .data
            .iter()
            .enumerate()
            .filter(|(_, row)| row.contains(&choice))
            .map(|(p, _)| ChooserId::from(p))
            .collect();
        out.sort();
        out
    }

    #[must_use]
    pub fn choices_ordered(&self, chooser: ChooserId) -> Vec<ChoiceId> {
        let mut out = self.data[chooser.index()].clone();
        out.sort();
        out
    }

    #[must_use]
    pub fn is_in_choice(&self, chooser: ChooserId, choice: ChoiceId) -> bool {
        self.data[chooser.index()].contains(&choice)
    }

    #[must_use]
    pub fn max_used_preference(&self, input: &InputData) -> i32 {
        let mut best = i32::MIN;
        for p in input.chooser_ids() {
            for s in input.slot_ids() {
                best = best.max(input.preference(p, self.choice_of(p, s)));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{ChoiceId, ChooserId, SlotId};

    #[test]
    fn choosers_ordered_finds_every_attendee() {
        let assignment = Assignment::new(vec![
            vec![ChoiceId(0), ChoiceId(1)],
            vec![ChoiceId(1), ChoiceId(0)],
        ]);
        assert_eq!(assignment.choosers_ordered(ChoiceId(0)), vec![ChooserId(0), ChooserId(1)]);
        assert!(assignment.is_in_choice(ChooserId(0), ChoiceId(0)));
        assert!(!assignment.is_in_choice(ChooserId(0), ChoiceId(2)));
        let _ = SlotId(0);
    }
}
