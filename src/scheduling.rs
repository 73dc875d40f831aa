//! The choice→slot mapping produced by the scheduling solver.
//!
//! Grounded on `examples/original_source/src/Scheduling.h`/`.cpp`. `NOT_SCHEDULED` has no
//! dedicated representation here; see `DESIGN.md`'s "NOT_SCHEDULED representation" note — an
//! optional choice that goes unscheduled is simply assigned to a generated not-scheduled slot.

use crate::ids::{ChoiceId, SlotId};
use crate::input_data::InputData;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Scheduling {
    /// Indexed by `ChoiceId`.
    slots: Vec<SlotId>,
}

impl Scheduling {
    #[must_use]
    pub fn new(slots: Vec<SlotId>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn slot_of(&self, choice: ChoiceId) -> SlotId {
        self.slots[choice.index()]
    }

    #[must_use]
    pub fn raw_slots(&self) -> &[SlotId] {
        &self.slots
    }

    pub fn choices_in<'a>(&'a self, slot: SlotId) -> impl Iterator<Item = ChoiceId> + 'a {
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, &s)| s == slot)
            .map(|(i, _)| ChoiceId::from(i))
    }

    /// For every slot, `Σ min(c) ≤ |choosers| ≤ Σ max(c)` over choices assigned to that slot.
    #[must_use]
    pub fn is_feasible(&self, input: &InputData) -> bool {
        let chooser_count = input.chooser_count() as u64;
        for slot in input.slot_ids() {
            let mut sum_min = 0u64;
            let mut sum_max = 0u64;
            for choice in self.choices_in(slot) {
                sum_min += u64::from(input.choice(choice).min);
                sum_max += u64::from(input.choice(choice).max);
            }
            if sum_min > chooser_count || chooser_count > sum_max {
                return false;
            }
        }
        true
    }
}
