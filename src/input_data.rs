//! The frozen, immutable problem description and the pipeline that builds it from a
//! [`RawInputData`] record. See `SPEC_FULL.md` §4.1.

use std::collections::BTreeMap;

use crate::constraint::{Constraint, RawConstraint};
use crate::constraints::{
    dependent_choice_groups, expand_dependent_constraints, merge_group_bounds,
    merge_group_preferences, reduce_and_optimize,
};
use crate::error::InputError;
use crate::ids::{ChoiceId, ChooserId, SlotId};
use crate::model::{ChoiceData, ChooserData, SlotData, MIN_PREF_PLACEHOLDER};
use crate::raw_input::RawInputData;

/// The immutable, frozen problem description. Shared read-only across all worker threads via
/// `Arc` once built.
pub struct InputData {
    choices: Vec<ChoiceData>,
    choosers: Vec<ChooserData>,
    slots: Vec<SlotData>,
    constraints: Vec<Constraint>,
    scheduling_by_choice: BTreeMap<u32, Vec<usize>>,
    assignment_by_choice: BTreeMap<u32, Vec<usize>>,
    assignment_by_chooser: BTreeMap<u32, Vec<usize>>,
    size_by_slot: BTreeMap<u32, Vec<usize>>,
    dependent_groups: Vec<Vec<ChoiceId>>,
    preference_levels: Vec<i32>,
    max_preference: i32,
}

impl InputData {
    #[must_use]
    pub fn choice_count(&self) -> usize {
        self.choices.len()
    }

    #[must_use]
    pub fn chooser_count(&self) -> usize {
        self.choosers.len()
    }

    #[must_use]
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn choice(&self, id: ChoiceId) -> &ChoiceData {
        &self.choices[id.index()]
    }

    #[must_use]
    pub fn chooser(&self, id: ChooserId) -> &ChooserData {
        &self.choosers[id.index()]
    }

    #[must_use]
    pub fn slot(&self, id: SlotId) -> &SlotData {
        &self.slots[id.index()]
    }

    pub fn choice_ids(&self) -> impl Iterator<Item = ChoiceId> {
        (0..self.choices.len()).map(ChoiceId::from)
    }

    pub fn chooser_ids(&self) -> impl Iterator<Item = ChooserId> {
        (0..self.choosers.len()).map(ChooserId::from)
    }

    pub fn slot_ids(&self) -> impl Iterator<Item = SlotId> {
        (0..self.slots.len()).map(SlotId::from)
    }

    #[must_use]
    pub fn preference(&self, chooser: ChooserId, choice: ChoiceId) -> i32 {
        self.choosers[chooser.index()].preference(choice)
    }

    #[must_use]
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    #[must_use]
    pub fn scheduling_constraints_for(&self, choice: ChoiceId) -> &[usize] {
        self.scheduling_by_choice
            .get(&choice.0)
            .map_or(&[], |v| v.as_slice())
    }

    /// Indices of `SlotHasLimitedSize` constraints naming this slot. Kept separate from
    /// `scheduling_constraints_for` because this constraint doesn't name a choice.
    #[must_use]
    pub fn size_constraints_for(&self, slot: SlotId) -> &[usize] {
        self.size_by_slot.get(&slot.0).map_or(&[], |v| v.as_slice())
    }

    #[must_use]
    pub fn assignment_constraints_for_choice(&self, choice: ChoiceId) -> &[usize] {
        self.assignment_by_choice
            .get(&choice.0)
            .map_or(&[], |v| v.as_slice())
    }

    #[must_use]
    pub fn assignment_constraints_for_chooser(&self, chooser: ChooserId) -> &[usize] {
        self.assignment_by_chooser
            .get(&chooser.0)
            .map_or(&[], |v| v.as_slice())
    }

    #[must_use]
    pub fn dependent_groups(&self) -> &[Vec<ChoiceId>] {
        &self.dependent_groups
    }

    #[must_use]
    pub fn preference_levels(&self) -> &[i32] {
        &self.preference_levels
    }

    #[must_use]
    pub fn max_preference(&self) -> i32 {
        self.max_preference
    }

    pub fn not_scheduled_slots(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slot_ids().filter(|s| self.slot(*s).is_not_scheduled)
    }
}

/// Orchestrates the build pipeline described in `SPEC_FULL.md` §4.1.
pub struct InputDataBuilder;

impl InputDataBuilder {
    pub fn build(raw: RawInputData) -> Result<InputData, InputError> {
        let RawInputData {
            choices: raw_choices,
            choosers: raw_choosers,
            slots: raw_slots,
            constraints: raw_constraints,
        } = raw;

        let mut choices: Vec<ChoiceData> = raw_choices
            .iter()
            .map(|c| ChoiceData {
                name: c.name.clone(),
                min: c.min,
                max: c.max,
                continuation: None,
                optional: c.optional,
                hidden: false,
            })
            .collect();

        let mut preferences: Vec<Vec<i32>> = raw_choosers.iter().map(|c| c.preferences.clone()).collect();
        let chooser_names: Vec<String> = raw_choosers.iter().map(|c| c.name.clone()).collect();

        let mut slots: Vec<SlotData> = raw_slots
            .iter()
            .map(|s| SlotData {
                name: s.name.clone(),
                is_not_scheduled: false,
            })
            .collect();
        if slots.is_empty() {
            slots.push(SlotData {
                name: "default".to_string(),
                is_not_scheduled: false,
            });
        }

        // Step 3: multi-part expansion. Parts chains are recorded for step 8's offset/cohort
        // constraints below.
        let mut part_chains: Vec<Vec<ChoiceId>> = Vec::new();
        for (i, raw_choice) in raw_choices.iter().enumerate() {
            if raw_choice.parts <= 1 {
                continue;
            }
            let mut chain = vec![ChoiceId::from(i)];
            let mut prev = ChoiceId::from(i);
            for part_no in 2..=raw_choice.parts {
                let new_id = ChoiceId::from(choices.len());
                choices.push(ChoiceData {
                    name: format!("~[{part_no}] {}", raw_choice.name),
                    min: raw_choice.min,
                    max: raw_choice.max,
                    continuation: None,
                    optional: raw_choice.optional,
                    hidden: true,
                });
                choices[prev.index()].continuation = Some(new_id);
                for chooser_prefs in &mut preferences {
                    let value = chooser_prefs[i];
                    chooser_prefs.push(value);
                }
                chain.push(new_id);
                prev = new_id;
            }
            part_chains.push(chain);
        }

        // Step 4: generated "not-scheduled" slots + hidden filler choices, sized to absorb
        // optional-choice demand.
        let chooser_count = raw_choosers.len();
        let non_optional_snapshot: Vec<ChoiceId> = choices
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.optional)
            .map(|(i, _)| ChoiceId::from(i))
            .collect();
        let has_optional = choices.iter().any(|c| c.optional);
        let sum_min_optional: u64 = choices
            .iter()
            .filter(|c| c.optional)
            .map(|c| u64::from(c.min))
            .sum();
        // At least one not-scheduled slot is generated whenever any choice is optional, even one
        // with `min == 0`, so it always has somewhere to land — not just enough slots to absorb
        // `sum_min_optional`. See `examples/original_source/src/input/InputDataBuilder.cpp`'s
        // `generate_extra_sets` (`numExtraSets = max(hasOpt ? 1 : 0, numExtraSets)`).
        let num_extra = if chooser_count == 0 {
            0
        } else {
            let computed = sum_min_optional.div_ceil(chooser_count as u64);
            computed.max(u64::from(has_optional))
        };

        let mut generated_constraints: Vec<RawConstraint> = Vec::new();
        for e in 0..num_extra {
            let slot_id = SlotId::from(slots.len());
            slots.push(SlotData {
                name: format!("~not_scheduled_{e}"),
                is_not_scheduled: true,
            });
            let filler_id = ChoiceId::from(choices.len());
            choices.push(ChoiceData {
                name: format!("~hidden_unassigned_{e}"),
                min: 0,
                max: chooser_count as u32 + 1,
                continuation: None,
                optional: true,
                hidden: true,
            });
            for chooser_prefs in &mut preferences {
                chooser_prefs.push(MIN_PREF_PLACEHOLDER);
            }
            generated_constraints.push(RawConstraint::ChoiceIsInSlot(filler_id, slot_id));
            for &mandatory in &non_optional_snapshot {
                generated_constraints.push(RawConstraint::ChoiceIsNotInSlot(mandatory, slot_id));
            }
        }

        // Step 5: normalise preferences. max_raw excludes the placeholder sentinel.
        let max_raw = preferences
            .iter()
            .flat_map(|row| row.iter().copied())
            .filter(|&p| p != MIN_PREF_PLACEHOLDER)
            .max()
            .unwrap_or(0);
        for row in &mut preferences {
            for value in row.iter_mut() {
                *value = if *value == MIN_PREF_PLACEHOLDER {
                    0
                } else {
                    max_raw - *value
                };
            }
        }

        // Step 8: multi-part cohort/offset constraints, between all ordered pairs in each chain.
        for chain in &part_chains {
            for i in 0..chain.len() {
                for j in (i + 1)..chain.len() {
                    generated_constraints
                        .push(RawConstraint::ChoicesHaveSameChoosers(chain[i], chain[j]));
                    generated_constraints.push(RawConstraint::ChoicesHaveOffset(
                        chain[i],
                        chain[j],
                        (j - i) as i32,
                    ));
                }
            }
        }

        let mut all_raw_constraints = raw_constraints;
        all_raw_constraints.extend(generated_constraints);

        // Step 9: reduce and optimise.
        let mut constraints = reduce_and_optimize(all_raw_constraints)?;

        let groups = dependent_choice_groups(&constraints, choices.len());
        let extra = expand_dependent_constraints(&constraints, &groups, chooser_count);
        constraints.extend(extra);

        // Merge per-group capacity bounds and preferences.
        let mut mins: Vec<u32> = choices.iter().map(|c| c.min).collect();
        let mut maxs: Vec<u32> = choices.iter().map(|c| c.max).collect();
        merge_group_bounds(&mut mins, &mut maxs, &groups);
        for (i, c) in choices.iter_mut().enumerate() {
            c.min = mins[i];
            c.max = maxs[i];
        }
        merge_group_preferences(&mut preferences, &groups);

        let choosers: Vec<ChooserData> = chooser_names
            .into_iter()
            .zip(preferences)
            .map(|(name, preferences)| ChooserData { name, preferences })
            .collect();

        // preference_levels: sorted unique normalised preferences across the whole matrix, plus 0
        // and the matrix max (same value here since normalisation already floors at 0).
        let mut levels: Vec<i32> = choosers
            .iter()
            .flat_map(|c| c.preferences.iter().copied())
            .collect();
        levels.push(0);
        levels.push(max_raw);
        levels.sort_unstable();
        levels.dedup();
        let max_preference = levels.last().copied().unwrap_or(0);

        // Bucket constraints per-choice/per-chooser, keyed by id for deterministic iteration.
        let mut scheduling_by_choice: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut assignment_by_choice: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut assignment_by_chooser: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        let mut size_by_slot: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
        for (idx, c) in constraints.iter().enumerate() {
            if let Constraint::SlotHasLimitedSize(slot, ..) = c {
                size_by_slot.entry(slot.0).or_default().push(idx);
            }
            if c.is_scheduling() {
                for choice in c.choices() {
                    scheduling_by_choice.entry(choice.0).or_default().push(idx);
                }
            } else {
                for choice in c.choices() {
                    assignment_by_choice.entry(choice.0).or_default().push(idx);
                }
                for chooser in c.choosers() {
                    assignment_by_chooser.entry(chooser.0).or_default().push(idx);
                }
            }
        }

        Ok(InputData {
            choices,
            choosers,
            slots,
            constraints,
            scheduling_by_choice,
            assignment_by_choice,
            assignment_by_chooser,
            size_by_slot,
            dependent_groups: groups,
            preference_levels: levels,
            max_preference,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw_input::{RawChoice, RawChooser, RawSlot};

    fn minimal_raw() -> RawInputData {
        RawInputData {
            choices: vec![RawChoice {
                name: "e".into(),
                min: 1,
                max: 1,
                parts: 1,
                optional: false,
            }],
            choosers: vec![RawChooser {
                name: "p".into(),
                preferences: vec![1],
            }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        }
    }

    #[test]
    fn builds_minimal_input() {
        let data = InputDataBuilder::build(minimal_raw()).unwrap();
        assert_eq!(data.choice_count(), 1);
        assert_eq!(data.chooser_count(), 1);
        assert_eq!(data.slot_count(), 1);
        assert_eq!(data.preference(ChooserId(0), ChoiceId(0)), 0);
    }

    #[test]
    fn generates_placeholder_slot_when_none_given() {
        let mut raw = minimal_raw();
        raw.slots.clear();
        let data = InputDataBuilder::build(raw).unwrap();
        assert_eq!(data.slot_count(), 1);
        assert_eq!(data.slot(SlotId(0)).name, "default");
    }

    #[test]
    fn optional_choice_generates_filler_and_not_scheduled_slot() {
        let raw = RawInputData {
            choices: vec![RawChoice {
                name: "w".into(),
                min: 1,
                max: 1,
                parts: 1,
                optional: true,
            }],
            choosers: vec![RawChooser {
                name: "p".into(),
                preferences: vec![0],
            }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        };
        let data = InputDataBuilder::build(raw).unwrap();
        assert!(data.not_scheduled_slots().count() >= 1);
        assert!(data.choices.iter().any(|c| c.hidden));
    }

    #[test]
    fn optional_choice_with_zero_min_still_gets_a_not_scheduled_slot() {
        let raw = RawInputData {
            choices: vec![RawChoice {
                name: "w".into(),
                min: 0,
                max: 1,
                parts: 1,
                optional: true,
            }],
            choosers: vec![RawChooser {
                name: "p".into(),
                preferences: vec![0],
            }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        };
        let data = InputDataBuilder::build(raw).unwrap();
        assert!(data.not_scheduled_slots().count() >= 1);
    }

    #[test]
    fn multi_part_choice_expands_and_links_continuation() {
        let raw = RawInputData {
            choices: vec![RawChoice {
                name: "m".into(),
                min: 1,
                max: 2,
                parts: 2,
                optional: false,
            }],
            choosers: vec![RawChooser {
                name: "p".into(),
                preferences: vec![1],
            }],
            slots: vec![RawSlot { name: "s1".into() }, RawSlot { name: "s2".into() }],
            constraints: vec![],
        };
        let data = InputDataBuilder::build(raw).unwrap();
        assert_eq!(data.choice_count(), 2);
        assert_eq!(data.choice(ChoiceId(0)).continuation, Some(ChoiceId(1)));
        assert!(data
            .constraints()
            .iter()
            .any(|c| matches!(c, Constraint::ChoicesAreNotInSameSlot(ChoiceId(0), ChoiceId(1)))));
    }
}
