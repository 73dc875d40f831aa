//! Constraint canonicalisation, reduction, and dependent-choice-group expansion.
//!
//! Grounded on `examples/original_source/src/input/InputDataBuilder.cpp`'s `build_constraints` and
//! the reduction-rule table in `SPEC_FULL.md` §4.1.

use crate::constraint::{Constraint, RawConstraint, SetRelation};
use crate::error::InputError;
use crate::ids::{ChoiceId, ChooserId};
use crate::union_find::UnionFind;

/// Reduces non-canonical constraint forms to their canonical equivalent, dropping tautologies and
/// failing on the one form that is unconditionally unsatisfiable when its operands differ.
pub fn reduce_and_optimize(raw: Vec<RawConstraint>) -> Result<Vec<Constraint>, InputError> {
    let mut out = Vec::with_capacity(raw.len());
    for c in raw {
        match c {
            RawConstraint::SlotContainsChoice(s, c) => out.push(Constraint::ChoiceIsInSlot(c, s)),
            RawConstraint::SlotNotContainsChoice(s, c) => {
                out.push(Constraint::ChoiceIsNotInSlot(c, s));
            }
            RawConstraint::ChoiceContainsChooser(c, p) => {
                out.push(Constraint::ChooserIsInChoice(p, c));
            }
            RawConstraint::ChoiceNotContainsChooser(c, p) => {
                out.push(Constraint::ChooserIsNotInChoice(p, c));
            }
            RawConstraint::SlotsHaveSameChoices(a, b) => {
                if a == b {
                    // Tautology, drop.
                } else {
                    return Err(InputError::UnsatisfiableConstraint(format!(
                        "SlotsHaveSameChoices({}, {}) can never hold for distinct slots",
                        a, b
                    )));
                }
            }
            RawConstraint::ChoiceIsInSlot(c, s) => out.push(Constraint::ChoiceIsInSlot(c, s)),
            RawConstraint::ChoiceIsNotInSlot(c, s) => out.push(Constraint::ChoiceIsNotInSlot(c, s)),
            RawConstraint::ChoicesAreInSameSlot(a, b) => {
                out.push(Constraint::ChoicesAreInSameSlot(a, b));
            }
            RawConstraint::ChoicesAreNotInSameSlot(a, b) => {
                out.push(Constraint::ChoicesAreNotInSameSlot(a, b));
            }
            RawConstraint::ChoicesHaveOffset(a, b, k) => {
                out.push(Constraint::ChoicesHaveOffset(a, b, k));
            }
            RawConstraint::SlotHasLimitedSize(s, op, n) => {
                out.push(Constraint::SlotHasLimitedSize(s, op, n));
            }
            RawConstraint::ChoicesHaveSameChoosers(a, b) => {
                out.push(Constraint::ChoicesHaveSameChoosers(a, b));
            }
            RawConstraint::ChooserIsInChoice(p, c) => out.push(Constraint::ChooserIsInChoice(p, c)),
            RawConstraint::ChooserIsNotInChoice(p, c) => {
                out.push(Constraint::ChooserIsNotInChoice(p, c));
            }
            RawConstraint::ChoosersHaveSameChoices(p, q, rel) => {
                out.push(Constraint::ChoosersHaveSameChoices(p, q, rel));
            }
        }
    }
    Ok(out)
}

/// Builds the dependent-choice groups implied by `ChoicesHaveSameChoosers`, via union-find over
/// the constraint list. Groups are sorted by smallest member for deterministic iteration.
#[must_use]
pub fn dependent_choice_groups(constraints: &[Constraint], choice_count: usize) -> Vec<Vec<ChoiceId>> {
    let mut uf = UnionFind::new(choice_count);
    for c in constraints {
        if let Constraint::ChoicesHaveSameChoosers(a, b) = c {
            uf.union(a.index(), b.index());
        }
    }
    uf.groups()
        .into_iter()
        .map(|g| g.into_iter().map(ChoiceId::from).collect())
        .collect()
}

/// For every chooser `p`, the set of choices `p` is mandated into via `ChooserIsInChoice`. These
/// form a "mandatory critical set": `p` must attend all of them, so none may share a slot.
#[must_use]
pub fn mandatory_critical_sets(
    constraints: &[Constraint],
    chooser_count: usize,
) -> Vec<Vec<ChoiceId>> {
    let mut by_chooser: Vec<Vec<ChoiceId>> = vec![Vec::new(); chooser_count];
    for c in constraints {
        if let Constraint::ChooserIsInChoice(p, c) = c {
            by_chooser[p.index()].push(*c);
        }
    }
    for group in &mut by_chooser {
        group.sort();
        group.dedup();
    }
    by_chooser.into_iter().filter(|g| g.len() > 1).collect()
}

/// Expands `ChoicesHaveSameChoosers` groups and mandatory-critical-set groups into
/// `ChoicesAreNotInSameSlot` pairwise constraints, and replicates per-chooser mandatory
/// constraints across dependent groups. Returns the constraints to append.
#[must_use]
pub fn expand_dependent_constraints(
    constraints: &[Constraint],
    groups: &[Vec<ChoiceId>],
    chooser_count: usize,
) -> Vec<Constraint> {
    let mut extra = Vec::new();

    for group in groups {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                extra.push(Constraint::ChoicesAreNotInSameSlot(group[i], group[j]));
            }
        }
    }

    for group in mandatory_critical_sets(constraints, chooser_count) {
        for i in 0..group.len() {
            for j in (i + 1)..group.len() {
                extra.push(Constraint::ChoicesAreNotInSameSlot(group[i], group[j]));
            }
        }
    }

    let group_of = |choice: ChoiceId| -> Option<&Vec<ChoiceId>> {
        groups.iter().find(|g| g.contains(&choice))
    };
    for c in constraints {
        match c {
            Constraint::ChooserIsInChoice(p, choice) => {
                if let Some(group) = group_of(*choice) {
                    for &other in group {
                        if other != *choice {
                            extra.push(Constraint::ChooserIsInChoice(*p, other));
                        }
                    }
                }
            }
            Constraint::ChooserIsNotInChoice(p, choice) => {
                if let Some(group) = group_of(*choice) {
                    for &other in group {
                        if other != *choice {
                            extra.push(Constraint::ChooserIsNotInChoice(*p, other));
                        }
                    }
                }
            }
            _ => {}
        }
    }

    extra
}

/// Merges per-group capacity bounds in place: `min <- max(group mins)`, `max <- min(group maxes)`.
pub fn merge_group_bounds(mins: &mut [u32], maxs: &mut [u32], groups: &[Vec<ChoiceId>]) {
    for group in groups {
        let min = group.iter().map(|c| mins[c.index()]).max().unwrap_or(0);
        let max = group
            .iter()
            .map(|c| maxs[c.index()])
            .min()
            .unwrap_or(u32::MAX);
        for c in group {
            mins[c.index()] = min;
            maxs[c.index()] = max;
        }
    }
}

/// Merges per-group preferences in place, taking the best (minimum, post-normalisation) value
/// across every chooser's entries for the group's choices.
pub fn merge_group_preferences(preferences: &mut [Vec<i32>], groups: &[Vec<ChoiceId>]) {
    for prefs in preferences.iter_mut() {
        for group in groups {
            let best = group.iter().map(|c| prefs[c.index()]).min().unwrap_or(0);
            for c in group {
                prefs[c.index()] = best;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::RelationOp;
    use crate::ids::SlotId;

    #[test]
    fn slots_have_same_choices_tautology_is_dropped() {
        let raw = vec![RawConstraint::SlotsHaveSameChoices(SlotId(0), SlotId(0))];
        let result = reduce_and_optimize(raw).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn slots_have_same_choices_mismatch_is_infeasible() {
        let raw = vec![RawConstraint::SlotsHaveSameChoices(SlotId(0), SlotId(1))];
        assert!(reduce_and_optimize(raw).is_err());
    }

    #[test]
    fn non_canonical_forms_reduce() {
        let raw = vec![
            RawConstraint::SlotContainsChoice(SlotId(0), ChoiceId(1)),
            RawConstraint::ChoiceContainsChooser(ChoiceId(2), ChooserId(0)),
        ];
        let result = reduce_and_optimize(raw).unwrap();
        assert!(matches!(result[0], Constraint::ChoiceIsInSlot(ChoiceId(1), SlotId(0))));
        assert!(matches!(
            result[1],
            Constraint::ChooserIsInChoice(ChooserId(0), ChoiceId(2))
        ));
    }

    #[test]
    fn dependent_groups_expand_to_pairwise_not_same_slot() {
        let constraints = vec![Constraint::ChoicesHaveSameChoosers(ChoiceId(0), ChoiceId(1))];
        let groups = dependent_choice_groups(&constraints, 3);
        assert_eq!(groups, vec![vec![ChoiceId(0), ChoiceId(1)]]);
        let extra = expand_dependent_constraints(&constraints, &groups, 0);
        assert!(matches!(
            extra[0],
            Constraint::ChoicesAreNotInSameSlot(ChoiceId(0), ChoiceId(1))
        ));
    }

    #[test]
    fn relation_op_eval() {
        assert!(RelationOp::Leq.eval(2, 3));
        assert!(!RelationOp::Gt.eval(2, 3));
        assert!(RelationOp::Neq.eval(2, 3));
    }
}
