//! Constraint types, expressed as a tagged sum rather than an enum-plus-int-tag pair so a new
//! variant cannot silently fall through a `match`.

use crate::ids::{ChoiceId, ChooserId, SlotId};

/// Comparison operator used by `SlotHasLimitedSize`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RelationOp {
    Eq,
    Neq,
    Lt,
    Leq,
    Gt,
    Geq,
}

impl RelationOp {
    #[must_use]
    pub fn eval(self, lhs: i64, rhs: i64) -> bool {
        match self {
            RelationOp::Eq => lhs == rhs,
            RelationOp::Neq => lhs != rhs,
            RelationOp::Lt => lhs < rhs,
            RelationOp::Leq => lhs <= rhs,
            RelationOp::Gt => lhs > rhs,
            RelationOp::Geq => lhs >= rhs,
        }
    }

    /// `true` for operators that can only be decided once every choice in the slot is placed.
    #[must_use]
    pub fn is_lazy(self) -> bool {
        matches!(self, RelationOp::Neq | RelationOp::Gt | RelationOp::Geq)
    }
}

/// Set relation used by `ChoosersHaveSameChoices`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SetRelation {
    Subset,
    Superset,
    Equal,
}

/// A raw (possibly non-canonical) constraint as read from the input adapter.
#[derive(Clone, Debug)]
pub enum RawConstraint {
    ChoiceIsInSlot(ChoiceId, SlotId),
    ChoiceIsNotInSlot(ChoiceId, SlotId),
    ChoicesAreInSameSlot(ChoiceId, ChoiceId),
    ChoicesAreNotInSameSlot(ChoiceId, ChoiceId),
    ChoicesHaveOffset(ChoiceId, ChoiceId, i32),
    SlotHasLimitedSize(SlotId, RelationOp, u32),
    ChoicesHaveSameChoosers(ChoiceId, ChoiceId),
    ChooserIsInChoice(ChooserId, ChoiceId),
    ChooserIsNotInChoice(ChooserId, ChoiceId),
    ChoosersHaveSameChoices(ChooserId, ChooserId, SetRelation),
    // Non-canonical, reduced away by `Constraints::reduce_and_optimize`.
    SlotContainsChoice(SlotId, ChoiceId),
    SlotNotContainsChoice(SlotId, ChoiceId),
    ChoiceContainsChooser(ChoiceId, ChooserId),
    ChoiceNotContainsChooser(ChoiceId, ChooserId),
    SlotsHaveSameChoices(SlotId, SlotId),
}

/// A canonical constraint, already reduced. Partitioned into scheduling/assignment constraints by
/// `is_scheduling`, matching the spec's "type id below a fixed discrimination threshold is
/// scheduling" rule without needing to carry an integer threshold around.
#[derive(Clone, Debug)]
pub enum Constraint {
    ChoiceIsInSlot(ChoiceId, SlotId),
    ChoiceIsNotInSlot(ChoiceId, SlotId),
    ChoicesAreInSameSlot(ChoiceId, ChoiceId),
    ChoicesAreNotInSameSlot(ChoiceId, ChoiceId),
    ChoicesHaveOffset(ChoiceId, ChoiceId, i32),
    SlotHasLimitedSize(SlotId, RelationOp, u32),
    ChoicesHaveSameChoosers(ChoiceId, ChoiceId),
    ChooserIsInChoice(ChooserId, ChoiceId),
    ChooserIsNotInChoice(ChooserId, ChoiceId),
    ChoosersHaveSameChoices(ChooserId, ChooserId, SetRelation),
}

impl Constraint {
    #[must_use]
    pub fn is_scheduling(&self) -> bool {
        matches!(
            self,
            Constraint::ChoiceIsInSlot(..)
                | Constraint::ChoiceIsNotInSlot(..)
                | Constraint::ChoicesAreInSameSlot(..)
                | Constraint::ChoicesAreNotInSameSlot(..)
                | Constraint::ChoicesHaveOffset(..)
                | Constraint::SlotHasLimitedSize(..)
        )
    }

    #[must_use]
    pub fn is_assignment(&self) -> bool {
        !self.is_scheduling()
    }

    /// The choices this constraint directly names, used to bucket constraints per-choice.
    #[must_use]
    pub fn choices(&self) -> Vec<ChoiceId> {
        match *self {
            Constraint::ChoiceIsInSlot(c, _)
            | Constraint::ChoiceIsNotInSlot(c, _)
            | Constraint::ChooserIsInChoice(_, c)
            | Constraint::ChooserIsNotInChoice(_, c) => vec![c],
            Constraint::ChoicesAreInSameSlot(a, b)
            | Constraint::ChoicesAreNotInSameSlot(a, b)
            | Constraint::ChoicesHaveOffset(a, b, _)
            | Constraint::ChoicesHaveSameChoosers(a, b) => vec![a, b],
            Constraint::SlotHasLimitedSize(..) | Constraint::ChoosersHaveSameChoices(..) => vec![],
        }
    }

    /// The choosers this constraint directly names, used to bucket constraints per-chooser.
    #[must_use]
    pub fn choosers(&self) -> Vec<ChooserId> {
        match *self {
            Constraint::ChooserIsInChoice(p, _) | Constraint::ChooserIsNotInChoice(p, _) => {
                vec![p]
            }
            Constraint::ChoosersHaveSameChoices(p, q, _) => vec![p, q],
            _ => vec![],
        }
    }
}
