//! The pre-reduction record an input adapter produces. The core only ever consumes this type; it
//! has no knowledge of CSV, a DSL, or any other concrete input format. See `SPEC_FULL.md` §6.2.

use crate::constraint::RawConstraint;

#[derive(Clone, Debug)]
pub struct RawChoice {
    pub name: String,
    pub min: u32,
    pub max: u32,
    pub parts: u32,
    pub optional: bool,
}

#[derive(Clone, Debug)]
pub struct RawChooser {
    pub name: String,
    /// One entry per original (pre-expansion) choice, in `RawInputData::choices` order.
    pub preferences: Vec<i32>,
}

#[derive(Clone, Debug)]
pub struct RawSlot {
    pub name: String,
}

/// Ids inside `constraints` refer to positions in `choices`/`choosers`/`slots` as given here;
/// `InputDataBuilder` preserves these positions verbatim for original entities (hidden entities it
/// generates are always appended afterwards), so the ids stay valid through the whole pipeline.
#[derive(Clone, Debug, Default)]
pub struct RawInputData {
    pub choices: Vec<RawChoice>,
    pub choosers: Vec<RawChooser>,
    pub slots: Vec<RawSlot>,
    pub constraints: Vec<RawConstraint>,
}
