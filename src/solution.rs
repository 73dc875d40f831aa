//! A scheduling paired with its optimal assignment and score.
//!
//! Grounded on `examples/original_source/src/Solution.h`.

use crate::assignment::Assignment;
use crate::score::Score;
use crate::scheduling::Scheduling;

#[derive(Clone)]
pub struct Solution {
    pub scheduling: Scheduling,
    pub assignment: Option<Assignment>,
    pub score: Score,
}

impl Solution {
    #[must_use]
    pub fn invalid(scheduling: Scheduling) -> Self {
        Self { scheduling, assignment: None, score: Score::invalid() }
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.assignment.is_none()
    }
}
