//! Local search over schedulings: repeatedly moves to the best-scoring neighbour until none
//! improves on the current best.
//!
//! Grounded on `examples/original_source/src/HillClimbingSolver.h`/`.cpp`. The "both scheduled or
//! both not" resolution for `ChoicesHaveOffset` noted in `DESIGN.md` also governs neighbour
//! generation here: a single-move neighbour that would place a mandatory (non-optional) choice
//! into a generated not-scheduled slot is rejected outright rather than handed to the assignment
//! solver, since it can never be feasible.

use rand::rngs::StdRng;
use rand::Rng;

use crate::assignment_solver::AssignmentSolver;
use crate::cancel::CancelToken;
use crate::ids::{ChoiceId, SlotId};
use crate::input_data::InputData;
use crate::scheduling::Scheduling;
use crate::score::{Score, Scoring};
use crate::solution::Solution;

pub struct HillClimbingSolver<'a> {
    input: &'a InputData,
    assignment_solver: AssignmentSolver<'a>,
    scoring: &'a Scoring<'a>,
    max_neighbors: usize,
    assignment_count: std::cell::Cell<u32>,
}

impl<'a> HillClimbingSolver<'a> {
    #[must_use]
    pub fn new(input: &'a InputData, assignment_solver: AssignmentSolver<'a>, scoring: &'a Scoring<'a>, max_neighbors: usize) -> Self {
        Self { input, assignment_solver, scoring, max_neighbors, assignment_count: std::cell::Cell::new(0) }
    }

    #[must_use]
    pub fn assignment_count(&self) -> u32 {
        self.assignment_count.get()
    }

    #[must_use]
    pub fn lp_count(&self) -> u32 {
        self.assignment_solver.lp_count()
    }

    fn solve_solution(&self, scheduling: Scheduling, cancel: &CancelToken) -> Solution {
        let assignment = self.assignment_solver.solve(&scheduling, cancel).ok().flatten();
        self.assignment_count.set(self.assignment_count.get() + 1);
        match assignment {
            Some(a) => {
                let score = self.scoring.evaluate(&scheduling, Some(&a));
                Solution { scheduling, assignment: Some(a), score }
            }
            None => Solution::invalid(scheduling),
        }
    }

    fn max_neighbor_key(&self) -> usize {
        self.input.choice_count() * self.input.slot_count()
    }

    /// Single-move neighbour: re-home choice `key % choice_count` to a different slot.
    fn neighbor(&self, scheduling: &Scheduling, key: usize) -> Option<Scheduling> {
        let choice_count = self.input.choice_count();
        let w = ChoiceId::from(key % choice_count);
        let mut s = key / choice_count;
        if s >= scheduling.slot_of(w).index() {
            s += 1;
        }
        if s >= self.input.slot_count() {
            return None;
        }
        let new_slot = SlotId::from(s);
        if self.input.slot(new_slot).is_not_scheduled && !self.input.choice(w).optional {
            return None;
        }
        let mut data = scheduling.raw_slots().to_vec();
        data[w.index()] = new_slot;
        Some(Scheduling::new(data))
    }

    /// Cyclic-swap neighbour: picks a random growing chain of positions and rotates their slots.
    fn random_swap_neighbor(&self, scheduling: &Scheduling, rng: &mut StdRng) -> Scheduling {
        let n = scheduling.raw_slots().len();
        let mut data = scheduling.raw_slots().to_vec();
        let mut swap_idx = vec![rng.random_range(0..n)];
        loop {
            let next = loop {
                let candidate = rng.random_range(0..n);
                if !swap_idx.contains(&candidate) {
                    break candidate;
                }
            };
            swap_idx.push(next);
            if rng.random_range(0..3) != 0 || swap_idx.len() >= n / 2 {
                break;
            }
        }
        let mut carry = data[*swap_idx.last().unwrap()];
        for &idx in &swap_idx {
            std::mem::swap(&mut carry, &mut data[idx]);
        }
        Scheduling::new(data)
    }

    fn pick_neighbors(&self, scheduling: &Scheduling, rng: &mut StdRng) -> Vec<Scheduling> {
        let add_swap_neighbors = self.input.choice_count() > 1 && self.input.slot_count() > 1;
        let mut result = Vec::new();

        let mut keys: Vec<usize> = (0..self.max_neighbor_key()).collect();
        if keys.len() > self.max_neighbors {
            use rand::seq::SliceRandom;
            keys.shuffle(rng);
        }

        for (key_idx, &key) in keys.iter().enumerate() {
            if result.len() >= self.max_neighbors {
                break;
            }
            if key_idx > self.max_neighbors * 32 {
                break;
            }
            let Some(candidate) = self.neighbor(scheduling, key) else { continue };
            if !candidate.is_feasible(self.input) {
                continue;
            }
            result.push(candidate);
            if add_swap_neighbors {
                let swap = self.random_swap_neighbor(scheduling, rng);
                if swap.is_feasible(self.input) {
                    result.push(swap);
                }
            }
        }

        if add_swap_neighbors && result.len() < self.max_neighbors {
            let amount = (self.max_neighbors - result.len()).min(self.max_neighbor_key());
            let mut tries = 0;
            while tries < amount * 32 && result.len() < self.max_neighbors {
                let swap = self.random_swap_neighbor(scheduling, rng);
                if swap.is_feasible(self.input) {
                    result.push(swap);
                }
                tries += 1;
            }
        }

        result
    }

    pub fn solve(&self, scheduling: Scheduling, rng: &mut StdRng, cancel: &CancelToken) -> Solution {
        let mut best = self.solve_solution(scheduling, cancel);
        if best.is_invalid() {
            return best;
        }
        let mut best_score: Score = best.score;
        if !(best_score.major.is_finite() || best_score.major.is_nan()) || !best_score.minor.is_finite() {
            return Solution::invalid(best.scheduling);
        }

        loop {
            let mut found_better = false;
            for neighbor in self.pick_neighbors(&best.scheduling, rng) {
                let candidate = self.solve_solution(neighbor, cancel);
                if cancel.is_cancelled() {
                    return Solution::invalid(candidate.scheduling);
                }
                if candidate.score < best_score {
                    found_better = true;
                    best_score = candidate.score;
                    best = candidate;
                }
            }
            if !found_better {
                break;
            }
        }

        best
    }
}
