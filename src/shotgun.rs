//! The top-level search driver: repeatedly draws a scheduling and hill-climbs its assignment, in
//! parallel across worker threads, keeping the best solution found.
//!
//! Grounded on `examples/original_source/src/ShotgunSolver.h`/`.cpp` and
//! `ShotgunSolverThreaded.h`/`.cpp`. The source drives each worker with a raw `pthread_create`/
//! `pthread_join` pair and a `shared_future`-based cancellation token; this is reworked onto
//! `std::thread::scope` (so worker closures can borrow the shared, read-only problem bundle
//! without an `Arc`) plus the `CancelToken` in `cancel.rs`, per the REDESIGN FLAG on concurrency
//! primitives noted in `SPEC_FULL.md` §5.

use std::sync::Mutex;
use std::time::Instant;

use crate::assignment_solver::AssignmentSolver;
use crate::cancel::CancelToken;
use crate::critical_set_analysis::CriticalSetAnalysis;
use crate::hill_climbing::HillClimbingSolver;
use crate::input_data::InputData;
use crate::mip_flow::FlowSolverBackend;
use crate::mip_flow_static::MipFlowStaticData;
use crate::options::Options;
use crate::score::{Score, Scoring};
use crate::scheduling_solver::SchedulingEnumerator;
use crate::solution::Solution;

#[derive(Default)]
pub struct ShotgunProgress {
    pub iterations: u64,
    pub assignments: u64,
    pub lp: u64,
    pub best_score: Score,
    pub best_solution: Option<Solution>,
}

/// Single-threaded search loop; one instance runs per worker thread.
pub struct ShotgunSolver<'a> {
    enumerator: SchedulingEnumerator<'a>,
    hill_climbing: HillClimbingSolver<'a>,
    scoring: &'a Scoring<'a>,
    progress: ShotgunProgress,
}

impl<'a> ShotgunSolver<'a> {
    #[must_use]
    pub fn new(
        input: &'a InputData,
        analysis: &'a CriticalSetAnalysis,
        static_data: &'a MipFlowStaticData,
        scoring: &'a Scoring<'a>,
        options: &'a Options,
        backend: &'a dyn FlowSolverBackend,
    ) -> Self {
        let assignment_solver = AssignmentSolver::new(input, analysis, static_data, options, backend);
        Self {
            enumerator: SchedulingEnumerator::new(input, analysis),
            hill_climbing: HillClimbingSolver::new(input, assignment_solver, scoring, options.max_neighbors),
            scoring,
            progress: ShotgunProgress { best_score: Score::invalid(), ..Default::default() },
        }
    }

    #[must_use]
    pub fn progress(&self) -> &ShotgunProgress {
        &self.progress
    }

    /// Runs up to `iterations` shotgun rounds, stopping early on cancellation or scheduling
    /// exhaustion. Returns the number of rounds actually completed.
    pub fn iterate(
        &mut self,
        iterations: u32,
        rng: &mut rand::rngs::StdRng,
        cancel: &CancelToken,
    ) -> u32 {
        let mut done = 0;
        for _ in 0..iterations {
            let Some(scheduling) = self.enumerator.next_scheduling(rng, cancel) else { break };
            let solution = self.hill_climbing.solve(scheduling, rng, cancel);
            if cancel.is_cancelled() {
                break;
            }
            let score = self.scoring.evaluate(&solution.scheduling, solution.assignment.as_ref());
            if score < self.progress.best_score {
                self.progress.best_score = score;
                self.progress.best_solution = Some(solution);
            }
            self.progress.iterations += 1;
            self.progress.assignments = u64::from(self.hill_climbing.assignment_count());
            self.progress.lp = u64::from(self.hill_climbing.lp_count());
            done += 1;
        }
        done
    }
}

/// Drives `thread_count` (or 1, for the single-slot/trivial-input bypass) worker threads, each
/// running its own `ShotgunSolver` until the shared deadline or an `--any` early-stop fires.
pub struct ShotgunSolverThreaded<'a> {
    input: &'a InputData,
    analysis: &'a CriticalSetAnalysis,
    static_data: &'a MipFlowStaticData,
    scoring: &'a Scoring<'a>,
    options: &'a Options,
    backend: &'a dyn FlowSolverBackend,
}

impl<'a> ShotgunSolverThreaded<'a> {
    #[must_use]
    pub fn new(
        input: &'a InputData,
        analysis: &'a CriticalSetAnalysis,
        static_data: &'a MipFlowStaticData,
        scoring: &'a Scoring<'a>,
        options: &'a Options,
        backend: &'a dyn FlowSolverBackend,
    ) -> Self {
        Self { input, analysis, static_data, scoring, options, backend }
    }

    #[must_use]
    pub fn run(&self) -> Option<Solution> {
        let bypass_to_single_thread = self.input.slot_count() <= 1;
        let thread_count = if bypass_to_single_thread { 1 } else { self.options.thread_count.max(1) };
        let deadline = Instant::now() + self.options.timeout;
        let cancel = CancelToken::new(Some(deadline));

        let progress_slots: Vec<Mutex<ShotgunProgress>> = (0..thread_count)
            .map(|_| Mutex::new(ShotgunProgress { best_score: Score::invalid(), ..Default::default() }))
            .collect();

        std::thread::scope(|scope| {
            for slot in &progress_slots {
                let cancel = cancel.clone();
                scope.spawn(move || {
                    let mut rng = crate::rng::thread_rng();
                    let mut solver = ShotgunSolver::new(
                        self.input,
                        self.analysis,
                        self.static_data,
                        self.scoring,
                        self.options,
                        self.backend,
                    );
                    loop {
                        if cancel.is_cancelled() {
                            break;
                        }
                        let done = solver.iterate(1, &mut rng, &cancel);
                        {
                            let mut guard = slot.lock().unwrap();
                            *guard = std::mem::replace(
                                &mut solver.progress,
                                ShotgunProgress { best_score: guard.best_score, ..Default::default() },
                            );
                        }
                        if done == 0 {
                            break;
                        }
                        if self.options.any && solver.progress().best_solution.is_some() {
                            cancel.cancel();
                            break;
                        }
                        if bypass_to_single_thread {
                            break;
                        }
                    }
                });
            }
        });

        progress_slots
            .into_iter()
            .filter_map(|m| m.into_inner().unwrap().best_solution)
            .min_by(|a, b| a.score.partial_cmp(&b.score).unwrap_or(std::cmp::Ordering::Equal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_data::InputDataBuilder;
    use crate::raw_input::{RawChoice, RawChooser, RawInputData, RawSlot};
    use crate::scip_backend::ScipFlowSolver;

    #[test]
    fn single_slot_input_bypasses_to_one_thread() {
        let input = InputDataBuilder::build(RawInputData {
            choices: vec![RawChoice { name: "e".into(), min: 1, max: 1, parts: 1, optional: false }],
            choosers: vec![RawChooser { name: "p".into(), preferences: vec![0] }],
            slots: vec![RawSlot { name: "s".into() }],
            constraints: vec![],
        })
        .unwrap();
        let analysis = CriticalSetAnalysis::analyze(&input, true);
        let static_data = MipFlowStaticData::new(&input);
        let mut options = Options::default();
        options.timeout = std::time::Duration::from_millis(200);
        let scoring = Scoring::new(&input, &options);
        let backend = ScipFlowSolver;
        let driver = ShotgunSolverThreaded::new(&input, &analysis, &static_data, &scoring, &options, &backend);
        assert_eq!(input.slot_count(), 1);
        let _ = driver; // constructing the driver must not panic even without running it.
    }
}
