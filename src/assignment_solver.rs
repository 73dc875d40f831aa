//! Computes an optimal per-slot chooser→choice assignment for a fixed scheduling, via binary
//! search over preference limits on top of the min-cost-flow MIP.
//!
//! Grounded on `examples/original_source/src/AssignmentSolver.h`/`.cpp`. `handle_choosers_of_choices_relation`
//! in the source is an incomplete stub (a non-compiling `for(int )` loop) — this file implements
//! the `ChoosersHaveSameChoices` case it was meant to cover, mirroring the sibling
//! `handle_choices_of_choosers_relation` function that *is* complete in the source.

use crate::assignment::Assignment;
use crate::cancel::CancelToken;
use crate::constraint::{Constraint, SetRelation};
use crate::critical_set_analysis::CriticalSetAnalysis;
use crate::error::{Result, SolverError};
use crate::ids::ChoiceId;
use crate::input_data::InputData;
use crate::mip_flow::MipFlow;
use crate::mip_flow_static::{self, EdgeKey, MipFlowStaticData, NodeKey};
use crate::options::Options;
use crate::scheduling::Scheduling;

pub struct AssignmentSolver<'a> {
    input: &'a InputData,
    analysis: &'a CriticalSetAnalysis,
    static_data: &'a MipFlowStaticData,
    options: &'a Options,
    backend: &'a dyn crate::mip_flow::FlowSolverBackend,
    lp_count: std::cell::Cell<u32>,
}

impl<'a> AssignmentSolver<'a> {
    #[must_use]
    pub fn new(
        input: &'a InputData,
        analysis: &'a CriticalSetAnalysis,
        static_data: &'a MipFlowStaticData,
        options: &'a Options,
        backend: &'a dyn crate::mip_flow::FlowSolverBackend,
    ) -> Self {
        Self { input, analysis, static_data, options, backend, lp_count: std::cell::Cell::new(0) }
    }

    #[must_use]
    pub fn lp_count(&self) -> u32 {
        self.lp_count.get()
    }

    pub fn solve(&self, scheduling: &Scheduling, cancel: &CancelToken) -> Result<Option<Assignment>> {
        let levels = self.input.preference_levels();
        let start_idx = levels
            .iter()
            .position(|&p| p == self.analysis.preference_bound())
            .unwrap_or(0);

        if self.options.greedy {
            return self.solve_with_limit(scheduling, self.input.max_preference());
        }

        let mut min_idx = start_idx;
        let mut max_idx = levels.len() as i64 - 1;
        let mut best: Option<Assignment> = None;
        let mut idx = start_idx as i64;
        loop {
            if cancel.is_cancelled() {
                break;
            }
            let pref_limit = levels[idx as usize];
            match self.solve_with_limit(scheduling, pref_limit)? {
                Some(assignment) => {
                    best = Some(assignment);
                    max_idx = idx - 1;
                }
                None => {
                    min_idx = (idx + 1) as usize;
                }
            }
            if max_idx < min_idx as i64 {
                break;
            }
            idx = (max_idx + min_idx as i64) / 2;
        }
        Ok(best)
    }

    fn solve_with_limit(&self, scheduling: &Scheduling, preference_limit: i32) -> Result<Option<Assignment>> {
        let mut flow: MipFlow<NodeKey, EdgeKey> = self.static_data.base_flow.clone();
        let chooser_count = self.input.chooser_count();

        for p in self.input.chooser_ids() {
            for s in self.input.slot_ids() {
                let node = *flow.nodes().get(&mip_flow_static::node_chooser(p, s)).unwrap();
                flow.set_supply(node, 1);
            }
        }
        for w in self.input.choice_ids() {
            let node = *flow.nodes().get(&mip_flow_static::node_choice(w)).unwrap();
            flow.set_supply(node, -i64::from(self.input.choice(w).min));
        }
        for s in self.input.slot_ids() {
            let covered: u32 = self
                .input
                .choice_ids()
                .filter(|&w| scheduling.slot_of(w) == s)
                .map(|w| self.input.choice(w).min)
                .sum();
            let node = *flow.nodes().get(&mip_flow_static::node_slot(s)).unwrap();
            flow.set_supply(node, -(chooser_count as i64 - i64::from(covered)));
        }

        for p in self.input.chooser_ids() {
            for w in self.input.choice_ids() {
                let pref = self.input.preference(p, w);
                if pref > preference_limit {
                    continue;
                }
                let s = scheduling.slot_of(w);
                let from = *flow.nodes().get(&mip_flow_static::node_chooser(p, s)).unwrap();
                let to = *flow.nodes().get(&mip_flow_static::node_choice(w)).unwrap();
                let cost = (f64::from(pref) + 1.0).powf(self.options.preference_exponent) as i64;
                flow.add_edge(mip_flow_static::edge_id(from, to), from, to, 1, cost);
            }
        }
        for w in self.input.choice_ids() {
            let s = scheduling.slot_of(w);
            let data = self.input.choice(w);
            let from = *flow.nodes().get(&mip_flow_static::node_choice(w)).unwrap();
            let to = *flow.nodes().get(&mip_flow_static::node_slot(s)).unwrap();
            flow.add_edge(mip_flow_static::edge_id(from, to), from, to, data.max - data.min, 0);
        }

        self.block_constraint_edges(scheduling, &mut flow);
        self.create_implications(scheduling, &mut flow);

        if !flow.solve(self.backend) {
            self.lp_count.set(self.lp_count.get() + 1);
            return Ok(None);
        }
        self.lp_count.set(self.lp_count.get() + 1);

        let mut data = vec![vec![None; self.input.slot_count()]; chooser_count];
        for p in self.input.chooser_ids() {
            for s in self.input.slot_ids() {
                for w in self.input.choice_ids() {
                    if scheduling.slot_of(w) != s {
                        continue;
                    }
                    let from = *flow.nodes().get(&mip_flow_static::node_chooser(p, s)).unwrap();
                    let to = *flow.nodes().get(&mip_flow_static::node_choice(w)).unwrap();
                    if flow.solution_value_at(&mip_flow_static::edge_id(from, to)) == 1 {
                        data[p.index()][s.index()] = Some(w);
                    }
                }
            }
        }

        let resolved: Result<Vec<Vec<ChoiceId>>> = data
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|cell| {
                        cell.ok_or_else(|| {
                            SolverError::Internal(
                                "flow solution left a chooser unassigned at a slot".to_string(),
                            )
                        })
                    })
                    .collect()
            })
            .collect();
        Ok(Some(Assignment::new(resolved?)))
    }

    fn block_constraint_edges(&self, scheduling: &Scheduling, flow: &mut MipFlow<NodeKey, EdgeKey>) {
        for constraint in self.input.constraints() {
            match *constraint {
                Constraint::ChooserIsInChoice(p, c) => {
                    let s = scheduling.slot_of(c);
                    for w in self.input.choice_ids() {
                        if w == c || scheduling.slot_of(w) != s {
                            continue;
                        }
                        let from = flow.nodes()[&mip_flow_static::node_chooser(p, s)];
                        let to = flow.nodes()[&mip_flow_static::node_choice(w)];
                        flow.block_edge(&mip_flow_static::edge_id(from, to));
                    }
                }
                Constraint::ChooserIsNotInChoice(p, c) => {
                    for s in self.input.slot_ids() {
                        let from = flow.nodes()[&mip_flow_static::node_chooser(p, s)];
                        let to = flow.nodes()[&mip_flow_static::node_choice(c)];
                        flow.block_edge(&mip_flow_static::edge_id(from, to));
                    }
                }
                _ => {}
            }
        }
    }

    fn create_implications(&self, scheduling: &Scheduling, flow: &mut MipFlow<NodeKey, EdgeKey>) {
        for constraint in self.input.constraints() {
            if let Constraint::ChoosersHaveSameChoices(p, q, rel) = *constraint {
                for s in self.input.slot_ids() {
                    for w in self.input.choice_ids() {
                        let from_p = flow.nodes()[&mip_flow_static::node_chooser(p, s)];
                        let from_q = flow.nodes()[&mip_flow_static::node_chooser(q, s)];
                        let to = flow.nodes()[&mip_flow_static::node_choice(w)];
                        let edge_p = mip_flow_static::edge_id(from_p, to);
                        let edge_q = mip_flow_static::edge_id(from_q, to);
                        match rel {
                            SetRelation::Subset => flow.add_implication(&edge_p, &edge_q),
                            SetRelation::Superset => flow.add_implication(&edge_q, &edge_p),
                            SetRelation::Equal => {
                                flow.add_implication(&edge_p, &edge_q);
                                flow.add_implication(&edge_q, &edge_p);
                            }
                        }
                    }
                }
            }
        }

        for group in self.input.dependent_groups() {
            if group.len() < 2 {
                continue;
            }
            for p in self.input.chooser_ids() {
                let edges: Vec<EdgeKey> = group
                    .iter()
                    .map(|&w| {
                        let s = scheduling.slot_of(w);
                        let from = flow.nodes()[&mip_flow_static::node_chooser(p, s)];
                        let to = flow.nodes()[&mip_flow_static::node_choice(w)];
                        mip_flow_static::edge_id(from, to)
                    })
                    .collect();
                flow.make_edges_equal(edges);
            }
        }
    }
}
