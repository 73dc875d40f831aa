//! A (modified) min-cost-flow problem expressed as a MIP, solver-agnostic behind
//! [`FlowSolverBackend`].
//!
//! Grounded on `examples/original_source/src/MipFlow.h`/`.ipp`. Node and edge keys are caller-chosen
//! (here, `u64`s built by `mip_flow_static.rs`), kept in `BTreeMap`s for deterministic iteration per
//! the REDESIGN FLAG on map ordering. Edges forced equal via [`MipFlow::make_edges_equal`] collapse
//! onto one shared MIP variable, computed through [`crate::implication_graph::ImplicationGraph`]'s
//! strongly-connected-components analysis at solve time, rather than one variable per edge.

use std::collections::{BTreeMap, BTreeSet};

use crate::implication_graph::ImplicationGraph;

/// One edge's flow contribution in the solved model: which representative variable it reads its
/// value from, and the arc's own endpoints/capacity/cost (needed to build flow-conservation rows).
pub struct FlowArc {
    pub from: usize,
    pub to: usize,
    pub cap: u32,
    pub cost: i64,
    pub representative: usize,
}

/// The solver-agnostic description `FlowSolverBackend` implementations consume.
pub struct FlowModel {
    pub node_count: usize,
    pub representative_count: usize,
    pub supply: Vec<i64>,
    pub arcs: Vec<FlowArc>,
    /// `(from_rep, to_rep)`: `value[from_rep] <= value[to_rep]`.
    pub implications: Vec<(usize, usize)>,
    pub representative_cap: Vec<u32>,
    /// Representatives that must be declared integer; the rest are continuous in `[0, cap]`. A
    /// minimal cover computed by [`crate::implication_graph::ImplicationGraph::integer_cover`].
    pub integer_cover: BTreeSet<usize>,
}

/// Abstracts the MIP solver so `MipFlow`'s graph-building logic never depends on a particular
/// backend crate. Returns one value per representative variable, or `None` if infeasible.
pub trait FlowSolverBackend: Sync {
    fn solve(&self, model: &FlowModel) -> Option<Vec<u32>>;
}

#[derive(Clone)]
pub struct MipFlow<NodeKey, EdgeKey> {
    node_map: BTreeMap<NodeKey, usize>,
    edge_map: BTreeMap<EdgeKey, usize>,
    supply: Vec<i64>,
    edge_from: Vec<usize>,
    edge_to: Vec<usize>,
    edge_max: Vec<u32>,
    edge_cost: Vec<i64>,
    blocked: BTreeSet<usize>,
    implications: Vec<(usize, usize)>,
    solution: Vec<u32>,
}

impl<NodeKey: Ord + Clone, EdgeKey: Ord + Clone> Default for MipFlow<NodeKey, EdgeKey> {
    fn default() -> Self {
        Self {
            node_map: BTreeMap::new(),
            edge_map: BTreeMap::new(),
            supply: Vec::new(),
            edge_from: Vec::new(),
            edge_to: Vec::new(),
            edge_max: Vec::new(),
            edge_cost: Vec::new(),
            blocked: BTreeSet::new(),
            implications: Vec::new(),
            solution: Vec::new(),
        }
    }
}

impl<NodeKey: Ord + Clone, EdgeKey: Ord + Clone> MipFlow<NodeKey, EdgeKey> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, key: NodeKey) -> usize {
        if let Some(&idx) = self.node_map.get(&key) {
            return idx;
        }
        let idx = self.supply.len();
        self.supply.push(0);
        self.node_map.insert(key, idx);
        idx
    }

    pub fn set_supply(&mut self, node: usize, supply: i64) {
        self.supply[node] = supply;
    }

    pub fn add_edge(&mut self, key: EdgeKey, from: usize, to: usize, max: u32, unit_cost: i64) -> usize {
        let idx = self.edge_from.len();
        self.edge_from.push(from);
        self.edge_to.push(to);
        self.edge_max.push(max);
        self.edge_cost.push(unit_cost);
        self.edge_map.insert(key, idx);
        idx
    }

    pub fn block_edge(&mut self, key: &EdgeKey) {
        if let Some(&idx) = self.edge_map.get(key) {
            self.blocked.insert(idx);
        }
    }

    pub fn add_implication(&mut self, from_key: &EdgeKey, to_key: &EdgeKey) {
        if let (Some(&from), Some(&to)) = (self.edge_map.get(from_key), self.edge_map.get(to_key)) {
            self.implications.push((from, to));
        }
    }

    pub fn make_edges_equal<I: IntoIterator<Item = EdgeKey>>(&mut self, keys: I) {
        let indices: Vec<usize> = keys.into_iter().filter_map(|k| self.edge_map.get(&k).copied()).collect();
        for window in indices.windows(2) {
            self.implications.push((window[0], window[1]));
            self.implications.push((window[1], window[0]));
        }
    }

    #[must_use]
    pub fn nodes(&self) -> &BTreeMap<NodeKey, usize> {
        &self.node_map
    }

    #[must_use]
    pub fn edges(&self) -> &BTreeMap<EdgeKey, usize> {
        &self.edge_map
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.supply.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edge_from.len()
    }

    fn build_model(&self) -> (FlowModel, Vec<usize>) {
        let mut graph = ImplicationGraph::new(self.edge_count());
        for &(a, b) in &self.implications {
            graph.add_implication(a, b);
        }
        let representative_of = graph.dominating_set();
        let representative_count = representative_of.iter().copied().collect::<BTreeSet<_>>().len();

        // Renumber representatives to a dense 0..representative_count range.
        let mut renumber: BTreeMap<usize, usize> = BTreeMap::new();
        let mut edge_to_rep = vec![0usize; self.edge_count()];
        for (edge, &rep) in representative_of.iter().enumerate() {
            let next = renumber.len();
            let dense = *renumber.entry(rep).or_insert(next);
            edge_to_rep[edge] = dense;
        }

        let mut representative_cap = vec![u32::MAX; representative_count];
        let mut arcs = Vec::with_capacity(self.edge_count());
        for edge in 0..self.edge_count() {
            let rep = edge_to_rep[edge];
            let cap = if self.blocked.contains(&edge) { 0 } else { self.edge_max[edge] };
            representative_cap[rep] = representative_cap[rep].min(cap);
            arcs.push(FlowArc {
                from: self.edge_from[edge],
                to: self.edge_to[edge],
                cap: self.edge_max[edge],
                cost: self.edge_cost[edge],
                representative: rep,
            });
        }

        let mut implications: BTreeSet<(usize, usize)> = BTreeSet::new();
        for &(a, b) in &self.implications {
            let (ra, rb) = (edge_to_rep[a], edge_to_rep[b]);
            if ra != rb {
                implications.insert((ra, rb));
            }
        }

        // A second, representative-level implication graph drives the integer-variable cover
        // (distinct from the edge-collapsing SCC pass above): the minimal subset of representatives
        // that must be declared integer so the implication/capacity constraints force the rest
        // integer too.
        let mut rep_graph = ImplicationGraph::new(representative_count);
        for &(a, b) in &implications {
            rep_graph.add_implication(a, b);
        }
        let integer_cover = rep_graph.integer_cover();

        let model = FlowModel {
            node_count: self.node_count(),
            representative_count,
            supply: self.supply.clone(),
            arcs,
            implications: implications.into_iter().collect(),
            representative_cap,
            integer_cover,
        };
        (model, edge_to_rep)
    }

    /// Builds the LP/MIP model, hands it to `backend`, and stores the per-edge solution. Returns
    /// `false` if the backend reports infeasibility.
    pub fn solve(&mut self, backend: &dyn FlowSolverBackend) -> bool {
        let (model, edge_to_rep) = self.build_model();
        let Some(representative_values) = backend.solve(&model) else {
            return false;
        };
        self.solution = edge_to_rep.iter().map(|&rep| representative_values[rep]).collect();
        true
    }

    #[must_use]
    pub fn solution_value_at(&self, key: &EdgeKey) -> u32 {
        self.edge_map.get(key).map_or(0, |&idx| self.solution[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubBackend;
    impl FlowSolverBackend for StubBackend {
        fn solve(&self, model: &FlowModel) -> Option<Vec<u32>> {
            // Trivial feasibility for the single-path test graph below: push cap on every arc.
            let mut values = vec![0u32; model.representative_count];
            for arc in &model.arcs {
                values[arc.representative] = arc.cap.min(model.representative_cap[arc.representative]);
            }
            Some(values)
        }
    }

    #[test]
    fn single_path_solves() {
        let mut flow: MipFlow<u64, u64> = MipFlow::new();
        let a = flow.add_node(0);
        let b = flow.add_node(1);
        flow.set_supply(a, 1);
        flow.set_supply(b, -1);
        flow.add_edge(100, a, b, 1, 0);
        assert!(flow.solve(&StubBackend));
        assert_eq!(flow.solution_value_at(&100), 1);
    }

    #[test]
    fn equal_edges_share_a_representative() {
        let mut flow: MipFlow<u64, u64> = MipFlow::new();
        let a = flow.add_node(0);
        let b = flow.add_node(1);
        let c = flow.add_node(2);
        flow.add_edge(1, a, b, 1, 0);
        flow.add_edge(2, a, c, 1, 0);
        flow.make_edges_equal(vec![1, 2]);
        let (model, edge_to_rep) = flow.build_model();
        assert_eq!(model.representative_count, 1);
        assert_eq!(edge_to_rep[0], edge_to_rep[1]);
    }

    #[test]
    fn blocked_edge_has_zero_representative_cap() {
        let mut flow: MipFlow<u64, u64> = MipFlow::new();
        let a = flow.add_node(0);
        let b = flow.add_node(1);
        flow.add_edge(1, a, b, 5, 0);
        flow.block_edge(&1);
        let (model, _) = flow.build_model();
        assert_eq!(model.representative_cap[0], 0);
    }
}
