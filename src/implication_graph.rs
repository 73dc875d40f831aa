//! Generic directed implication graph with iterative strongly-connected-component analysis.
//!
//! Grounded on `examples/original_source/src/ImplicationGraph.h`/`.cpp`. The original used
//! recursive Tarjan; per the REDESIGN FLAG in `SPEC_FULL.md` this is reworked as an explicit-stack
//! iterative version so arbitrarily large flow networks can't blow the call stack.
//!
//! Nodes are plain `usize` indices; callers (the MIP flow builder) own the mapping from
//! domain-specific edge keys to node indices.

use std::collections::BTreeSet;

/// A directed graph of "implies" edges (`u -> v` means selecting `u` forces `v`). Computing its
/// strongly-connected components identifies sets of edges that are forced equal to each other, so
/// the flow model only needs one free integer variable per component.
pub struct ImplicationGraph {
    adjacency: Vec<Vec<usize>>,
}

impl ImplicationGraph {
    #[must_use]
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn add_implication(&mut self, from: usize, to: usize) {
        if !self.adjacency[from].contains(&to) {
            self.adjacency[from].push(to);
        }
    }

    pub fn add_equal(&mut self, a: usize, b: usize) {
        self.add_implication(a, b);
        self.add_implication(b, a);
    }

    /// Iterative Tarjan SCC. Returns a component id per node; components are numbered in reverse
    /// topological order of discovery, matching the recursive algorithm's usual output.
    #[must_use]
    pub fn strongly_connected_components(&self) -> Vec<usize> {
        let n = self.adjacency.len();
        let mut index: Vec<Option<u32>> = vec![None; n];
        let mut low_link: Vec<u32> = vec![0; n];
        let mut on_stack: Vec<bool> = vec![false; n];
        let mut component: Vec<Option<usize>> = vec![None; n];
        let mut tarjan_stack: Vec<usize> = Vec::new();
        let mut next_index: u32 = 0;
        let mut next_component: usize = 0;

        // Explicit work stack entries: (node, next child offset to examine).
        let mut work: Vec<(usize, usize)> = Vec::new();

        for root in 0..n {
            if index[root].is_some() {
                continue;
            }
            work.push((root, 0));
            while let Some(&(node, child_pos)) = work.last() {
                if child_pos == 0 {
                    index[node] = Some(next_index);
                    low_link[node] = next_index;
                    next_index += 1;
                    tarjan_stack.push(node);
                    on_stack[node] = true;
                }

                let neighbors = &self.adjacency[node];
                if child_pos < neighbors.len() {
                    let child = neighbors[child_pos];
                    work.last_mut().unwrap().1 += 1;
                    if index[child].is_none() {
                        work.push((child, 0));
                    } else if on_stack[child] {
                        low_link[node] = low_link[node].min(index[child].unwrap());
                    }
                } else {
                    work.pop();
                    if let Some(&(parent, _)) = work.last() {
                        low_link[parent] = low_link[parent].min(low_link[node]);
                    }
                    if low_link[node] == index[node].unwrap() {
                        loop {
                            let member = tarjan_stack.pop().unwrap();
                            on_stack[member] = false;
                            component[member] = Some(next_component);
                            if member == node {
                                break;
                            }
                        }
                        next_component += 1;
                    }
                }
            }
        }

        component.into_iter().map(|c| c.expect("every node assigned a component")).collect()
    }

    /// For every SCC (trivial or not) picks the smallest-index member as the representative.
    /// Returns a `node -> representative` map (identity for singleton components). Used to collapse
    /// edges forced equal (a cycle of implications) onto one shared MIP variable — not to be
    /// confused with [`Self::integer_cover`], which picks which variables must be declared integer.
    #[must_use]
    pub fn dominating_set(&self) -> Vec<usize> {
        let components = self.strongly_connected_components();
        let num_components = components.iter().copied().max().map_or(0, |m| m + 1);
        let mut representative: Vec<Option<usize>> = vec![None; num_components];
        for (node, &comp) in components.iter().enumerate() {
            representative[comp] = Some(representative[comp].map_or(node, |r: usize| r.min(node)));
        }
        components
            .iter()
            .map(|&comp| representative[comp].unwrap())
            .collect()
    }

    /// A minimal set of vertices that must be declared integer so that the implication
    /// (`x_a <= x_b`) and capacity constraints drive every other vertex integer as well.
    ///
    /// 1. Every non-trivial SCC (size > 1) contributes its smallest-index member.
    /// 2. The remaining vertices (not in any non-trivial SCC) are covered by a greedy dominating
    ///    set: starting from vertices that still have at least one outgoing neighbour in play,
    ///    repeatedly take the vertex with the most such neighbours, add it to the cover, and drop
    ///    it and its neighbours from play.
    #[must_use]
    pub fn integer_cover(&self) -> BTreeSet<usize> {
        let components = self.strongly_connected_components();
        let num_components = components.iter().copied().max().map_or(0, |m| m + 1);
        let mut members: Vec<Vec<usize>> = vec![Vec::new(); num_components];
        for (node, &comp) in components.iter().enumerate() {
            members[comp].push(node);
        }

        let mut cover = BTreeSet::new();
        let mut in_non_trivial_scc = vec![false; self.node_count()];
        for group in &members {
            if group.len() > 1 {
                cover.insert(*group.iter().min().unwrap());
                for &node in group {
                    in_non_trivial_scc[node] = true;
                }
            }
        }

        let mut open: BTreeSet<usize> =
            (0..self.node_count()).filter(|&v| !in_non_trivial_scc[v] && !self.adjacency[v].is_empty()).collect();
        // Single forward pass, in ascending node order, dropping vertices with no open neighbour
        // left — matches the source's one-shot `get_open_variables` sweep rather than iterating to
        // a fixed point.
        for v in open.clone() {
            if open.contains(&v) && !self.adjacency[v].iter().any(|n| open.contains(n)) {
                open.remove(&v);
            }
        }

        while !open.is_empty() {
            let mut best = None;
            let mut best_count = -1i64;
            for &v in &open {
                let count = self.adjacency[v].iter().filter(|n| open.contains(n)).count() as i64;
                if count > best_count {
                    best = Some(v);
                    best_count = count;
                }
            }
            let best = best.unwrap();
            open.remove(&best);
            cover.insert(best);
            for neighbor in self.adjacency[best].clone() {
                open.remove(&neighbor);
            }
        }

        cover
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acyclic_graph_has_singleton_components() {
        let mut g = ImplicationGraph::new(3);
        g.add_implication(0, 1);
        g.add_implication(1, 2);
        let dom = g.dominating_set();
        assert_eq!(dom, vec![0, 1, 2]);
    }

    #[test]
    fn cycle_collapses_to_one_representative() {
        let mut g = ImplicationGraph::new(4);
        g.add_implication(0, 1);
        g.add_implication(1, 2);
        g.add_implication(2, 0);
        g.add_implication(2, 3);
        let dom = g.dominating_set();
        assert_eq!(dom[0], dom[1]);
        assert_eq!(dom[1], dom[2]);
        assert_ne!(dom[3], dom[0]);
    }

    #[test]
    fn add_equal_is_symmetric() {
        let mut g = ImplicationGraph::new(2);
        g.add_equal(0, 1);
        let comps = g.strongly_connected_components();
        assert_eq!(comps[0], comps[1]);
    }

    #[test]
    fn integer_cover_dominates_an_acyclic_chain() {
        let mut g = ImplicationGraph::new(5);
        g.add_implication(0, 1);
        g.add_implication(1, 2);
        g.add_implication(2, 3);
        g.add_implication(3, 4);
        let cover = g.integer_cover();
        assert_eq!(cover, BTreeSet::from([0, 2]));
    }

    #[test]
    fn integer_cover_takes_one_representative_per_non_trivial_scc() {
        let mut g = ImplicationGraph::new(4);
        g.add_implication(0, 1);
        g.add_implication(1, 2);
        g.add_implication(2, 0);
        g.add_implication(2, 3);
        let cover = g.integer_cover();
        assert_eq!(cover, BTreeSet::from([0]));
    }
}
