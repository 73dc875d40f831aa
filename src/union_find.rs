//! Disjoint-set groups over a dense integer domain, used for dependent-choice groups.
//!
//! Grounded on `examples/original_source/src/UnionFind.h`'s interface; the pack retrieved only the
//! header, not the `.ipp` implementation, so path compression and union-by-size are implemented in
//! the conventional textbook way rather than copied.

#[derive(Clone, Debug)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            parent: (0..count).collect(),
            size: vec![1; count],
        }
    }

    pub fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    pub fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }

    pub fn same_group(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Groups of size > 1, each sorted ascending, sorted by their smallest member for determinism.
    #[must_use]
    pub fn groups(mut self) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut by_root: std::collections::BTreeMap<usize, Vec<usize>> =
            std::collections::BTreeMap::new();
        for i in 0..n {
            let root = self.find(i);
            by_root.entry(root).or_default().push(i);
        }
        let mut groups: Vec<Vec<usize>> = by_root
            .into_values()
            .filter(|g| g.len() > 1)
            .collect();
        groups.sort_by_key(|g| g[0]);
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::UnionFind;

    #[test]
    fn merges_transitively() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(1, 2);
        assert!(uf.same_group(0, 2));
        assert!(!uf.same_group(0, 3));
        let groups = uf.groups();
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn singletons_are_excluded_from_groups() {
        let mut uf = UnionFind::new(3);
        uf.union(0, 1);
        let groups = uf.groups();
        assert_eq!(groups, vec![vec![0, 1]]);
    }
}
