//! Index-based disjoint set forest.

/// Disjoint set over the dense indices `0..len`.
///
/// `find` compresses paths; `union` attaches the shallower tree under the
/// deeper one.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`
    pub fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }

        // Second pass points every visited node straight at the root
        let mut node = x;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }

        root
    }

    /// Merge the sets containing `a` and `b`.
    ///
    /// Returns false when they were already in the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a == root_b {
            return false;
        }

        match self.rank[root_a].cmp(&self.rank[root_b]) {
            std::cmp::Ordering::Less => self.parent[root_a] = root_b,
            std::cmp::Ordering::Greater => self.parent[root_b] = root_a,
            std::cmp::Ordering::Equal => {
                self.parent[root_b] = root_a;
                self.rank[root_a] = self.rank[root_a].saturating_add(1);
            }
        }
        true
    }

    /// All sets as lists of member indices.
    ///
    /// Members are ascending within each set and sets are ordered by their
    /// smallest member.
    pub fn sets(&mut self) -> Vec<Vec<usize>> {
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); self.len()];
        for index in 0..self.len() {
            let root = self.find(index);
            by_root[root].push(index);
        }

        let mut sets: Vec<Vec<usize>> = by_root.into_iter().filter(|s| !s.is_empty()).collect();
        sets.sort_by_key(|s| s[0]);
        sets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_forest_is_all_singletons() {
        let mut set = DisjointSet::new(4);
        assert_eq!(set.sets(), vec![vec![0], vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn union_is_transitive() {
        let mut set = DisjointSet::new(5);
        assert!(set.union(0, 3));
        assert!(set.union(3, 4));
        assert!(!set.union(4, 0));

        assert_eq!(set.find(0), set.find(4));
        assert_ne!(set.find(0), set.find(1));
        assert_eq!(set.sets(), vec![vec![0, 3, 4], vec![1], vec![2]]);
    }

    #[test]
    fn long_chain_compresses() {
        let mut set = DisjointSet::new(1000);
        for i in 1..1000 {
            set.union(i - 1, i);
        }
        let root = set.find(999);
        assert!((0..1000).all(|i| set.find(i) == root));
        assert_eq!(set.sets().len(), 1);
    }

    #[test]
    fn empty_forest() {
        let mut set = DisjointSet::new(0);
        assert!(set.is_empty());
        assert!(set.sets().is_empty());
    }
}
