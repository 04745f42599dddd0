/// Union-find over dense indices where membership is explicit: an element
/// that was never assigned to a group is distinct from a singleton of
/// itself, and `find` reports it as absent.
#[derive(Debug, Clone)]
pub struct DisjointSet {
    parent: Vec<Option<usize>>,
    rank: Vec<u32>,
}

impl DisjointSet {
    /// Creates a set over `len` elements, all unassigned.
    pub fn new(len: usize) -> Self {
        DisjointSet {
            parent: vec![None; len],
            rank: vec![0; len],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Makes `e` the root of its own group.
    pub fn singleton(&mut self, e: usize) {
        self.parent[e] = Some(e);
        self.rank[e] = 0;
    }

    /// Returns the representative of `e`'s group, or `None` if `e` is
    /// unassigned or out of range. Compresses the path on success.
    pub fn find(&mut self, e: usize) -> Option<usize> {
        if e >= self.parent.len() {
            return None;
        }
        let mut root = self.parent[e]?;
        while let Some(next) = self.parent[root] {
            if next == root {
                break;
            }
            root = next;
        }
        let mut cur = e;
        while cur != root {
            let next = match self.parent[cur] {
                Some(p) => p,
                None => break,
            };
            self.parent[cur] = Some(root);
            cur = next;
        }
        Some(root)
    }

    /// Joins the groups of `e1` and `e2`, assigning either operand as a
    /// singleton first if it has no group yet. Union by rank; on equal
    /// rank the first operand's root wins and its rank grows.
    pub fn union(&mut self, e1: usize, e2: usize) {
        if self.find(e1).is_none() {
            self.singleton(e1);
        }
        if self.find(e2).is_none() {
            self.singleton(e2);
        }
        let r1 = match self.find(e1) {
            Some(r) => r,
            None => return,
        };
        let r2 = match self.find(e2) {
            Some(r) => r,
            None => return,
        };
        if r1 == r2 {
            return;
        }
        if self.rank[r1] < self.rank[r2] {
            self.parent[r1] = Some(r2);
        } else if self.rank[r1] > self.rank[r2] {
            self.parent[r2] = Some(r1);
        } else {
            self.parent[r2] = Some(r1);
            self.rank[r1] += 1;
        }
    }
}
