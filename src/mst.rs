//! Maximum-weight spanning tree over a symmetric feature-weight matrix,
//! reoriented into a DAG rooted at a caller-chosen node (spec §4.2).
//!
//! Grounded on `original_source/bayesnet/utils/Mst.h` (`Graph::kruskal_algorithm`,
//! union-find via `find_set`/`union_set`, `MST::reorder`).

use ndarray::Array2;
use std::collections::VecDeque;

struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        UnionFind {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        if self.rank[ra] < self.rank[rb] {
            self.parent[ra] = rb;
        } else if self.rank[ra] > self.rank[rb] {
            self.parent[rb] = ra;
        } else {
            self.parent[rb] = ra;
            self.rank[ra] += 1;
        }
        true
    }
}

/// Kruskal over the upper triangle of `weights`, descending order, stable
/// w.r.t. insertion order for ties. Returns the undirected tree edges.
fn maximum_spanning_tree_undirected(weights: &Array2<f64>) -> Vec<(usize, usize)> {
    let n = weights.nrows();
    let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(n * (n.saturating_sub(1)) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push((i, j, weights[[i, j]]));
        }
    }
    edges.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap());
    let mut uf = UnionFind::new(n);
    let mut tree = Vec::with_capacity(n.saturating_sub(1));
    for (i, j, _) in edges {
        if uf.union(i, j) {
            tree.push((i, j));
        }
    }
    tree
}

/// Reorients the undirected tree into a rooted DAG via BFS from `root`;
/// every traversed edge becomes `(parent, child)` (spec §4.2 step 4).
fn reorient(tree: &[(usize, usize)], n: usize, root: usize) -> Vec<(usize, usize)> {
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for &(a, b) in tree {
        adj[a].push(b);
        adj[b].push(a);
    }
    let mut visited = vec![false; n];
    let mut directed = Vec::with_capacity(tree.len());
    let mut queue = VecDeque::new();
    visited[root] = true;
    queue.push_back(root);
    while let Some(u) = queue.pop_front() {
        for &v in &adj[u] {
            if !visited[v] {
                visited[v] = true;
                directed.push((u, v));
                queue.push_back(v);
            }
        }
    }
    // Edges unreachable from root (disconnected input) keep their recorded
    // orientation, documented in spec §4.2 as arising only on malformed input.
    for &(a, b) in tree {
        if !directed.contains(&(a, b)) && !directed.contains(&(b, a)) {
            directed.push((a, b));
        }
    }
    directed
}

/// Builds a maximum-weight spanning tree over `weights` and reorients it
/// into a DAG rooted at `root`. Returns ordered `(parent, child)` pairs.
pub fn maximum_spanning_tree(weights: &Array2<f64>, root: usize) -> Vec<(usize, usize)> {
    let n = weights.nrows();
    let tree = maximum_spanning_tree_undirected(weights);
    reorient(&tree, n, root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn produces_n_minus_one_edges() {
        let w = array![
            [0.0, 0.9, 0.1, 0.2],
            [0.9, 0.0, 0.8, 0.1],
            [0.1, 0.8, 0.0, 0.7],
            [0.2, 0.1, 0.7, 0.0],
        ];
        let edges = maximum_spanning_tree(&w, 0);
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn root_has_no_incoming_edge() {
        let w = array![
            [0.0, 0.9, 0.1, 0.2],
            [0.9, 0.0, 0.8, 0.1],
            [0.1, 0.8, 0.0, 0.7],
            [0.2, 0.1, 0.7, 0.0],
        ];
        let edges = maximum_spanning_tree(&w, 1);
        assert!(edges.iter().all(|&(_, c)| c != 1));
    }
}
