//! Minimum spanning tree over a complete weighted graph.

use serde::{Deserialize, Serialize};

/// An undirected edge between two vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedEdge {
    /// Source vertex.
    pub src: usize,
    /// Destination vertex.
    pub dst: usize,
    /// Edge weight.
    pub weight: u64,
}

/// Disjoint-set forest with path halving and union by rank.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of the set containing `x`.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets containing `a` and `b`. Returns false if they were
    /// already the same set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] = self.rank[ra].saturating_add(1);
            }
        }
        true
    }
}

/// All `n * (n - 1) / 2` edges between `n` vertices, in `(i, j)` order with
/// `i < j`, weighted by `weight(i, j)`.
pub fn complete_graph(n: usize, mut weight: impl FnMut(usize, usize) -> u64) -> Vec<WeightedEdge> {
    let mut edges = Vec::with_capacity(n.saturating_sub(1) * n / 2);
    for src in 0..n {
        for dst in (src + 1)..n {
            edges.push(WeightedEdge {
                src,
                dst,
                weight: weight(src, dst),
            });
        }
    }
    edges
}

/// Kruskal's algorithm.
///
/// Edges are stably sorted by weight, so equal weights keep their input
/// order and the result is deterministic. Returns the accepted edges in
/// acceptance order; a connected graph of `vertex_count` vertices yields
/// `vertex_count - 1` edges.
pub fn kruskal(vertex_count: usize, edges: &[WeightedEdge]) -> Vec<WeightedEdge> {
    let mut sorted = edges.to_vec();
    sorted.sort_by_key(|e| e.weight);

    let mut sets = UnionFind::new(vertex_count);
    let mut tree = Vec::with_capacity(vertex_count.saturating_sub(1));
    for edge in sorted {
        if tree.len() + 1 >= vertex_count.max(1) {
            break;
        }
        if sets.union(edge.src, edge.dst) {
            tree.push(edge);
        }
    }
    tree
}

/// Sum of edge weights.
pub fn total_weight(edges: &[WeightedEdge]) -> u64 {
    edges.iter().map(|e| e.weight).sum()
}
