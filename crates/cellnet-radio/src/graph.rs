//! First- and second-order neighbor relations over an element arena.

use crate::delaunay::delaunay_edges;
use crate::{RadioError, Result};
use cellnet_geo::Coord;

/// Adjacency over elements addressed by index.
///
/// First-order neighbors share a Delaunay edge. Second-order neighbors are the
/// neighbors of first-order neighbors, the element itself excluded. Both
/// lists are sorted and free of duplicates, and first-order adjacency is
/// symmetric.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NeighborGraph {
    first: Vec<Vec<usize>>,
    second: Vec<Vec<usize>>,
}

impl NeighborGraph {
    /// Triangulate `positions` and derive both neighbor orders.
    pub fn build(positions: &[Coord]) -> Self {
        Self::from_valid_edges(positions.len(), delaunay_edges(positions))
    }

    /// Graph over `n` elements from explicit undirected edges.
    ///
    /// Self loops are ignored. An edge naming an index `>= n` is an error.
    pub fn from_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Result<Self> {
        let edges: Vec<(usize, usize)> = edges.into_iter().collect();
        if let Some((a, b)) = edges.iter().find(|(a, b)| *a >= n || *b >= n) {
            return Err(RadioError::InvalidInput(format!(
                "edge ({}, {}) outside graph of {} elements",
                a, b, n
            )));
        }
        Ok(Self::from_valid_edges(n, edges))
    }

    fn from_valid_edges(n: usize, edges: impl IntoIterator<Item = (usize, usize)>) -> Self {
        let mut first = vec![Vec::new(); n];
        for (a, b) in edges {
            if a != b {
                first[a].push(b);
                first[b].push(a);
            }
        }
        for list in &mut first {
            list.sort_unstable();
            list.dedup();
        }

        let second = (0..n)
            .map(|i| {
                let mut reach: Vec<usize> = first[i]
                    .iter()
                    .flat_map(|&j| first[j].iter().copied())
                    .filter(|&k| k != i)
                    .collect();
                reach.sort_unstable();
                reach.dedup();
                reach
            })
            .collect();

        Self { first, second }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.first.len()
    }

    /// True when the graph has no elements.
    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }

    /// First-order neighbors of `element`.
    pub fn first_order(&self, element: usize) -> &[usize] {
        self.first.get(element).map_or(&[][..], Vec::as_slice)
    }

    /// Second-order neighbors of `element`.
    pub fn second_order(&self, element: usize) -> &[usize] {
        self.second.get(element).map_or(&[][..], Vec::as_slice)
    }

    /// Check whether `a` and `b` are first-order neighbors.
    pub fn are_neighbors(&self, a: usize, b: usize) -> bool {
        self.first_order(a).binary_search(&b).is_ok()
    }

    /// Undirected first-order edges `(a, b)` with `a < b`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.first.iter().enumerate().flat_map(|(a, list)| {
            list.iter().copied().filter(move |&b| a < b).map(move |b| (a, b))
        })
    }

    /// Number of undirected first-order edges.
    pub fn edge_count(&self) -> usize {
        self.first.iter().map(Vec::len).sum::<usize>() / 2
    }
}
