//! Sequence search over value assignments.
//!
//! Every run builds `sequence_count` random visiting orders of the element
//! arena. Each order is filled by walking it and drawing values from the pool
//! with a single cursor shared by all sequences, skipping values already held
//! by a first-order neighbor. Sequences are then scored and the one with the
//! highest total cost is kept.

use crate::{NeighborGraph, RadioError, Result};
use cellnet_geo::{haversine_distance_m, Coord};
use cellnet_model::{CostModel, SiteKey};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Cost of an element with nothing to compare against.
pub const SENTINEL_COST: f64 = 100_000_000.0;

/// Sequences tried per run unless configured otherwise.
pub const DEFAULT_SEQUENCE_COUNT: usize = 50;

// ============================================================================
// Elements
// ============================================================================

/// Whether an element is planned or only constrains the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Membership {
    /// Needs a value.
    Candidate,
    /// Holds a fixed value.
    Context,
}

/// A site as seen by one value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkElement {
    /// Site identity.
    pub key: SiteKey,
    /// Site position.
    pub position: Coord,
    /// Current value. Ignored for candidates.
    pub value: Option<String>,
    /// Candidate or context.
    pub membership: Membership,
}

impl NetworkElement {
    /// An element to be assigned.
    pub fn candidate(key: SiteKey, position: Coord) -> Self {
        Self {
            key,
            position,
            value: None,
            membership: Membership::Candidate,
        }
    }

    /// An element whose value is fixed.
    pub fn context(key: SiteKey, position: Coord, value: impl Into<String>) -> Self {
        Self {
            key,
            position,
            value: Some(value.into()),
            membership: Membership::Context,
        }
    }

    /// True for elements that receive a value.
    pub fn is_candidate(&self) -> bool {
        self.membership == Membership::Candidate
    }
}

/// One candidate solution: a visiting order and the values it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence<'a> {
    /// Element indices in visiting order.
    pub order: Vec<usize>,
    /// Value per element, indexed like the element arena.
    pub values: Vec<Option<&'a str>>,
}

/// A value chosen for a candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    /// Index into the element arena.
    pub element: usize,
    /// Site receiving the value.
    pub key: SiteKey,
    /// The value.
    pub value: String,
}

/// Result of one assignment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentOutcome {
    /// Seed the sequences were derived from.
    pub seed: u64,
    /// Index of the committed sequence.
    pub best_sequence: usize,
    /// Total cost of the committed sequence.
    pub best_cost: f64,
    /// Total cost of every sequence.
    pub sequence_costs: Vec<f64>,
    /// First-order neighbor pairs sharing a value in the committed sequence.
    pub conflicts: usize,
    /// Candidate values, in element order.
    pub assignments: Vec<Assignment>,
}

// ============================================================================
// Engine
// ============================================================================

/// Cyclic draw position in a value pool.
struct PoolCursor<'a> {
    pool: &'a [String],
    next: usize,
}

impl<'a> PoolCursor<'a> {
    fn draw(&mut self) -> &'a str {
        let value = self.pool[self.next].as_str();
        self.next = (self.next + 1) % self.pool.len();
        value
    }
}

/// Seeded sequence search.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentEngine {
    seed: u64,
    sequence_count: usize,
    cost_model: CostModel,
}

impl AssignmentEngine {
    /// Engine with the default sequence count and cost model.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            sequence_count: DEFAULT_SEQUENCE_COUNT,
            cost_model: CostModel::default(),
        }
    }

    /// Set the number of sequences tried.
    pub fn with_sequence_count(mut self, sequence_count: usize) -> Self {
        self.sequence_count = sequence_count;
        self
    }

    /// Set the scoring rule.
    pub fn with_cost_model(mut self, cost_model: CostModel) -> Self {
        self.cost_model = cost_model;
        self
    }

    /// Base seed.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of sequences tried.
    pub fn sequence_count(&self) -> usize {
        self.sequence_count
    }

    /// Scoring rule.
    pub fn cost_model(&self) -> CostModel {
        self.cost_model
    }

    /// Visiting order of sequence `index` over `len` elements.
    pub fn sequence_order(&self, index: usize, len: usize) -> Vec<usize> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed.wrapping_add(index as u64));
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(&mut rng);
        order
    }

    /// Build and fill every sequence.
    ///
    /// Context elements keep their value. Each candidate takes the next pool
    /// value; while a first-order neighbor already holds it, the next one is
    /// drawn, at most one full pool cycle. After that the last draw is kept.
    /// The cursor carries over from one sequence to the next.
    pub fn fill_sequences<'a>(
        &self,
        elements: &'a [NetworkElement],
        graph: &NeighborGraph,
        pool: &'a [String],
    ) -> Vec<Sequence<'a>> {
        if pool.is_empty() {
            return Vec::new();
        }
        let orders: Vec<Vec<usize>> = (0..self.sequence_count)
            .into_par_iter()
            .map(|index| self.sequence_order(index, elements.len()))
            .collect();

        let mut cursor = PoolCursor { pool, next: 0 };
        orders
            .into_iter()
            .map(|order| {
                let mut values: Vec<Option<&'a str>> = elements
                    .iter()
                    .map(|e| match e.membership {
                        Membership::Context => e.value.as_deref(),
                        Membership::Candidate => None,
                    })
                    .collect();

                for &i in &order {
                    if !elements[i].is_candidate() {
                        continue;
                    }
                    let neighbors = graph.first_order(i);
                    let mut value = cursor.draw();
                    let mut retries = 0;
                    while retries < pool.len() && neighbors.iter().any(|&j| values[j] == Some(value)) {
                        value = cursor.draw();
                        retries += 1;
                    }
                    values[i] = Some(value);
                }
                Sequence { order, values }
            })
            .collect()
    }

    /// Cost of one element under the configured model.
    ///
    /// `NeighborConflicts` counts first-order neighbors holding the same
    /// value, or [`SENTINEL_COST`] for an element without neighbors.
    /// `CoChannelSeparation` sums the distances in meters to every
    /// non-neighbor element holding the same value, or [`SENTINEL_COST`] if
    /// no other element holds it. Either base is divided by one plus the
    /// number of second-order neighbors holding the same value.
    pub fn element_cost(
        &self,
        element: usize,
        values: &[Option<&str>],
        elements: &[NetworkElement],
        graph: &NeighborGraph,
    ) -> f64 {
        let Some(value) = values.get(element).copied().flatten() else {
            return 0.0;
        };
        let shares = |j: usize| values[j] == Some(value);

        let base = match self.cost_model {
            CostModel::NeighborConflicts => {
                let first = graph.first_order(element);
                if first.is_empty() {
                    SENTINEL_COST
                } else {
                    first.iter().filter(|&&j| shares(j)).count() as f64
                }
            }
            CostModel::CoChannelSeparation => {
                let mut shared = false;
                let mut distance_m = 0.0;
                for j in (0..values.len()).filter(|&j| j != element && shares(j)) {
                    shared = true;
                    if !graph.are_neighbors(element, j) {
                        distance_m +=
                            haversine_distance_m(elements[element].position, elements[j].position);
                    }
                }
                if shared {
                    distance_m
                } else {
                    SENTINEL_COST
                }
            }
        };

        let second = graph
            .second_order(element)
            .iter()
            .filter(|&&j| shares(j))
            .count();
        base / (1 + second) as f64
    }

    /// Total cost of a sequence.
    pub fn score(
        &self,
        sequence: &Sequence<'_>,
        elements: &[NetworkElement],
        graph: &NeighborGraph,
    ) -> f64 {
        (0..elements.len())
            .map(|i| self.element_cost(i, &sequence.values, elements, graph))
            .sum()
    }

    /// Run the search and return the committed sequence's values.
    ///
    /// The sequence with the highest total cost wins; ties go to the lowest
    /// sequence index. A pool too small for the neighborhood yields a
    /// best-effort plan with conflicts, never an error.
    pub fn assign(
        &self,
        elements: &[NetworkElement],
        graph: &NeighborGraph,
        pool: &[String],
    ) -> Result<AssignmentOutcome> {
        if pool.is_empty() {
            return Err(RadioError::InvalidInput("empty value pool".to_string()));
        }
        if self.sequence_count == 0 {
            return Err(RadioError::InvalidInput(
                "sequence count must be positive".to_string(),
            ));
        }
        if graph.len() != elements.len() {
            return Err(RadioError::InvalidInput(format!(
                "neighbor graph has {} elements, expected {}",
                graph.len(),
                elements.len()
            )));
        }
        if let Some(e) = elements
            .iter()
            .find(|e| !e.is_candidate() && e.value.as_deref().map_or(true, str::is_empty))
        {
            return Err(RadioError::InvalidInput(format!(
                "context element {} has no value",
                e.key
            )));
        }

        let sequences = self.fill_sequences(elements, graph, pool);
        let sequence_costs: Vec<f64> = sequences
            .par_iter()
            .map(|s| self.score(s, elements, graph))
            .collect();
        for (index, cost) in sequence_costs.iter().enumerate() {
            trace!(sequence = index, cost, "Scored sequence");
        }

        let best_sequence = select_best(&sequence_costs).unwrap_or(0);
        let best = &sequences[best_sequence];
        let conflicts = graph
            .edges()
            .filter(|&(a, b)| best.values[a].is_some() && best.values[a] == best.values[b])
            .count();

        let assignments = elements
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_candidate())
            .filter_map(|(i, e)| {
                best.values[i].map(|v| Assignment {
                    element: i,
                    key: e.key.clone(),
                    value: v.to_string(),
                })
            })
            .collect();

        debug!(
            seed = self.seed,
            sequences = sequences.len(),
            best_sequence,
            best_cost = sequence_costs[best_sequence],
            conflicts,
            "Assignment search finished"
        );

        Ok(AssignmentOutcome {
            seed: self.seed,
            best_sequence,
            best_cost: sequence_costs[best_sequence],
            sequence_costs,
            conflicts,
            assignments,
        })
    }
}

/// Index of the highest cost, the lowest index among equals.
pub fn select_best(costs: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, cost) in costs.iter().enumerate() {
        match best {
            Some(b) if cost.total_cmp(&costs[b]).is_le() => {}
            _ => best = Some(i),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn key(id: &str) -> SiteKey {
        SiteKey::new("acme", id)
    }

    fn pool(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn line(n: usize) -> Vec<NetworkElement> {
        (0..n)
            .map(|i| NetworkElement::candidate(key(&format!("s{}", i)), Coord::new(i as f64 * 0.01, 0.0)))
            .collect()
    }

    #[test]
    fn test_select_best_prefers_maximum_then_lowest_index() {
        assert_eq!(select_best(&[2.0, 5.0, 5.0, 1.0]), Some(1));
        assert_eq!(select_best(&[0.0, 0.0]), Some(0));
        assert_eq!(select_best(&[]), None);
    }

    #[test]
    fn test_sequence_orders_are_seeded_permutations() {
        let engine = AssignmentEngine::new(7);
        let a = engine.sequence_order(3, 20);
        assert_eq!(a, engine.sequence_order(3, 20));
        assert_ne!(a, engine.sequence_order(4, 20));
        let mut sorted = a.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_cursor_persists_across_sequences() {
        let elements = line(1);
        let graph = NeighborGraph::from_edges(1, []).unwrap();
        let pool = pool(&["a", "b", "c"]);
        let sequences = AssignmentEngine::new(1)
            .with_sequence_count(4)
            .fill_sequences(&elements, &graph, &pool);
        let drawn: Vec<_> = sequences.iter().map(|s| s.values[0]).collect();
        assert_eq!(drawn, vec![Some("a"), Some("b"), Some("c"), Some("a")]);
    }

    #[test]
    fn test_neighbor_value_is_skipped() {
        let elements = vec![
            NetworkElement::context(key("ctx"), Coord::new(0.0, 0.0), "a"),
            NetworkElement::candidate(key("new"), Coord::new(0.01, 0.0)),
        ];
        let graph = NeighborGraph::from_edges(2, [(0, 1)]).unwrap();
        let pool = pool(&["a", "b"]);
        let engine = AssignmentEngine::new(3).with_sequence_count(6);

        for sequence in engine.fill_sequences(&elements, &graph, &pool) {
            assert_eq!(sequence.values, vec![Some("a"), Some("b")]);
        }
        let outcome = engine.assign(&elements, &graph, &pool).unwrap();
        assert_eq!(outcome.conflicts, 0);
        assert_eq!(outcome.assignments.len(), 1);
        assert_eq!(outcome.assignments[0].value, "b");
    }

    #[test]
    fn test_exhausted_pool_keeps_last_draw() {
        let elements = line(2);
        let graph = NeighborGraph::from_edges(2, [(0, 1)]).unwrap();
        let outcome = AssignmentEngine::new(9)
            .with_sequence_count(3)
            .assign(&elements, &graph, &pool(&["only"]))
            .unwrap();
        assert_eq!(outcome.conflicts, 1);
        assert!(outcome.assignments.iter().all(|a| a.value == "only"));
    }

    #[test]
    fn test_neighbor_conflict_costs() {
        // Path 0 - 1 - 2.
        let elements = line(3);
        let graph = NeighborGraph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        let engine = AssignmentEngine::new(0);

        let clash = Sequence {
            order: vec![0, 1, 2],
            values: vec![Some("a"), Some("a"), Some("b")],
        };
        assert_relative_eq!(engine.element_cost(0, &clash.values, &elements, &graph), 1.0);
        assert_relative_eq!(engine.element_cost(1, &clash.values, &elements, &graph), 1.0);
        assert_relative_eq!(engine.element_cost(2, &clash.values, &elements, &graph), 0.0);
        assert_relative_eq!(engine.score(&clash, &elements, &graph), 2.0);

        let spread = Sequence {
            order: vec![0, 1, 2],
            values: vec![Some("a"), Some("b"), Some("a")],
        };
        assert_relative_eq!(engine.score(&spread, &elements, &graph), 0.0);
    }

    #[test]
    fn test_isolated_element_costs_sentinel() {
        let elements = line(1);
        let graph = NeighborGraph::from_edges(1, []).unwrap();
        let engine = AssignmentEngine::new(0);
        assert_relative_eq!(
            engine.element_cost(0, &[Some("a")], &elements, &graph),
            SENTINEL_COST
        );
        assert_relative_eq!(engine.element_cost(0, &[None], &elements, &graph), 0.0);
    }

    #[test]
    fn test_co_channel_separation_costs() {
        let elements = line(3);
        let graph = NeighborGraph::from_edges(3, [(0, 1), (1, 2)]).unwrap();
        let engine = AssignmentEngine::new(0).with_cost_model(CostModel::CoChannelSeparation);
        let values = [Some("a"), Some("b"), Some("a")];
        let d = haversine_distance_m(elements[0].position, elements[2].position);

        // 0 and 2 share "a" and are second-order neighbors through 1.
        assert_relative_eq!(engine.element_cost(0, &values, &elements, &graph), d / 2.0);
        assert_relative_eq!(engine.element_cost(1, &values, &elements, &graph), SENTINEL_COST);

        // First-order neighbors sharing a value contribute nothing.
        let clash = [Some("a"), Some("a"), Some("b")];
        assert_relative_eq!(engine.element_cost(0, &clash, &elements, &graph), 0.0);
    }

    #[test]
    fn test_highest_cost_sequence_is_committed() {
        let elements = line(6);
        let graph = NeighborGraph::from_edges(6, [(0, 1), (1, 2), (2, 3), (3, 4), (4, 5), (0, 5)]).unwrap();
        let values = pool(&["a", "b"]);
        let engine = AssignmentEngine::new(11).with_sequence_count(20);
        let outcome = engine.assign(&elements, &graph, &values).unwrap();

        let max = outcome
            .sequence_costs
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(outcome.best_cost, max);
        let first_max = outcome.sequence_costs.iter().position(|&c| c == max);
        assert_eq!(Some(outcome.best_sequence), first_max);

        // The committed values are exactly the winning sequence's.
        let sequences = engine.fill_sequences(&elements, &graph, &values);
        let winner = &sequences[outcome.best_sequence];
        for a in &outcome.assignments {
            assert_eq!(winner.values[a.element], Some(a.value.as_str()));
        }
    }

    #[test]
    fn test_invalid_inputs() {
        let elements = line(2);
        let graph = NeighborGraph::from_edges(2, [(0, 1)]).unwrap();
        let engine = AssignmentEngine::new(0);

        assert!(matches!(
            engine.assign(&elements, &graph, &[]),
            Err(RadioError::InvalidInput(_))
        ));
        assert!(matches!(
            engine
                .clone()
                .with_sequence_count(0)
                .assign(&elements, &graph, &pool(&["a"])),
            Err(RadioError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.assign(&elements[..1], &graph, &pool(&["a"])),
            Err(RadioError::InvalidInput(_))
        ));

        let mut blank = elements.clone();
        blank[0].membership = Membership::Context;
        assert!(matches!(
            engine.assign(&blank, &graph, &pool(&["a"])),
            Err(RadioError::InvalidInput(_))
        ));
    }
}
