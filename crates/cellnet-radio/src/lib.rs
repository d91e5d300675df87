//! # cellnet-radio
//!
//! Channel and cell identity planning for 2G and 4G sites.
//!
//! ## Neighbor graphs
//!
//! [`NeighborGraph::build`] triangulates element positions (planar Delaunay)
//! and derives first-order neighbors (shared triangulation edge) and
//! second-order neighbors (neighbors of neighbors).
//!
//! ## Assignment
//!
//! [`AssignmentEngine`] tries a number of seeded random visiting orders,
//! fills each from a [`ValueDomain`] pool while avoiding values held by
//! first-order neighbors, scores them and keeps the highest scoring one.
//! [`RadioPlanner`] wraps the engine with repository reads and writes for a
//! site selection.
//!
//! ```
//! use cellnet_geo::Coord;
//! use cellnet_model::SiteKey;
//! use cellnet_radio::{AssignmentEngine, NeighborGraph, NetworkElement, ValueDomain};
//!
//! let elements: Vec<NetworkElement> = (0..4)
//!     .map(|i| {
//!         let key = SiteKey::new("acme", format!("s{}", i));
//!         NetworkElement::candidate(key, Coord::new(i as f64 * 0.01, (i % 2) as f64 * 0.01))
//!     })
//!     .collect();
//! let positions: Vec<Coord> = elements.iter().map(|e| e.position).collect();
//! let graph = NeighborGraph::build(&positions);
//!
//! let outcome = AssignmentEngine::new(42)
//!     .assign(&elements, &graph, &ValueDomain::TwoGCellId.pool())
//!     .unwrap();
//! assert_eq!(outcome.assignments.len(), 4);
//! ```

mod assign;
mod delaunay;
mod domain;
mod error;
mod graph;
mod plan;

pub use assign::{
    select_best, Assignment, AssignmentEngine, AssignmentOutcome, Membership, NetworkElement,
    Sequence, DEFAULT_SEQUENCE_COUNT, SENTINEL_COST,
};
pub use delaunay::{delaunay_edges, triangulate};
pub use domain::{
    Carrier, ValueDomain, ARFCN_COUNT, BSIC_COUNT, LTE_CHANNEL, LTE_DL_FREQUENCY_MHZ,
    LTE_UL_FREQUENCY_MHZ, MAX_PCI,
};
pub use error::RadioError;
pub use graph::NeighborGraph;
pub use plan::{CommittedValue, DomainReport, RadioPlanner};

/// Result type for radio planning operations.
pub type Result<T> = std::result::Result<T, RadioError>;
