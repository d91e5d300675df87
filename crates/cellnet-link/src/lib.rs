//! # cellnet-link
//!
//! Backhaul topology synthesis and Fresnel clearance adjustment.
//!
//! ## Topology synthesis
//!
//! [`TopologySynthesizer`] connects a selection of sites with a minimum
//! spanning private backbone (Kruskal over geodesic distance), then adds at
//! most one boundary private link to the owner's wider network and at most
//! one public link to the nearest site of another owner.
//!
//! ## Clearance adjustment
//!
//! [`adjust_links`] raises the device heights at both ends of each link in
//! fixed steps until the configured share of the first Fresnel zone clears
//! the terrain profile. Site heights follow the devices upward where needed
//! and the raised sites are reported back.
//!
//! The pure pieces of both algorithms ([`kruskal`], [`evaluate_clearance`],
//! [`adjust_heights`]) are exported for direct use.

mod clearance;
mod error;
mod mst;
mod synthesize;

pub use clearance::{
    adjust_heights, adjust_links, evaluate_clearance, first_obstruction, fresnel_radius_m,
    AdjustmentReport, ClearanceOutcome, ClearanceParams, ClearanceProblem, EndHeights,
    HeightStep, LinkAdjustment, ModifiedSites,
};
pub use error::LinkError;
pub use mst::{complete_graph, kruskal, total_weight, UnionFind, WeightedEdge};
pub use synthesize::{SynthesisResult, TopologySynthesizer};

/// Result type for link planning operations.
pub type Result<T> = std::result::Result<T, LinkError>;
