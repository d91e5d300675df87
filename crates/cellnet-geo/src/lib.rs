//! # cellnet-geo
//!
//! Geodesy primitives and terrain profile sampling used by the cellnet
//! planning crates.
//!
//! The planners never talk to a terrain dataset directly. They consume the
//! [`Geodesy`] trait, which bundles the four operations they need:
//!
//! - great-circle distance and initial bearing between two coordinates
//! - the bounding-box center and bottom-left corner of a point set
//! - an elevation profile sampled along the straight line between two points
//!
//! [`SphericalGeodesy`] is the reference implementation. It computes distances
//! with the haversine formula and reads elevations from any [`TerrainSource`]:
//!
//! - [`FlatTerrain`] - constant elevation, handy for tests
//! - [`GridTerrain`] - a regular lon/lat raster with bilinear interpolation
//!
//! ## Example
//!
//! ```
//! use cellnet_geo::{Coord, FlatTerrain, Geodesy, SphericalGeodesy};
//!
//! let geo = SphericalGeodesy::new(FlatTerrain::new(120.0));
//! let a = Coord::new(-122.33, 47.61);
//! let b = Coord::new(-122.20, 47.62);
//!
//! let profile = geo.sample_elevation_profile(a, b, 100)?;
//! assert_eq!(profile.len(), 100);
//! assert!(geo.distance_m(a, b) > 9_000.0);
//! # Ok::<(), cellnet_geo::GeoError>(())
//! ```

mod error;
mod geodesy;
mod search;
mod terrain;

pub use error::GeoError;
pub use geodesy::{
    haversine_distance_m, initial_bearing_deg, Coord, Geodesy, ProfileSample, SphericalGeodesy,
    EARTH_RADIUS_M,
};
pub use search::{SearchArea, DEFAULT_SEARCH_CAP_M, DEFAULT_SEARCH_MARGIN_M};
pub use terrain::{FlatTerrain, GridTerrain, TerrainSource};

/// Result type for geodesy operations.
pub type Result<T> = std::result::Result<T, GeoError>;
