//! Search radius around a site selection.

use crate::{Coord, Geodesy};
use serde::{Deserialize, Serialize};

/// Distance added to the selection's half-diagonal, in meters.
pub const DEFAULT_SEARCH_MARGIN_M: f64 = 50_000.0;

/// Upper bound on the search radius, in meters.
pub const DEFAULT_SEARCH_CAP_M: f64 = 100_000.0;

/// A circle around the center of a site selection.
///
/// Boundary links and radio-plan context elements are only looked for inside
/// this area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchArea {
    /// Center of the selection's bounding box.
    pub center: Coord,
    /// Radius in meters.
    pub radius_m: f64,
}

impl SearchArea {
    /// Derive the search area for `points`.
    ///
    /// `radius = min(distance(center, corner) + margin_m, cap_m)` where
    /// `corner` is the bottom-left corner of the bounding box. Returns `None`
    /// when `points` is empty.
    pub fn around<G: Geodesy + ?Sized>(
        geo: &G,
        points: &[Coord],
        margin_m: f64,
        cap_m: f64,
    ) -> Option<Self> {
        let (center, corner) = geo.bounding_center_and_corner(points)?;
        let radius_m = (geo.distance_m(center, corner) + margin_m).min(cap_m);
        Some(Self { center, radius_m })
    }

    /// Check whether `point` is within the radius of the center (inclusive).
    pub fn contains<G: Geodesy + ?Sized>(&self, geo: &G, point: Coord) -> bool {
        geo.distance_m(self.center, point) <= self.radius_m
    }

    /// Check whether `point` is within the radius of `origin` (inclusive).
    pub fn within_of<G: Geodesy + ?Sized>(&self, geo: &G, origin: Coord, point: Coord) -> bool {
        geo.distance_m(origin, point) <= self.radius_m
    }
}
