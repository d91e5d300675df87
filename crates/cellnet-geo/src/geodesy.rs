//! Great-circle geodesy and profile sampling.

use crate::{GeoError, Result, TerrainSource};
use serde::{Deserialize, Serialize};

/// Mean earth radius in meters used by the haversine formula.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A WGS84 position, longitude first (x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Coord {
    /// Create a coordinate from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Point a fraction `t` of the way from `self` to `other` in lon/lat space.
    pub fn lerp(&self, other: Coord, t: f64) -> Coord {
        Coord {
            lon: self.lon + t * (other.lon - self.lon),
            lat: self.lat + t * (other.lat - self.lat),
        }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

/// One point of an elevation profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    /// Position of the sample along the path, starting at 0.
    pub index: usize,
    /// Cumulative distance from the start of the path in kilometers.
    pub distance_km: f64,
    /// Terrain plus clutter elevation in meters.
    pub elevation_m: f64,
}

/// The geodesy operations the planners depend on.
pub trait Geodesy {
    /// Great-circle distance in meters.
    fn distance_m(&self, a: Coord, b: Coord) -> f64;

    /// Initial bearing from `a` towards `b` in degrees, in `[0, 360)`.
    fn bearing_deg(&self, a: Coord, b: Coord) -> f64;

    /// Center and bottom-left corner of the bounding box of `points`.
    ///
    /// Returns `None` for an empty point set.
    fn bounding_center_and_corner(&self, points: &[Coord]) -> Option<(Coord, Coord)>;

    /// Sample `sample_count` terrain elevations along the line from `a` to `b`,
    /// both endpoints included.
    fn sample_elevation_profile(
        &self,
        a: Coord,
        b: Coord,
        sample_count: usize,
    ) -> Result<Vec<ProfileSample>>;
}

/// Calculate the distance between two points using the haversine formula.
///
/// Returns the distance in meters.
pub fn haversine_distance_m(a: Coord, b: Coord) -> f64 {
    let lat1_rad = a.lat.to_radians();
    let lat2_rad = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_M * c
}

/// Initial great-circle bearing from `a` to `b`, normalised to `[0, 360)`.
pub fn initial_bearing_deg(a: Coord, b: Coord) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lon = (b.lon - a.lon).to_radians();

    let y = delta_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = y.atan2(x).to_degrees();
    bearing.rem_euclid(360.0)
}

/// Spherical-earth geodesy over a terrain source.
#[derive(Debug, Clone)]
pub struct SphericalGeodesy<T> {
    terrain: T,
}

impl<T: TerrainSource> SphericalGeodesy<T> {
    /// Create a geodesy provider reading elevations from `terrain`.
    pub fn new(terrain: T) -> Self {
        Self { terrain }
    }

    /// The underlying terrain source.
    pub fn terrain(&self) -> &T {
        &self.terrain
    }
}

impl<T: TerrainSource> Geodesy for SphericalGeodesy<T> {
    fn distance_m(&self, a: Coord, b: Coord) -> f64 {
        haversine_distance_m(a, b)
    }

    fn bearing_deg(&self, a: Coord, b: Coord) -> f64 {
        initial_bearing_deg(a, b)
    }

    fn bounding_center_and_corner(&self, points: &[Coord]) -> Option<(Coord, Coord)> {
        let first = points.first()?;
        let (mut min_lon, mut max_lon) = (first.lon, first.lon);
        let (mut min_lat, mut max_lat) = (first.lat, first.lat);
        for p in &points[1..] {
            min_lon = min_lon.min(p.lon);
            max_lon = max_lon.max(p.lon);
            min_lat = min_lat.min(p.lat);
            max_lat = max_lat.max(p.lat);
        }

        let center = Coord::new((min_lon + max_lon) / 2.0, (min_lat + max_lat) / 2.0);
        let corner = Coord::new(min_lon, min_lat);
        Some((center, corner))
    }

    fn sample_elevation_profile(
        &self,
        a: Coord,
        b: Coord,
        sample_count: usize,
    ) -> Result<Vec<ProfileSample>> {
        if sample_count < 2 {
            return Err(GeoError::InvalidSampleCount(sample_count));
        }

        let total_km = haversine_distance_m(a, b) / 1000.0;
        let mut samples = Vec::with_capacity(sample_count);

        for index in 0..sample_count {
            let t = index as f64 / (sample_count - 1) as f64;
            let point = a.lerp(b, t);
            let elevation_m = self.terrain.elevation_m(point)?;
            samples.push(ProfileSample {
                index,
                distance_km: t * total_km,
                elevation_m,
            });
        }

        Ok(samples)
    }
}
