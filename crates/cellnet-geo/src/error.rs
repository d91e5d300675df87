//! Error types for the geodesy crate.

use thiserror::Error;

/// Errors that can occur when computing geodesy or sampling terrain.
#[derive(Debug, Error)]
pub enum GeoError {
    /// Coordinate is outside the bounds of a terrain raster.
    #[error("Coordinate ({lat}, {lon}) is outside terrain bounds ({min_lat}-{max_lat}, {min_lon}-{max_lon})")]
    OutOfBounds {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lon: f64,
        /// Raster minimum latitude.
        min_lat: f64,
        /// Raster maximum latitude.
        max_lat: f64,
        /// Raster minimum longitude.
        min_lon: f64,
        /// Raster maximum longitude.
        max_lon: f64,
    },

    /// No elevation value at the coordinate.
    #[error("No elevation data at coordinate ({lat}, {lon})")]
    NoData {
        /// Requested latitude.
        lat: f64,
        /// Requested longitude.
        lon: f64,
    },

    /// A profile needs at least two samples (both endpoints).
    #[error("Invalid sample count {0} (need at least 2)")]
    InvalidSampleCount(usize),

    /// A terrain raster whose shape does not match its data.
    #[error("Invalid terrain grid: {0}")]
    InvalidGrid(String),
}
