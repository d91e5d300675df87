//! Terrain elevation sources.

use crate::{Coord, GeoError, Result};
use serde::{Deserialize, Serialize};

/// A source of terrain (plus clutter) elevation.
pub trait TerrainSource {
    /// Elevation in meters at a coordinate.
    fn elevation_m(&self, at: Coord) -> Result<f64>;
}

impl<T: TerrainSource + ?Sized> TerrainSource for &T {
    fn elevation_m(&self, at: Coord) -> Result<f64> {
        (**self).elevation_m(at)
    }
}

impl<T: TerrainSource + ?Sized> TerrainSource for Box<T> {
    fn elevation_m(&self, at: Coord) -> Result<f64> {
        (**self).elevation_m(at)
    }
}

/// Constant elevation everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain {
    /// Elevation in meters.
    pub elevation_m: f64,
}

impl FlatTerrain {
    /// Create a flat terrain at the given elevation.
    pub const fn new(elevation_m: f64) -> Self {
        Self { elevation_m }
    }
}

impl TerrainSource for FlatTerrain {
    fn elevation_m(&self, _at: Coord) -> Result<f64> {
        Ok(self.elevation_m)
    }
}

/// Serialized shape of a [`GridTerrain`], validated on load.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GridTerrainSpec {
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
    width: usize,
    height: usize,
    elevations: Vec<f64>,
}

/// A regular lon/lat elevation raster.
///
/// Cells are stored row-major with row 0 at `max_lat` (north), matching the
/// layout of GeoTIFF elevation tiles. Lookups interpolate bilinearly between
/// the four nearest cells. `NaN` cells are treated as missing data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "GridTerrainSpec", into = "GridTerrainSpec")]
pub struct GridTerrain {
    min_lon: f64,
    max_lon: f64,
    min_lat: f64,
    max_lat: f64,
    width: usize,
    height: usize,
    elevations: Vec<f64>,
}

impl TryFrom<GridTerrainSpec> for GridTerrain {
    type Error = GeoError;

    fn try_from(spec: GridTerrainSpec) -> Result<Self> {
        GridTerrain::new(
            (spec.min_lon, spec.min_lat),
            (spec.max_lon, spec.max_lat),
            spec.width,
            spec.height,
            spec.elevations,
        )
    }
}

impl From<GridTerrain> for GridTerrainSpec {
    fn from(grid: GridTerrain) -> Self {
        GridTerrainSpec {
            min_lon: grid.min_lon,
            max_lon: grid.max_lon,
            min_lat: grid.min_lat,
            max_lat: grid.max_lat,
            width: grid.width,
            height: grid.height,
            elevations: grid.elevations,
        }
    }
}

impl GridTerrain {
    /// Create a raster covering `(min_lon, min_lat)`..`(max_lon, max_lat)`.
    pub fn new(
        (min_lon, min_lat): (f64, f64),
        (max_lon, max_lat): (f64, f64),
        width: usize,
        height: usize,
        elevations: Vec<f64>,
    ) -> Result<Self> {
        if width < 2 || height < 2 {
            return Err(GeoError::InvalidGrid(format!(
                "grid must be at least 2x2, got {}x{}",
                width, height
            )));
        }
        if elevations.len() != width * height {
            return Err(GeoError::InvalidGrid(format!(
                "expected {} elevations for a {}x{} grid, got {}",
                width * height,
                width,
                height,
                elevations.len()
            )));
        }
        if !(max_lon > min_lon && max_lat > min_lat) {
            return Err(GeoError::InvalidGrid(
                "bounds must have max greater than min".to_string(),
            ));
        }

        Ok(Self {
            min_lon,
            max_lon,
            min_lat,
            max_lat,
            width,
            height,
            elevations,
        })
    }

    /// Check if a coordinate is within the raster bounds.
    pub fn contains(&self, at: Coord) -> bool {
        at.lat >= self.min_lat
            && at.lat <= self.max_lat
            && at.lon >= self.min_lon
            && at.lon <= self.max_lon
    }

    /// Raster dimensions (width, height).
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn cell(&self, x: usize, y: usize, at: Coord) -> Result<f64> {
        let v = self.elevations[y * self.width + x];
        if v.is_nan() {
            return Err(GeoError::NoData {
                lat: at.lat,
                lon: at.lon,
            });
        }
        Ok(v)
    }
}

impl TerrainSource for GridTerrain {
    fn elevation_m(&self, at: Coord) -> Result<f64> {
        if !self.contains(at) {
            return Err(GeoError::OutOfBounds {
                lat: at.lat,
                lon: at.lon,
                min_lat: self.min_lat,
                max_lat: self.max_lat,
                min_lon: self.min_lon,
                max_lon: self.max_lon,
            });
        }

        // Row 0 is at max_lat (north) and increases southward.
        let x = (at.lon - self.min_lon) / (self.max_lon - self.min_lon) * (self.width - 1) as f64;
        let y = (self.max_lat - at.lat) / (self.max_lat - self.min_lat) * (self.height - 1) as f64;

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let v00 = self.cell(x0, y0, at)?;
        let v10 = self.cell(x1, y0, at)?;
        let v01 = self.cell(x0, y1, at)?;
        let v11 = self.cell(x1, y1, at)?;

        Ok(v00 * (1.0 - fx) * (1.0 - fy)
            + v10 * fx * (1.0 - fy)
            + v01 * (1.0 - fx) * fy
            + v11 * fx * fy)
    }
}
