//! Scenario files: a repository snapshot plus the terrain to plan over.

use crate::{Result, RunnerError};
use cellnet_geo::{Coord, FlatTerrain, GridTerrain, TerrainSource};
use cellnet_model::{InMemoryRepository, Scenario};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Terrain used for elevation profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerrainConfig {
    /// Constant elevation everywhere.
    Flat(FlatTerrain),
    /// Regular lon/lat raster.
    Grid(GridTerrain),
}

impl Default for TerrainConfig {
    fn default() -> Self {
        TerrainConfig::Flat(FlatTerrain::new(0.0))
    }
}

impl TerrainSource for TerrainConfig {
    fn elevation_m(&self, at: Coord) -> cellnet_geo::Result<f64> {
        match self {
            TerrainConfig::Flat(flat) => flat.elevation_m(at),
            TerrainConfig::Grid(grid) => grid.elevation_m(at),
        }
    }
}

/// Everything a planning run reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlanScenario {
    /// Owners, settings, sites and links.
    #[serde(flatten)]
    pub network: Scenario,
    /// Terrain model.
    #[serde(default)]
    pub terrain: TerrainConfig,
}

impl PlanScenario {
    /// Parse YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a YAML or JSON file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RunnerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if crate::OutputFormat::from_path(path) == crate::OutputFormat::Json {
            Ok(serde_json::from_str(&text)?)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Validate the network and load it into a repository, returning the
    /// terrain alongside.
    pub fn into_parts(self) -> Result<(InMemoryRepository, TerrainConfig)> {
        Ok((self.network.into_repository()?, self.terrain))
    }
}
