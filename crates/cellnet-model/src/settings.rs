//! Per-owner planning settings.
//!
//! Every field has a default, so a YAML document only needs to name the values
//! it overrides:
//!
//! ```yaml
//! clearance:
//!   fresnel_clearance_pct: 80
//! radio_plan:
//!   seed: 42
//! ```

use crate::{ModelError, OwnerId};
use serde::{Deserialize, Serialize};

/// Microwave parameters copied onto every newly created link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MicrowaveSettings {
    /// Carrier frequency in GHz.
    pub frequency_ghz: f64,
    /// Channel width in MHz.
    pub channel_width_mhz: f64,
    /// Transmitter output power in dBm.
    pub output_power_dbm: f64,
    /// Antenna gain in dBi.
    pub antenna_gain_dbi: f64,
    /// Miscellaneous losses in dB.
    pub losses_db: f64,
}

impl Default for MicrowaveSettings {
    fn default() -> Self {
        Self {
            frequency_ghz: 5.0,
            channel_width_mhz: 20.0,
            output_power_dbm: 47.0,
            antenna_gain_dbi: 22.5,
            losses_db: 0.0,
        }
    }
}

/// Fresnel clearance and device height parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClearanceSettings {
    /// Percentage of the first Fresnel zone radius that must stay clear.
    pub fresnel_clearance_pct: f64,
    /// Device height given to both ends of a new link.
    pub min_device_height_m: f64,
    /// Height added to each end per adjustment iteration.
    pub height_step_m: f64,
    /// Device heights never rise above this.
    pub max_device_height_m: f64,
    /// Number of elevation samples taken along a new link.
    pub profile_samples: usize,
}

impl Default for ClearanceSettings {
    fn default() -> Self {
        Self {
            fresnel_clearance_pct: 60.0,
            min_device_height_m: 0.5,
            height_step_m: 0.5,
            max_device_height_m: 300.0,
            profile_samples: 100,
        }
    }
}

/// Search radius around a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Added to the selection's center-to-corner distance, in meters.
    pub margin_m: f64,
    /// Upper bound on the radius, in meters.
    pub cap_m: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            margin_m: cellnet_geo::DEFAULT_SEARCH_MARGIN_M,
            cap_m: cellnet_geo::DEFAULT_SEARCH_CAP_M,
        }
    }
}

/// How a sequence's assignment is scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Count of first-order neighbors sharing the value, divided by one plus
    /// the second-order same-value count.
    #[default]
    NeighborConflicts,
    /// Sum of distances to non-neighbor elements sharing the value, divided
    /// by one plus the second-order same-value count.
    CoChannelSeparation,
}

/// Radio plan search parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RadioPlanSettings {
    /// Number of random sequences tried per value domain.
    pub sequence_count: usize,
    /// Random seed. A random seed is drawn (and logged) when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Sequence scoring rule.
    pub cost_model: CostModel,
    /// Re-plan selected elements that already hold a value.
    pub reassign_existing: bool,
}

impl Default for RadioPlanSettings {
    fn default() -> Self {
        Self {
            sequence_count: 50,
            seed: None,
            cost_model: CostModel::default(),
            reassign_existing: false,
        }
    }
}

/// All per-owner settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Link radio parameters.
    pub microwave: MicrowaveSettings,
    /// Clearance adjustment.
    pub clearance: ClearanceSettings,
    /// Search radius.
    pub search: SearchSettings,
    /// Radio planning.
    pub radio_plan: RadioPlanSettings,
}

impl Settings {
    /// Check that every value is usable.
    pub fn validate(&self, owner: &OwnerId) -> Result<(), ModelError> {
        let invalid = |message: &str| {
            Err(ModelError::InvalidSettings {
                owner: owner.clone(),
                message: message.to_string(),
            })
        };

        if !(self.microwave.frequency_ghz > 0.0) {
            return invalid("microwave.frequency_ghz must be positive");
        }
        if !(0.0..=100.0).contains(&self.clearance.fresnel_clearance_pct) {
            return invalid("clearance.fresnel_clearance_pct must be within 0..=100");
        }
        if !(self.clearance.height_step_m > 0.0) {
            return invalid("clearance.height_step_m must be positive");
        }
        if self.clearance.min_device_height_m < 0.0 {
            return invalid("clearance.min_device_height_m must not be negative");
        }
        if !(self.clearance.max_device_height_m >= self.clearance.min_device_height_m) {
            return invalid("clearance.max_device_height_m must be at least min_device_height_m");
        }
        if self.clearance.profile_samples < 2 {
            return invalid("clearance.profile_samples must be at least 2");
        }
        if !(self.search.cap_m > 0.0) || self.search.margin_m < 0.0 {
            return invalid("search.cap_m must be positive and search.margin_m non-negative");
        }
        if self.radio_plan.sequence_count == 0 {
            return invalid("radio_plan.sequence_count must be at least 1");
        }
        Ok(())
    }
}
