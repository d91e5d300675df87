//! Sites and owners.

use crate::{OwnerId, SiteId, SiteKey};
use cellnet_geo::Coord;
use serde::{Deserialize, Serialize};

// ============================================================================
// Technology
// ============================================================================

/// Radio access technology of a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Technology {
    /// GSM.
    #[serde(rename = "2G")]
    TwoG,
    /// LTE.
    #[serde(rename = "4G")]
    FourG,
}

impl std::fmt::Display for Technology {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Technology::TwoG => write!(f, "2G"),
            Technology::FourG => write!(f, "4G"),
        }
    }
}

/// Which radio-resource field of a site an assignment writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioField {
    /// Carrier channel (ARFCN / EARFCN).
    Channel,
    /// Cell identity (BSIC / PCI).
    CellId,
}

impl std::fmt::Display for RadioField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadioField::Channel => write!(f, "channel"),
            RadioField::CellId => write!(f, "cell_id"),
        }
    }
}

// ============================================================================
// Site
// ============================================================================

/// Antenna and power parameters of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntennaParams {
    /// Effective isotropic radiated power in dBm.
    pub eirp_dbm: f64,
    /// Antenna gain in dBi.
    pub gain_dbi: f64,
    /// Azimuth in degrees from north.
    pub azimuth_deg: f64,
    /// Mechanical downtilt in degrees.
    pub tilt_deg: f64,
}

impl Default for AntennaParams {
    fn default() -> Self {
        Self {
            eirp_dbm: 58.0,
            gain_dbi: 17.0,
            azimuth_deg: 0.0,
            tilt_deg: 2.0,
        }
    }
}

/// A positioned radio site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    /// Owning account.
    pub owner: OwnerId,
    /// Site identifier, unique within the owner.
    pub id: SiteId,
    /// Longitude/latitude of the mast.
    pub position: Coord,
    /// Mast height above ground in meters.
    pub height_m: f64,
    /// Radio access technology.
    pub technology: Technology,
    /// Assigned channel, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Assigned cell identity, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_id: Option<String>,
    /// Downlink carrier frequency in MHz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dl_frequency_mhz: Option<f64>,
    /// Uplink carrier frequency in MHz.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ul_frequency_mhz: Option<f64>,
    /// Antenna parameters.
    #[serde(default)]
    pub antenna: AntennaParams,
}

impl Site {
    /// Create an unassigned site with default antenna parameters.
    pub fn new(
        owner: impl Into<OwnerId>,
        id: impl Into<SiteId>,
        position: Coord,
        height_m: f64,
        technology: Technology,
    ) -> Self {
        Self {
            owner: owner.into(),
            id: id.into(),
            position,
            height_m,
            technology,
            channel: None,
            cell_id: None,
            dl_frequency_mhz: None,
            ul_frequency_mhz: None,
            antenna: AntennaParams::default(),
        }
    }

    /// The site's global identity.
    pub fn key(&self) -> SiteKey {
        SiteKey::new(self.owner.clone(), self.id.clone())
    }

    /// Current value of a radio-resource field.
    pub fn radio_value(&self, field: RadioField) -> Option<&str> {
        match field {
            RadioField::Channel => self.channel.as_deref(),
            RadioField::CellId => self.cell_id.as_deref(),
        }
    }

    /// Set a radio-resource field. Empty strings are stored as `None`.
    pub fn set_radio_value(&mut self, field: RadioField, value: Option<String>) {
        let value = value.filter(|v| !v.is_empty());
        match field {
            RadioField::Channel => self.channel = value,
            RadioField::CellId => self.cell_id = value,
        }
    }
}

// ============================================================================
// Owner
// ============================================================================

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Account identifier.
    pub id: OwnerId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
}

impl Owner {
    /// Create an owner.
    pub fn new(id: impl Into<OwnerId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}
