//! Value domains: which site field is planned and the pool it draws from.

use crate::RadioError;
use cellnet_model::{RadioField, Technology};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Number of GSM 900 absolute radio frequency channels.
pub const ARFCN_COUNT: u32 = 124;

/// Highest LTE physical cell identity.
pub const MAX_PCI: u32 = 503;

/// Number of GSM base station identity codes.
pub const BSIC_COUNT: u32 = 64;

/// Channel committed alongside every 4G cell identity.
pub const LTE_CHANNEL: &str = "3450";

/// 4G downlink carrier in MHz.
pub const LTE_DL_FREQUENCY_MHZ: f64 = 925.0;

/// 4G uplink carrier in MHz.
pub const LTE_UL_FREQUENCY_MHZ: f64 = 880.0;

/// A radio resource planned independently of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValueDomain {
    /// 2G absolute radio frequency channel.
    #[serde(rename = "2g_channel")]
    TwoGChannel,
    /// 2G base station identity code.
    #[serde(rename = "2g_cell_id")]
    TwoGCellId,
    /// 4G physical cell identity.
    #[serde(rename = "4g_cell_id")]
    FourGCellId,
}

/// Carrier details committed together with a value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Carrier {
    /// Channel to store, when the planned field is not the channel itself.
    pub channel: Option<String>,
    /// Downlink frequency in MHz.
    pub dl_frequency_mhz: f64,
    /// Uplink frequency in MHz.
    pub ul_frequency_mhz: f64,
}

impl ValueDomain {
    /// Every domain, in planning order.
    pub const ALL: [ValueDomain; 3] = [
        ValueDomain::TwoGChannel,
        ValueDomain::TwoGCellId,
        ValueDomain::FourGCellId,
    ];

    /// Technology whose sites are planned.
    pub const fn technology(self) -> Technology {
        match self {
            ValueDomain::TwoGChannel | ValueDomain::TwoGCellId => Technology::TwoG,
            ValueDomain::FourGCellId => Technology::FourG,
        }
    }

    /// Site field receiving the value.
    pub const fn field(self) -> RadioField {
        match self {
            ValueDomain::TwoGChannel => RadioField::Channel,
            ValueDomain::TwoGCellId | ValueDomain::FourGCellId => RadioField::CellId,
        }
    }

    /// Stable name used in config, logs and metric labels.
    pub const fn label(self) -> &'static str {
        match self {
            ValueDomain::TwoGChannel => "2g_channel",
            ValueDomain::TwoGCellId => "2g_cell_id",
            ValueDomain::FourGCellId => "4g_cell_id",
        }
    }

    /// The value pool, in draw order.
    pub fn pool(self) -> Vec<String> {
        match self {
            ValueDomain::TwoGChannel => (1..=ARFCN_COUNT)
                .map(|i| fold(i * 3, ARFCN_COUNT).to_string())
                .collect(),
            ValueDomain::TwoGCellId => (0..BSIC_COUNT).map(|i| format!("{:o}", i)).collect(),
            ValueDomain::FourGCellId => (0..=MAX_PCI)
                .map(|i| fold(i * 6, MAX_PCI).to_string())
                .collect(),
        }
    }

    /// Carrier details to commit with `value`.
    ///
    /// 2G channels map to `ul = 890 + 0.2 * channel` and `dl = ul + 45` MHz.
    /// 4G cells get a fixed channel and fixed carriers. 2G cell identities and
    /// non-numeric channels carry nothing.
    pub fn carrier(self, value: &str) -> Option<Carrier> {
        match self {
            ValueDomain::TwoGChannel => {
                let channel: f64 = value.trim().parse().ok()?;
                let ul = 890.0 + 0.2 * channel;
                Some(Carrier {
                    channel: None,
                    dl_frequency_mhz: ul + 45.0,
                    ul_frequency_mhz: ul,
                })
            }
            ValueDomain::TwoGCellId => None,
            ValueDomain::FourGCellId => Some(Carrier {
                channel: Some(LTE_CHANNEL.to_string()),
                dl_frequency_mhz: LTE_DL_FREQUENCY_MHZ,
                ul_frequency_mhz: LTE_UL_FREQUENCY_MHZ,
            }),
        }
    }
}

/// Subtract `max` until `value <= max`.
fn fold(mut value: u32, max: u32) -> u32 {
    while value > max {
        value -= max;
    }
    value
}

impl std::fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ValueDomain {
    type Err = RadioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "2g_channel" | "arfcn" => Ok(ValueDomain::TwoGChannel),
            "2g_cell_id" | "bsic" => Ok(ValueDomain::TwoGCellId),
            "4g_cell_id" | "pci" => Ok(ValueDomain::FourGCellId),
            _ => Err(RadioError::UnknownDomain(s.to_string())),
        }
    }
}
