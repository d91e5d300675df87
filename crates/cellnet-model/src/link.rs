//! Microwave links.

use crate::{LinkId, OwnerId, SiteKey};
use cellnet_geo::{Coord, ProfileSample};
use serde::{Deserialize, Serialize};

/// Whether a link stays inside one owner's network or egresses to another's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Both ends belong to the link owner.
    Private,
    /// The far end belongs to a different owner.
    Public,
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LinkType::Private => write!(f, "private"),
            LinkType::Public => write!(f, "public"),
        }
    }
}

/// One end of a link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkEnd {
    /// The site this end is mounted on.
    pub site: SiteKey,
    /// Position of the site.
    pub position: Coord,
    /// Antenna height on the mast in meters.
    pub device_height_m: f64,
    /// Ground elevation at the antenna location in meters.
    pub local_height_m: f64,
    /// Bearing towards the opposite end in degrees.
    pub bearing_deg: f64,
}

impl LinkEnd {
    /// Antenna elevation above the reference datum.
    pub fn device_elevation_m(&self) -> f64 {
        self.device_height_m + self.local_height_m
    }
}

/// Contact details of the far end's owner, carried by public links.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignContact {
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// A microwave link.
///
/// End `a` always belongs to the link owner. For public links end `b`
/// belongs to a different owner whose contact is in `foreign_contact`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Owning account.
    pub owner: OwnerId,
    /// Per-owner link number.
    pub id: LinkId,
    /// Display name.
    pub name: String,
    /// Private or public.
    pub link_type: LinkType,
    /// Owner-controlled end.
    pub a: LinkEnd,
    /// Far end.
    pub b: LinkEnd,
    /// Path length in kilometers.
    pub distance_km: f64,
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
    /// Terrain profile from `a` to `b`.
    #[serde(default)]
    pub profile: Vec<ProfileSample>,
    /// Far-end owner contact (public links only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_contact: Option<ForeignContact>,
}

impl Link {
    /// Whether this link joins `x` and `y` in either direction.
    pub fn connects(&self, x: &SiteKey, y: &SiteKey) -> bool {
        (&self.a.site == x && &self.b.site == y) || (&self.a.site == y && &self.b.site == x)
    }

    /// Whether either end of this link is `site`.
    pub fn touches(&self, site: &SiteKey) -> bool {
        &self.a.site == site || &self.b.site == site
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn end(site: &str, device: f64, local: f64) -> LinkEnd {
        LinkEnd {
            site: SiteKey::new("o", site),
            position: Coord::new(0.0, 0.0),
            device_height_m: device,
            local_height_m: local,
            bearing_deg: 0.0,
        }
    }

    fn link() -> Link {
        Link {
            owner: OwnerId::from("o"),
            id: LinkId(1),
            name: "new link 1".to_string(),
            link_type: LinkType::Private,
            a: end("a", 0.5, 100.0),
            b: end("b", 0.5, 80.0),
            distance_km: 1.0,
            frequency_ghz: 5.0,
            channel_width_mhz: 20.0,
            output_power_dbm: 47.0,
            antenna_gain_dbi: 22.5,
            losses_db: 0.0,
            profile: Vec::new(),
            foreign_contact: None,
        }
    }

    #[test]
    fn test_connects_is_unordered() {
        let l = link();
        let a = SiteKey::new("o", "a");
        let b = SiteKey::new("o", "b");
        let c = SiteKey::new("o", "c");
        assert!(l.connects(&a, &b));
        assert!(l.connects(&b, &a));
        assert!(!l.connects(&a, &c));
        assert!(l.touches(&b));
        assert!(!l.touches(&c));
    }

    #[test]
    fn test_device_elevation() {
        assert_eq!(link().a.device_elevation_m(), 100.5);
    }

    #[test]
    fn test_link_type_serde() {
        assert_eq!(serde_yaml::to_string(&LinkType::Public).unwrap().trim(), "public");
    }
}
