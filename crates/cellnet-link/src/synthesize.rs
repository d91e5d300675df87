//! Backhaul topology synthesis.

use crate::{complete_graph, kruskal, LinkError, Result};
use cellnet_geo::{Coord, Geodesy, SearchArea};
use cellnet_metrics::{metric_defs, metrics, PlanLabels};
use cellnet_model::{
    ForeignContact, Link, LinkEnd, LinkId, LinkType, OwnerId, Repository, RepositoryError,
    Settings, Site, SiteId,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Links produced by one synthesis run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisResult {
    /// Every link created, in creation order.
    pub created_link_ids: Vec<LinkId>,
    /// Minimum spanning tree links among the selection.
    pub backbone_link_ids: Vec<LinkId>,
    /// Private link to the nearest unselected site of the same owner.
    pub boundary_private_link_id: Option<LinkId>,
    /// Public link to the nearest site of another owner.
    pub boundary_public_link_id: Option<LinkId>,
    /// Private links removed before re-planning.
    pub deleted_link_ids: Vec<LinkId>,
    /// Area searched for boundary sites.
    pub search_area: Option<SearchArea>,
}

/// Builds the private backbone and boundary links for a site selection.
#[derive(Debug, Clone, Copy)]
pub struct TopologySynthesizer<'g, G: ?Sized> {
    geo: &'g G,
}

impl<'g, G: Geodesy + ?Sized> TopologySynthesizer<'g, G> {
    /// Create a synthesizer using `geo` for distances and terrain.
    pub fn new(geo: &'g G) -> Self {
        Self { geo }
    }

    /// Re-plan the links of `site_ids`.
    ///
    /// Existing private links touching the selection are deleted first. Then
    /// the selection is joined by a minimum spanning tree and, where suitable
    /// sites exist inside the search area, one boundary private link and one
    /// boundary public link are added.
    pub fn synthesize<R: Repository>(
        &self,
        repo: &mut R,
        owner: &OwnerId,
        site_ids: &[SiteId],
    ) -> Result<SynthesisResult> {
        let selected = self.load_selection(repo, owner, site_ids)?;
        let settings = repo.get_settings(owner)?;
        let labels = PlanLabels::new(owner.as_str());
        let mut result = SynthesisResult::default();

        // Start from scratch for the selection.
        let selected_ids: BTreeSet<&SiteId> = selected.iter().map(|s| &s.id).collect();
        for link in repo.get_links(owner)? {
            let touches_selection = selected.iter().any(|s| link.touches(&s.key()));
            if link.link_type == LinkType::Private && touches_selection {
                repo.delete_link(owner, link.id)?;
                result.deleted_link_ids.push(link.id);
            }
        }
        if !result.deleted_link_ids.is_empty() {
            debug!(owner = %owner, count = result.deleted_link_ids.len(), "Deleted private links");
            metrics::counter!(metric_defs::LINKS_DELETED.name, &labels.to_labels())
                .increment(result.deleted_link_ids.len() as u64);
        }

        // Backbone.
        let edges = complete_graph(selected.len(), |i, j| {
            self.geo
                .distance_m(selected[i].position, selected[j].position)
                .round() as u64
        });
        for edge in kruskal(selected.len(), &edges) {
            if let Some(id) = self.create_link(
                repo,
                &settings,
                &selected[edge.src],
                &selected[edge.dst],
                LinkType::Private,
            )? {
                result.backbone_link_ids.push(id);
                result.created_link_ids.push(id);
            }
        }

        let positions: Vec<Coord> = selected.iter().map(|s| s.position).collect();
        let Some(area) = SearchArea::around(
            self.geo,
            &positions,
            settings.search.margin_m,
            settings.search.cap_m,
        ) else {
            return Ok(result);
        };
        result.search_area = Some(area);

        let all_sites = repo.all_sites()?;
        let in_selection = |s: &Site| &s.owner == owner && selected_ids.contains(&s.id);
        let own_outside: Vec<&Site> = all_sites
            .iter()
            .filter(|s| &s.owner == owner && !in_selection(s))
            .collect();
        let foreign: Vec<&Site> = all_sites.iter().filter(|s| &s.owner != owner).collect();
        let selected_refs: Vec<&Site> = selected.iter().collect();

        // Boundary private link.
        if let Some(external) = self.nearest(area.center, &own_outside, &area) {
            if let Some(member) = self.nearest(external.position, &selected_refs, &area) {
                if let Some(id) =
                    self.create_link(repo, &settings, member, external, LinkType::Private)?
                {
                    result.boundary_private_link_id = Some(id);
                    result.created_link_ids.push(id);
                }
            }
        }

        // Boundary public link, unless an existing one already serves the area.
        let public_nearby = repo
            .get_links(owner)?
            .iter()
            .filter(|l| l.link_type == LinkType::Public)
            .any(|l| self.nearest(l.a.position, &selected_refs, &area).is_some());
        if public_nearby {
            debug!(owner = %owner, "Existing public link in range, skipping public boundary link");
        } else if let Some(external) = self.nearest(area.center, &foreign, &area) {
            if let Some(member) = self.nearest(external.position, &selected_refs, &area) {
                if let Some(target) = self.nearest(member.position, &foreign, &area) {
                    if let Some(id) =
                        self.create_link(repo, &settings, member, target, LinkType::Public)?
                    {
                        result.boundary_public_link_id = Some(id);
                        result.created_link_ids.push(id);
                    }
                }
            }
        }

        info!(
            owner = %owner,
            sites = selected.len(),
            backbone = result.backbone_link_ids.len(),
            boundary_private = result.boundary_private_link_id.is_some(),
            boundary_public = result.boundary_public_link_id.is_some(),
            radius_m = area.radius_m,
            "Topology synthesized"
        );
        Ok(result)
    }

    /// Create a link from `a` to `b` unless one of the same type already
    /// joins them. Returns the new id, or `None` when nothing was created.
    ///
    /// Both device heights start at the configured minimum. The terrain
    /// profile is sampled immediately and the ground elevation at each end
    /// is taken from its first and last samples.
    pub fn create_link<R: Repository>(
        &self,
        repo: &mut R,
        settings: &Settings,
        a: &Site,
        b: &Site,
        link_type: LinkType,
    ) -> Result<Option<LinkId>> {
        let (key_a, key_b) = (a.key(), b.key());
        if a.id.is_empty() || b.id.is_empty() || key_a == key_b {
            return Ok(None);
        }
        let owner = &a.owner;
        if repo
            .get_links(owner)?
            .iter()
            .any(|l| l.link_type == link_type && l.connects(&key_a, &key_b))
        {
            debug!(owner = %owner, a = %key_a, b = %key_b, %link_type, "Link already exists");
            return Ok(None);
        }

        let foreign_contact = match link_type {
            LinkType::Public => {
                let other = repo.get_owner(&b.owner)?;
                Some(ForeignContact {
                    name: other.name,
                    email: other.email,
                })
            }
            LinkType::Private => None,
        };

        let profile = self.geo.sample_elevation_profile(
            a.position,
            b.position,
            settings.clearance.profile_samples,
        )?;
        let local_a = profile.first().map_or(0.0, |s| s.elevation_m);
        let local_b = profile.last().map_or(0.0, |s| s.elevation_m);

        let id = repo.next_link_id(owner)?;
        let mw = &settings.microwave;
        let link = Link {
            owner: owner.clone(),
            id,
            name: format!("new link {}", id),
            link_type,
            a: LinkEnd {
                site: key_a,
                position: a.position,
                device_height_m: settings.clearance.min_device_height_m,
                local_height_m: local_a,
                bearing_deg: self.geo.bearing_deg(a.position, b.position),
            },
            b: LinkEnd {
                site: key_b,
                position: b.position,
                device_height_m: settings.clearance.min_device_height_m,
                local_height_m: local_b,
                bearing_deg: self.geo.bearing_deg(b.position, a.position),
            },
            distance_km: self.geo.distance_m(a.position, b.position) / 1000.0,
            frequency_ghz: mw.frequency_ghz,
            channel_width_mhz: mw.channel_width_mhz,
            output_power_dbm: mw.output_power_dbm,
            antenna_gain_dbi: mw.antenna_gain_dbi,
            losses_db: mw.losses_db,
            profile,
            foreign_contact,
        };

        debug!(
            owner = %owner,
            link = %id,
            a = %link.a.site,
            b = %link.b.site,
            %link_type,
            distance_km = link.distance_km,
            "Creating link"
        );
        repo.upsert_link(link)?;
        metrics::counter!(
            metric_defs::LINKS_CREATED.name,
            &PlanLabels::new(owner.as_str())
                .with_link_type(link_type.to_string())
                .to_labels()
        )
        .increment(1);

        Ok(Some(id))
    }

    /// Validate the request and load the selected sites, first occurrence
    /// order, duplicates dropped.
    fn load_selection<R: Repository>(
        &self,
        repo: &R,
        owner: &OwnerId,
        site_ids: &[SiteId],
    ) -> Result<Vec<Site>> {
        if site_ids.is_empty() {
            return Err(LinkError::InvalidInput("no sites selected".to_string()));
        }
        repo.get_owner(owner).map_err(|e| match e {
            RepositoryError::UnknownOwner(o) => LinkError::UnknownOwner(o),
            other => LinkError::Repository(other),
        })?;

        let mut seen = BTreeSet::new();
        let unique: Vec<SiteId> = site_ids
            .iter()
            .filter(|id| seen.insert(*id))
            .cloned()
            .collect();

        let sites = repo.get_sites(owner, &unique)?;
        if let Some(missing) = unique.iter().find(|id| !sites.iter().any(|s| &s.id == *id)) {
            return Err(LinkError::UnknownSite {
                owner: owner.clone(),
                site: missing.clone(),
            });
        }
        Ok(sites)
    }

    /// Nearest candidate to `origin` within the area's radius of `origin`.
    /// Ties go to the lowest `(owner, site)` key.
    fn nearest<'s>(
        &self,
        origin: Coord,
        candidates: &[&'s Site],
        area: &SearchArea,
    ) -> Option<&'s Site> {
        candidates
            .iter()
            .map(|s| (self.geo.distance_m(origin, s.position), *s))
            .filter(|(d, _)| *d <= area.radius_m)
            .min_by(|(da, sa), (db, sb)| {
                da.total_cmp(db)
                    .then_with(|| (&sa.owner, &sa.id).cmp(&(&sb.owner, &sb.id)))
            })
            .map(|(_, s)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellnet_geo::{FlatTerrain, SphericalGeodesy};
    use cellnet_model::{InMemoryRepository, Owner, Technology};

    fn geo() -> SphericalGeodesy<FlatTerrain> {
        SphericalGeodesy::new(FlatTerrain::new(100.0))
    }

    fn repo_with(sites: &[(&str, &str, f64, f64)]) -> InMemoryRepository {
        let mut repo = InMemoryRepository::new();
        repo.insert_owner(Owner::new("me", "Me", "me@example.com"));
        repo.insert_owner(Owner::new("them", "Them", "noc@them.example"));
        for (owner, id, lon, lat) in sites {
            repo.insert_site(Site::new(*owner, *id, Coord::new(*lon, *lat), 30.0, Technology::TwoG));
        }
        repo
    }

    fn ids(list: &[&str]) -> Vec<SiteId> {
        list.iter().map(|s| SiteId::from(*s)).collect()
    }

    #[test]
    fn test_empty_selection_is_invalid() {
        let geo = geo();
        let mut repo = repo_with(&[]);
        let err = TopologySynthesizer::new(&geo)
            .synthesize(&mut repo, &OwnerId::from("me"), &[])
            .unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
    }

    #[test]
    fn test_unknown_owner_and_site() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0)]);
        let synth = TopologySynthesizer::new(&geo);

        let err = synth
            .synthesize(&mut repo, &OwnerId::from("nobody"), &ids(&["a"]))
            .unwrap_err();
        assert!(matches!(err, LinkError::UnknownOwner(_)));

        let err = synth
            .synthesize(&mut repo, &OwnerId::from("me"), &ids(&["a", "zz"]))
            .unwrap_err();
        assert!(matches!(err, LinkError::UnknownSite { ref site, .. } if site.as_str() == "zz"));
    }

    #[test]
    fn test_create_link_is_idempotent() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0), ("me", "b", 0.01, 0.0)]);
        let settings = Settings::default();
        let a = repo.get_site(&cellnet_model::SiteKey::new("me", "a")).unwrap();
        let b = repo.get_site(&cellnet_model::SiteKey::new("me", "b")).unwrap();
        let synth = TopologySynthesizer::new(&geo);

        let first = synth
            .create_link(&mut repo, &settings, &a, &b, LinkType::Private)
            .unwrap();
        assert_eq!(first, Some(LinkId(1)));
        // Same pair, either direction.
        assert_eq!(
            synth
                .create_link(&mut repo, &settings, &b, &a, LinkType::Private)
                .unwrap(),
            None
        );
        // Self links are never created.
        assert_eq!(
            synth
                .create_link(&mut repo, &settings, &a, &a, LinkType::Private)
                .unwrap(),
            None
        );
        assert_eq!(repo.get_links(&OwnerId::from("me")).unwrap().len(), 1);
    }

    #[test]
    fn test_created_link_fields() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0), ("me", "b", 0.0, 0.01)]);
        let settings = Settings::default();
        let a = repo.get_site(&cellnet_model::SiteKey::new("me", "a")).unwrap();
        let b = repo.get_site(&cellnet_model::SiteKey::new("me", "b")).unwrap();
        let id = TopologySynthesizer::new(&geo)
            .create_link(&mut repo, &settings, &a, &b, LinkType::Private)
            .unwrap()
            .unwrap();

        let link = repo.get_link(&OwnerId::from("me"), id).unwrap();
        assert_eq!(link.name, "new link 1");
        assert_eq!(link.profile.len(), 100);
        assert_eq!(link.a.device_height_m, 0.5);
        assert_eq!(link.b.device_height_m, 0.5);
        assert_eq!(link.a.local_height_m, 100.0);
        assert!(link.a.bearing_deg.abs() < 1e-9);
        assert!((link.b.bearing_deg - 180.0).abs() < 1e-9);
        assert!((link.distance_km - 1.112).abs() < 0.001);
        assert_eq!(link.frequency_ghz, 5.0);
        assert!(link.foreign_contact.is_none());
    }

    #[test]
    fn test_backbone_and_boundary_links() {
        let geo = geo();
        let mut repo = repo_with(&[
            ("me", "a", 0.00, 0.0),
            ("me", "b", 0.01, 0.0),
            ("me", "c", 0.03, 0.0),
            ("me", "outside", 0.10, 0.0),
            ("them", "x", -0.05, 0.0),
        ]);
        let owner = OwnerId::from("me");
        let result = TopologySynthesizer::new(&geo)
            .synthesize(&mut repo, &owner, &ids(&["a", "b", "c"]))
            .unwrap();

        assert_eq!(result.backbone_link_ids.len(), 2);
        assert!(result.boundary_private_link_id.is_some());
        assert!(result.boundary_public_link_id.is_some());
        assert_eq!(result.created_link_ids.len(), 4);

        let links = repo.get_links(&owner).unwrap();
        let boundary = links
            .iter()
            .find(|l| Some(l.id) == result.boundary_private_link_id)
            .unwrap();
        assert_eq!(boundary.a.site.site.as_str(), "c");
        assert_eq!(boundary.b.site.site.as_str(), "outside");

        let public = links
            .iter()
            .find(|l| Some(l.id) == result.boundary_public_link_id)
            .unwrap();
        assert_eq!(public.link_type, LinkType::Public);
        assert_eq!(public.a.site.site.as_str(), "a");
        assert_eq!(public.b.site.owner.as_str(), "them");
        assert_eq!(
            public.foreign_contact.as_ref().map(|c| c.email.as_str()),
            Some("noc@them.example")
        );
    }

    #[test]
    fn test_replan_replaces_private_links_and_skips_public() {
        let geo = geo();
        let mut repo = repo_with(&[
            ("me", "a", 0.00, 0.0),
            ("me", "b", 0.01, 0.0),
            ("them", "x", -0.05, 0.0),
        ]);
        let owner = OwnerId::from("me");
        let synth = TopologySynthesizer::new(&geo);

        let first = synth
            .synthesize(&mut repo, &owner, &ids(&["a", "b"]))
            .unwrap();
        assert!(first.boundary_public_link_id.is_some());

        let second = synth
            .synthesize(&mut repo, &owner, &ids(&["b", "a", "b"]))
            .unwrap();
        assert_eq!(second.deleted_link_ids, first.backbone_link_ids);
        assert_eq!(second.backbone_link_ids.len(), 1);
        assert!(second.boundary_public_link_id.is_none());

        let links = repo.get_links(&owner).unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(
            links.iter().filter(|l| l.link_type == LinkType::Public).count(),
            1
        );
    }

    #[test]
    fn test_sites_beyond_radius_ignored() {
        let geo = geo();
        let mut repo = repo_with(&[
            ("me", "a", 0.0, 0.0),
            ("me", "far", 5.0, 0.0),
            ("them", "x", -5.0, 0.0),
        ]);
        let result = TopologySynthesizer::new(&geo)
            .synthesize(&mut repo, &OwnerId::from("me"), &ids(&["a"]))
            .unwrap();
        assert!(result.created_link_ids.is_empty());
        assert_eq!(result.search_area.map(|a| a.radius_m), Some(50_000.0));
    }
}
