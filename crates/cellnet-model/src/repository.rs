//! The repository interface and an in-memory implementation.

use crate::{
    LinkId, Link, Owner, OwnerId, RadioField, RepositoryError, Result, Settings, Site, SiteId,
    SiteKey,
};
use std::collections::BTreeMap;
use tracing::trace;

/// Storage for sites, links, owners and settings.
///
/// Reads take `&self`; writes take `&mut self`, so a single repository
/// serializes all writes per `(owner, site)` key.
pub trait Repository {
    /// Look up an owner.
    fn get_owner(&self, owner: &OwnerId) -> Result<Owner>;

    /// Settings for an owner, defaulted when none are stored.
    fn get_settings(&self, owner: &OwnerId) -> Result<Settings>;

    /// Sites of `owner` whose ids are in `ids`. Unknown ids are skipped.
    fn get_sites(&self, owner: &OwnerId, ids: &[SiteId]) -> Result<Vec<Site>>;

    /// Look up a single site of any owner.
    fn get_site(&self, key: &SiteKey) -> Result<Site>;

    /// Every site of every owner.
    fn all_sites(&self) -> Result<Vec<Site>>;

    /// Every link owned by `owner`.
    fn get_links(&self, owner: &OwnerId) -> Result<Vec<Link>>;

    /// Look up a single link.
    fn get_link(&self, owner: &OwnerId, id: LinkId) -> Result<Link>;

    /// The id a new link of `owner` should get.
    fn next_link_id(&self, owner: &OwnerId) -> Result<LinkId>;

    /// Insert or replace a link.
    fn upsert_link(&mut self, link: Link) -> Result<()>;

    /// Delete a link. Returns whether it existed.
    fn delete_link(&mut self, owner: &OwnerId, id: LinkId) -> Result<bool>;

    /// Set both device heights of a link.
    fn update_link_heights(
        &mut self,
        owner: &OwnerId,
        id: LinkId,
        a_height_m: f64,
        b_height_m: f64,
    ) -> Result<()>;

    /// Set a site's mast height.
    fn update_site_height(&mut self, key: &SiteKey, height_m: f64) -> Result<()>;

    /// Set (or clear) a site's channel or cell identity.
    fn update_site_assignment(
        &mut self,
        key: &SiteKey,
        field: RadioField,
        value: Option<String>,
    ) -> Result<()>;

    /// Set (or clear) a site's carrier frequencies.
    fn update_site_frequencies(
        &mut self,
        key: &SiteKey,
        dl_mhz: Option<f64>,
        ul_mhz: Option<f64>,
    ) -> Result<()>;
}

/// A [`Repository`] backed by ordered maps.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    owners: BTreeMap<OwnerId, Owner>,
    settings: BTreeMap<OwnerId, Settings>,
    sites: BTreeMap<SiteKey, Site>,
    links: BTreeMap<(OwnerId, LinkId), Link>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an owner.
    pub fn insert_owner(&mut self, owner: Owner) {
        self.owners.insert(owner.id.clone(), owner);
    }

    /// Store settings for an owner.
    pub fn insert_settings(&mut self, owner: OwnerId, settings: Settings) {
        self.settings.insert(owner, settings);
    }

    /// Add or replace a site.
    pub fn insert_site(&mut self, site: Site) {
        self.sites.insert(site.key(), site);
    }

    /// All owners, ordered by id.
    pub fn owners(&self) -> impl Iterator<Item = &Owner> {
        self.owners.values()
    }

    /// All stored settings, ordered by owner.
    pub fn settings(&self) -> impl Iterator<Item = (&OwnerId, &Settings)> {
        self.settings.iter()
    }

    /// All sites, ordered by key.
    pub fn sites(&self) -> impl Iterator<Item = &Site> {
        self.sites.values()
    }

    /// All links, ordered by owner then id.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    fn site_mut(&mut self, key: &SiteKey) -> Result<&mut Site> {
        self.sites
            .get_mut(key)
            .ok_or_else(|| RepositoryError::UnknownSite {
                owner: key.owner.clone(),
                site: key.site.clone(),
            })
    }

    fn require_owner(&self, owner: &OwnerId) -> Result<()> {
        if self.owners.contains_key(owner) {
            Ok(())
        } else {
            Err(RepositoryError::UnknownOwner(owner.clone()))
        }
    }
}

impl Repository for InMemoryRepository {
    fn get_owner(&self, owner: &OwnerId) -> Result<Owner> {
        self.owners
            .get(owner)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownOwner(owner.clone()))
    }

    fn get_settings(&self, owner: &OwnerId) -> Result<Settings> {
        self.require_owner(owner)?;
        Ok(self.settings.get(owner).cloned().unwrap_or_default())
    }

    fn get_sites(&self, owner: &OwnerId, ids: &[SiteId]) -> Result<Vec<Site>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.sites.get(&SiteKey::new(owner.clone(), id.clone())))
            .cloned()
            .collect())
    }

    fn get_site(&self, key: &SiteKey) -> Result<Site> {
        self.sites
            .get(key)
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownSite {
                owner: key.owner.clone(),
                site: key.site.clone(),
            })
    }

    fn all_sites(&self) -> Result<Vec<Site>> {
        Ok(self.sites.values().cloned().collect())
    }

    fn get_links(&self, owner: &OwnerId) -> Result<Vec<Link>> {
        Ok(self
            .links
            .range((owner.clone(), LinkId(0))..=(owner.clone(), LinkId(u32::MAX)))
            .map(|(_, link)| link.clone())
            .collect())
    }

    fn get_link(&self, owner: &OwnerId, id: LinkId) -> Result<Link> {
        self.links
            .get(&(owner.clone(), id))
            .cloned()
            .ok_or_else(|| RepositoryError::UnknownLink {
                owner: owner.clone(),
                link: id,
            })
    }

    fn next_link_id(&self, owner: &OwnerId) -> Result<LinkId> {
        let max = self
            .links
            .range((owner.clone(), LinkId(0))..=(owner.clone(), LinkId(u32::MAX)))
            .map(|((_, id), _)| *id)
            .next_back();
        Ok(max.map_or(LinkId(1), LinkId::next))
    }

    fn upsert_link(&mut self, link: Link) -> Result<()> {
        trace!(owner = %link.owner, link = %link.id, "upsert link");
        self.links.insert((link.owner.clone(), link.id), link);
        Ok(())
    }

    fn delete_link(&mut self, owner: &OwnerId, id: LinkId) -> Result<bool> {
        trace!(owner = %owner, link = %id, "delete link");
        Ok(self.links.remove(&(owner.clone(), id)).is_some())
    }

    fn update_link_heights(
        &mut self,
        owner: &OwnerId,
        id: LinkId,
        a_height_m: f64,
        b_height_m: f64,
    ) -> Result<()> {
        let link = self
            .links
            .get_mut(&(owner.clone(), id))
            .ok_or_else(|| RepositoryError::UnknownLink {
                owner: owner.clone(),
                link: id,
            })?;
        link.a.device_height_m = a_height_m;
        link.b.device_height_m = b_height_m;
        Ok(())
    }

    fn update_site_height(&mut self, key: &SiteKey, height_m: f64) -> Result<()> {
        trace!(site = %key, height_m, "update site height");
        self.site_mut(key)?.height_m = height_m;
        Ok(())
    }

    fn update_site_assignment(
        &mut self,
        key: &SiteKey,
        field: RadioField,
        value: Option<String>,
    ) -> Result<()> {
        trace!(site = %key, %field, value = ?value, "update site assignment");
        self.site_mut(key)?.set_radio_value(field, value);
        Ok(())
    }

    fn update_site_frequencies(
        &mut self,
        key: &SiteKey,
        dl_mhz: Option<f64>,
        ul_mhz: Option<f64>,
    ) -> Result<()> {
        let site = self.site_mut(key)?;
        site.dl_frequency_mhz = dl_mhz;
        site.ul_frequency_mhz = ul_mhz;
        Ok(())
    }
}
