//! YAML scenario documents.

use crate::{InMemoryRepository, Link, ModelError, Owner, OwnerId, Repository, Settings, Site};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// A serializable snapshot of everything a repository holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    /// Operator accounts.
    #[serde(default)]
    pub owners: Vec<Owner>,
    /// Per-owner settings. Owners without an entry use the defaults.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub settings: BTreeMap<OwnerId, Settings>,
    /// Sites of every owner.
    #[serde(default)]
    pub sites: Vec<Site>,
    /// Existing links.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Scenario {
    /// Parse a scenario from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ModelError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a scenario from a YAML or JSON file, chosen by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        if is_json(path) {
            Ok(serde_json::from_str(&text)?)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Validate the scenario and load it into a repository.
    pub fn into_repository(self) -> Result<InMemoryRepository, ModelError> {
        let mut repo = InMemoryRepository::new();

        let mut owners = BTreeSet::new();
        for owner in self.owners {
            if !owners.insert(owner.id.clone()) {
                return Err(ModelError::Duplicate {
                    kind: "owner",
                    id: owner.id.to_string(),
                });
            }
            repo.insert_owner(owner);
        }

        for (owner, settings) in self.settings {
            settings.validate(&owner)?;
            repo.insert_settings(owner, settings);
        }

        let mut sites = BTreeSet::new();
        for site in self.sites {
            if !owners.contains(&site.owner) {
                return Err(ModelError::UndeclaredOwner {
                    owner: site.owner.clone(),
                    site: site.id.clone(),
                });
            }
            if !sites.insert(site.key()) {
                return Err(ModelError::Duplicate {
                    kind: "site",
                    id: site.key().to_string(),
                });
            }
            repo.insert_site(site);
        }

        let mut links = BTreeSet::new();
        for link in self.links {
            if !links.insert((link.owner.clone(), link.id)) {
                return Err(ModelError::Duplicate {
                    kind: "link",
                    id: format!("{}/{}", link.owner, link.id),
                });
            }
            repo.upsert_link(link)?;
        }

        Ok(repo)
    }

    /// Snapshot a repository.
    pub fn from_repository(repo: &InMemoryRepository) -> Self {
        Self {
            owners: repo.owners().cloned().collect(),
            settings: repo
                .settings()
                .map(|(owner, settings)| (owner.clone(), settings.clone()))
                .collect(),
            sites: repo.sites().cloned().collect(),
            links: repo.links().cloned().collect(),
        }
    }

    /// Render as YAML.
    pub fn to_yaml_string(&self) -> Result<String, ModelError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Technology;
    use cellnet_geo::Coord;

    fn scenario() -> Scenario {
        Scenario {
            owners: vec![Owner::new("a", "A", "a@example.com")],
            settings: BTreeMap::new(),
            sites: vec![Site::new("a", "s1", Coord::new(0.0, 0.0), 30.0, Technology::FourG)],
            links: Vec::new(),
        }
    }

    #[test]
    fn test_undeclared_owner_rejected() {
        let mut s = scenario();
        s.sites
            .push(Site::new("ghost", "s9", Coord::new(0.0, 0.0), 30.0, Technology::TwoG));
        assert!(matches!(
            s.into_repository(),
            Err(ModelError::UndeclaredOwner { .. })
        ));
    }

    #[test]
    fn test_duplicate_site_rejected() {
        let mut s = scenario();
        s.sites.push(s.sites[0].clone());
        assert!(matches!(
            s.into_repository(),
            Err(ModelError::Duplicate { kind: "site", .. })
        ));
    }

    #[test]
    fn test_repository_snapshot_roundtrip() {
        let repo = scenario().into_repository().unwrap();
        let snapshot = Scenario::from_repository(&repo);
        assert_eq!(snapshot, scenario());
        assert_eq!(repo.all_sites().unwrap().len(), 1);
    }

    #[test]
    fn test_from_file_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let yaml_path = dir.path().join("s.yaml");
        std::fs::write(&yaml_path, scenario().to_yaml_string().unwrap()).unwrap();
        assert_eq!(Scenario::from_file(&yaml_path).unwrap(), scenario());

        let json_path = dir.path().join("s.json");
        std::fs::write(&json_path, serde_json::to_string(&scenario()).unwrap()).unwrap();
        assert_eq!(Scenario::from_file(&json_path).unwrap(), scenario());
    }
}
