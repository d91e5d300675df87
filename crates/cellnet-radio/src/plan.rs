//! Repository-backed radio planning for one value domain at a time.

use crate::{AssignmentEngine, NeighborGraph, NetworkElement, RadioError, Result, ValueDomain};
use cellnet_geo::{Coord, Geodesy, SearchArea};
use cellnet_metrics::{metric_defs, metrics, PlanLabels};
use cellnet_model::{
    OwnerId, RadioField, Repository, RepositoryError, Site, SiteId, SiteKey,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// A value written to a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedValue {
    /// Site that received the value.
    pub site: SiteKey,
    /// The value.
    pub value: String,
}

/// Outcome of planning one value domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainReport {
    /// Domain planned.
    pub domain: ValueDomain,
    /// Seed the sequences were derived from.
    pub seed: u64,
    /// True when there was nothing to assign.
    pub skipped: bool,
    /// Elements that received a value.
    pub candidates: usize,
    /// Elements whose fixed values constrained the plan.
    pub context: usize,
    /// Index of the committed sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_sequence: Option<usize>,
    /// Total cost of the committed sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_cost: Option<f64>,
    /// Neighbor pairs sharing a value after assignment.
    pub conflicts: usize,
    /// Values written, in element order.
    pub committed: Vec<CommittedValue>,
}

impl DomainReport {
    fn skipped(domain: ValueDomain, seed: u64, context: usize) -> Self {
        Self {
            domain,
            seed,
            skipped: true,
            candidates: 0,
            context,
            best_sequence: None,
            best_cost: None,
            conflicts: 0,
            committed: Vec::new(),
        }
    }
}

/// Plans channels and cell identities for a site selection.
#[derive(Debug, Clone, Copy)]
pub struct RadioPlanner<'g, G: ?Sized> {
    geo: &'g G,
    seed: Option<u64>,
}

impl<'g, G: Geodesy + ?Sized> RadioPlanner<'g, G> {
    /// Create a planner using `geo` for the search area.
    pub fn new(geo: &'g G) -> Self {
        Self { geo, seed: None }
    }

    /// Use `seed` instead of the owner's configured seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Assign `domain` values to the selected sites of its technology.
    ///
    /// Candidates are the selected sites lacking a value, or all selected
    /// sites of the technology when the owner's settings ask for
    /// reassignment. Every other valued site of the technology, of any owner,
    /// inside the selection's search area constrains the plan. Nothing is
    /// written when there are no candidates.
    pub fn assign<R: Repository>(
        &self,
        repo: &mut R,
        owner: &OwnerId,
        site_ids: &[SiteId],
        domain: ValueDomain,
    ) -> Result<DomainReport> {
        let selected = load_selection(repo, owner, site_ids)?;
        let settings = repo.get_settings(owner)?;
        let plan = &settings.radio_plan;
        let seed = match self.seed.or(plan.seed) {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                info!(owner = %owner, domain = %domain, seed, "Drew random radio plan seed");
                seed
            }
        };

        let technology = domain.technology();
        let field = domain.field();

        let candidates: Vec<&Site> = selected
            .iter()
            .filter(|s| s.technology == technology)
            .filter(|s| plan.reassign_existing || s.radio_value(field).is_none())
            .collect();
        let candidate_keys: BTreeSet<SiteKey> = candidates.iter().map(|s| s.key()).collect();
        let selected_keys: BTreeSet<SiteKey> = selected.iter().map(Site::key).collect();

        let positions: Vec<Coord> = selected.iter().map(|s| s.position).collect();
        let area = SearchArea::around(
            self.geo,
            &positions,
            settings.search.margin_m,
            settings.search.cap_m,
        );

        // Valued sites of the technology: selected ones kept as they are, and
        // everything else inside the search area.
        let all_sites = repo.all_sites()?;
        let context: Vec<&Site> = all_sites
            .iter()
            .filter(|s| s.technology == technology && !candidate_keys.contains(&s.key()))
            .filter(|s| s.radio_value(field).is_some())
            .filter(|s| {
                selected_keys.contains(&s.key())
                    || area.is_some_and(|a| a.contains(self.geo, s.position))
            })
            .collect();

        if candidates.is_empty() {
            debug!(owner = %owner, domain = %domain, "No candidates, skipping domain");
            return Ok(DomainReport::skipped(domain, seed, context.len()));
        }

        let elements: Vec<NetworkElement> = candidates
            .iter()
            .map(|s| NetworkElement::candidate(s.key(), s.position))
            .chain(context.iter().filter_map(|s| {
                s.radio_value(field)
                    .map(|v| NetworkElement::context(s.key(), s.position, v))
            }))
            .collect();
        let element_positions: Vec<Coord> = elements.iter().map(|e| e.position).collect();
        let graph = NeighborGraph::build(&element_positions);
        debug!(
            owner = %owner,
            domain = %domain,
            candidates = candidates.len(),
            context = context.len(),
            edges = graph.edge_count(),
            "Built neighbor graph"
        );

        let outcome = AssignmentEngine::new(seed)
            .with_sequence_count(plan.sequence_count)
            .with_cost_model(plan.cost_model)
            .assign(&elements, &graph, &domain.pool())?;

        let mut committed = Vec::with_capacity(outcome.assignments.len());
        for assignment in &outcome.assignments {
            repo.update_site_assignment(&assignment.key, field, Some(assignment.value.clone()))?;
            if let Some(carrier) = domain.carrier(&assignment.value) {
                if let Some(channel) = carrier.channel {
                    repo.update_site_assignment(&assignment.key, RadioField::Channel, Some(channel))?;
                }
                repo.update_site_frequencies(
                    &assignment.key,
                    Some(carrier.dl_frequency_mhz),
                    Some(carrier.ul_frequency_mhz),
                )?;
            }
            committed.push(CommittedValue {
                site: assignment.key.clone(),
                value: assignment.value.clone(),
            });
        }

        let labels = PlanLabels::new(owner.as_str()).with_domain(domain.label());
        metrics::counter!(metric_defs::RADIO_ASSIGNED.name, &labels.to_labels())
            .increment(committed.len() as u64);
        for cost in &outcome.sequence_costs {
            metrics::histogram!(metric_defs::RADIO_SEQUENCE_COST.name, &labels.to_labels())
                .record(*cost);
        }
        metrics::gauge!(metric_defs::RADIO_CONFLICTS.name, &labels.to_labels())
            .set(outcome.conflicts as f64);

        info!(
            owner = %owner,
            domain = %domain,
            seed,
            assigned = committed.len(),
            context = context.len(),
            best_sequence = outcome.best_sequence,
            conflicts = outcome.conflicts,
            "Radio values assigned"
        );

        Ok(DomainReport {
            domain,
            seed,
            skipped: false,
            candidates: candidates.len(),
            context: context.len(),
            best_sequence: Some(outcome.best_sequence),
            best_cost: Some(outcome.best_cost),
            conflicts: outcome.conflicts,
            committed,
        })
    }
}

/// Validate the request and load the selected sites, duplicates dropped.
fn load_selection<R: Repository>(
    repo: &R,
    owner: &OwnerId,
    site_ids: &[SiteId],
) -> Result<Vec<Site>> {
    if site_ids.is_empty() {
        return Err(RadioError::InvalidInput("no sites selected".to_string()));
    }
    repo.get_owner(owner).map_err(|e| match e {
        RepositoryError::UnknownOwner(o) => RadioError::UnknownOwner(o),
        other => RadioError::Repository(other),
    })?;

    let mut seen = BTreeSet::new();
    let unique: Vec<SiteId> = site_ids
        .iter()
        .filter(|id| seen.insert(*id))
        .cloned()
        .collect();
    let sites = repo.get_sites(owner, &unique)?;
    if let Some(missing) = unique.iter().find(|id| !sites.iter().any(|s| &s.id == *id)) {
        return Err(RadioError::UnknownSite {
            owner: owner.clone(),
            site: missing.clone(),
        });
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellnet_geo::{FlatTerrain, SphericalGeodesy};
    use cellnet_model::{InMemoryRepository, Owner, Settings, Technology};

    fn geo() -> SphericalGeodesy<FlatTerrain> {
        SphericalGeodesy::new(FlatTerrain::new(0.0))
    }

    fn repo_with(sites: &[(&str, &str, f64, f64, Technology)]) -> InMemoryRepository {
        let mut repo = InMemoryRepository::new();
        repo.insert_owner(Owner::new("me", "Me", "me@example.com"));
        repo.insert_owner(Owner::new("them", "Them", "noc@them.example"));
        let mut settings = Settings::default();
        settings.radio_plan.seed = Some(42);
        settings.radio_plan.sequence_count = 8;
        repo.insert_settings(OwnerId::from("me"), settings);
        for (owner, id, lon, lat, tech) in sites {
            repo.insert_site(Site::new(*owner, *id, Coord::new(*lon, *lat), 30.0, *tech));
        }
        repo
    }

    fn ids(list: &[&str]) -> Vec<SiteId> {
        list.iter().map(|s| SiteId::from(*s)).collect()
    }

    fn me() -> OwnerId {
        OwnerId::from("me")
    }

    #[test]
    fn test_single_candidate_gets_pool_value_and_carrier() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0, Technology::TwoG)]);
        let report = RadioPlanner::new(&geo)
            .assign(&mut repo, &me(), &ids(&["a"]), ValueDomain::TwoGChannel)
            .unwrap();

        assert!(!report.skipped);
        assert_eq!(report.seed, 42);
        assert_eq!(report.committed.len(), 1);
        let site = repo.get_site(&SiteKey::new("me", "a")).unwrap();
        let channel = site.channel.clone().unwrap();
        assert!(ValueDomain::TwoGChannel.pool().contains(&channel));
        let ch: f64 = channel.parse().unwrap();
        assert_eq!(site.ul_frequency_mhz, Some(890.0 + 0.2 * ch));
        assert_eq!(site.dl_frequency_mhz, Some(890.0 + 0.2 * ch + 45.0));
    }

    #[test]
    fn test_other_technology_is_skipped() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0, Technology::FourG)]);
        let report = RadioPlanner::new(&geo)
            .assign(&mut repo, &me(), &ids(&["a"]), ValueDomain::TwoGCellId)
            .unwrap();
        assert!(report.skipped);
        assert!(report.committed.is_empty());
        assert_eq!(repo.get_site(&SiteKey::new("me", "a")).unwrap().cell_id, None);
    }

    #[test]
    fn test_lte_cell_commits_fixed_channel() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0, Technology::FourG)]);
        RadioPlanner::new(&geo)
            .assign(&mut repo, &me(), &ids(&["a"]), ValueDomain::FourGCellId)
            .unwrap();
        let site = repo.get_site(&SiteKey::new("me", "a")).unwrap();
        assert!(site.cell_id.is_some());
        assert_eq!(site.channel.as_deref(), Some("3450"));
        assert_eq!(site.dl_frequency_mhz, Some(925.0));
        assert_eq!(site.ul_frequency_mhz, Some(880.0));
    }

    #[test]
    fn test_valued_sites_are_kept_and_constrain() {
        let geo = geo();
        let mut repo = repo_with(&[
            ("me", "a", 0.0, 0.0, Technology::TwoG),
            ("me", "b", 0.01, 0.0, Technology::TwoG),
            ("them", "far", 5.0, 5.0, Technology::TwoG),
        ]);
        repo.update_site_assignment(&SiteKey::new("me", "b"), RadioField::CellId, Some("0".into()))
            .unwrap();
        repo.update_site_assignment(&SiteKey::new("them", "far"), RadioField::CellId, Some("1".into()))
            .unwrap();

        let report = RadioPlanner::new(&geo)
            .assign(&mut repo, &me(), &ids(&["a", "b"]), ValueDomain::TwoGCellId)
            .unwrap();

        // b keeps its value and is a neighbor of a; far is out of range.
        assert_eq!(report.candidates, 1);
        assert_eq!(report.context, 1);
        assert_eq!(report.conflicts, 0);
        let b = repo.get_site(&SiteKey::new("me", "b")).unwrap();
        assert_eq!(b.cell_id.as_deref(), Some("0"));
        let a = repo.get_site(&SiteKey::new("me", "a")).unwrap();
        assert_ne!(a.cell_id.as_deref(), Some("0"));
    }

    #[test]
    fn test_reassign_existing_replans_selection() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0, Technology::TwoG)]);
        repo.update_site_assignment(&SiteKey::new("me", "a"), RadioField::CellId, Some("77".into()))
            .unwrap();
        let mut settings = repo.get_settings(&me()).unwrap();
        settings.radio_plan.reassign_existing = true;
        repo.insert_settings(me(), settings);

        let report = RadioPlanner::new(&geo)
            .assign(&mut repo, &me(), &ids(&["a"]), ValueDomain::TwoGCellId)
            .unwrap();
        assert_eq!(report.candidates, 1);
        assert_eq!(report.context, 0);
    }

    #[test]
    fn test_seed_override_and_determinism() {
        let geo = geo();
        let sites: Vec<(&str, &str, f64, f64, Technology)> = (0..6)
            .map(|i| {
                let id: &'static str = ["s0", "s1", "s2", "s3", "s4", "s5"][i];
                ("me", id, (i % 3) as f64 * 0.01, (i / 3) as f64 * 0.013 + i as f64 * 0.001, Technology::TwoG)
            })
            .collect();
        let selection = ids(&["s0", "s1", "s2", "s3", "s4", "s5"]);

        let run = |seed| {
            let mut repo = repo_with(&sites);
            let report = RadioPlanner::new(&geo)
                .with_seed(Some(seed))
                .assign(&mut repo, &me(), &selection, ValueDomain::TwoGChannel)
                .unwrap();
            (report.seed, report.committed)
        };
        let (seed, first) = run(5);
        assert_eq!(seed, 5);
        assert_eq!(first, run(5).1);
    }

    #[test]
    fn test_input_errors() {
        let geo = geo();
        let mut repo = repo_with(&[("me", "a", 0.0, 0.0, Technology::TwoG)]);
        let planner = RadioPlanner::new(&geo);
        assert!(matches!(
            planner.assign(&mut repo, &me(), &[], ValueDomain::TwoGChannel),
            Err(RadioError::InvalidInput(_))
        ));
        assert!(matches!(
            planner.assign(&mut repo, &OwnerId::from("ghost"), &ids(&["a"]), ValueDomain::TwoGChannel),
            Err(RadioError::UnknownOwner(_))
        ));
        assert!(matches!(
            planner.assign(&mut repo, &me(), &ids(&["a", "zz"]), ValueDomain::TwoGChannel),
            Err(RadioError::UnknownSite { .. })
        ));
    }
}
