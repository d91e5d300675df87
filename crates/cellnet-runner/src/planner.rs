//! Planning orchestration over a repository.

use crate::Result;
use cellnet_geo::Geodesy;
use cellnet_link::{adjust_links, AdjustmentReport, SynthesisResult, TopologySynthesizer};
use cellnet_metrics::{metric_defs, metrics, PlanLabels};
use cellnet_model::{OwnerId, Repository, SiteId};
use cellnet_radio::{DomainReport, RadioPlanner, ValueDomain};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Result of the link pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LinkPlanReport {
    /// Links created and deleted.
    pub synthesis: SynthesisResult,
    /// Height changes made to clear the created links.
    pub adjustment: AdjustmentReport,
}

/// Result of the radio pipeline, one entry per domain in run order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RadioPlanReport {
    pub domains: Vec<DomainReport>,
}

/// Result of [`Planner::plan`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<LinkPlanReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radio: Option<RadioPlanReport>,
}

/// Radio options for a full plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanOptions {
    /// Domains to assign. Empty means all of them.
    pub domains: Vec<ValueDomain>,
    /// Overrides the owner's configured seed.
    pub seed: Option<u64>,
}

/// Runs the link and radio pipelines for one owner's site selection.
#[derive(Debug, Clone, Copy)]
pub struct Planner<'g, G: ?Sized> {
    geo: &'g G,
}

impl<'g, G: Geodesy + ?Sized> Planner<'g, G> {
    pub fn new(geo: &'g G) -> Self {
        Self { geo }
    }

    /// Synthesize links for `sites`, then raise heights until every created
    /// link clears its Fresnel zone.
    pub fn plan_links<R: Repository>(
        &self,
        repo: &mut R,
        owner: &OwnerId,
        sites: &[SiteId],
    ) -> Result<LinkPlanReport> {
        let started = Instant::now();

        let synthesis = TopologySynthesizer::new(self.geo).synthesize(repo, owner, sites)?;
        let adjustment = adjust_links(repo, owner, &synthesis.created_link_ids)?;

        record_duration(owner, "links", started);
        info!(
            owner = %owner,
            created = synthesis.created_link_ids.len(),
            deleted = synthesis.deleted_link_ids.len(),
            raised_private = adjustment.modified.private_site_ids.len(),
            raised_public = adjustment.modified.public_site_ids.len(),
            "Link plan complete"
        );
        Ok(LinkPlanReport {
            synthesis,
            adjustment,
        })
    }

    /// Assign `domains` to `sites`. An empty list runs every domain in the
    /// order of [`ValueDomain::ALL`]; repeated domains run once.
    pub fn plan_radio<R: Repository>(
        &self,
        repo: &mut R,
        owner: &OwnerId,
        sites: &[SiteId],
        domains: &[ValueDomain],
        seed: Option<u64>,
    ) -> Result<RadioPlanReport> {
        let started = Instant::now();
        let planner = RadioPlanner::new(self.geo).with_seed(seed);

        let mut report = RadioPlanReport::default();
        for domain in run_order(domains) {
            report
                .domains
                .push(planner.assign(repo, owner, sites, domain)?);
        }

        record_duration(owner, "radio", started);
        info!(
            owner = %owner,
            domains = report.domains.len(),
            committed = report.domains.iter().map(|d| d.committed.len()).sum::<usize>(),
            "Radio plan complete"
        );
        Ok(report)
    }

    /// Run the link pipeline, then the radio pipeline.
    pub fn plan<R: Repository>(
        &self,
        repo: &mut R,
        owner: &OwnerId,
        sites: &[SiteId],
        options: &PlanOptions,
    ) -> Result<PlanReport> {
        let started = Instant::now();
        let links = self.plan_links(repo, owner, sites)?;
        let radio = self.plan_radio(repo, owner, sites, &options.domains, options.seed)?;
        record_duration(owner, "plan", started);
        Ok(PlanReport {
            links: Some(links),
            radio: Some(radio),
        })
    }
}

fn run_order(domains: &[ValueDomain]) -> Vec<ValueDomain> {
    if domains.is_empty() {
        return ValueDomain::ALL.to_vec();
    }
    let mut order = Vec::with_capacity(domains.len());
    for &domain in domains {
        if !order.contains(&domain) {
            order.push(domain);
        }
    }
    order
}

fn record_duration(owner: &OwnerId, pipeline: &'static str, started: Instant) {
    let labels = PlanLabels::new(owner.as_str()).with_pipeline(pipeline);
    metrics::histogram!(metric_defs::RUN_DURATION.name, &labels.to_labels())
        .record(started.elapsed().as_secs_f64() * 1000.0);
}
