//! One planning run from scenario file to output document.

use crate::{write_output, PlanOptions, PlanReport, PlanScenario, Planner, Result};
use cellnet_geo::SphericalGeodesy;
use cellnet_model::{OwnerId, Scenario, SiteId};
use cellnet_radio::ValueDomain;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

/// Which pipelines a run executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pipeline {
    /// Topology synthesis and clearance adjustment.
    Links,
    /// Channel and cell identity assignment.
    Radio,
    /// Links, then radio.
    Plan,
}

impl Pipeline {
    pub const fn as_str(self) -> &'static str {
        match self {
            Pipeline::Links => "links",
            Pipeline::Radio => "radio",
            Pipeline::Plan => "plan",
        }
    }
}

/// Everything needed to execute a run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub scenario: PathBuf,
    pub owner: OwnerId,
    pub sites: Vec<SiteId>,
    pub pipeline: Pipeline,
    /// Radio domains; empty means all.
    pub domains: Vec<ValueDomain>,
    pub seed: Option<u64>,
    /// Destination file. `None` leaves writing to the caller.
    pub output: Option<PathBuf>,
}

/// The planned network plus what the run did.
///
/// The scenario fields sit at the top level, so an output document loads
/// back as a [`PlanScenario`] for a follow-up run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutput {
    pub generated_at: DateTime<Utc>,
    pub pipeline: Pipeline,
    pub owner: OwnerId,
    pub report: PlanReport,
    #[serde(flatten)]
    pub scenario: PlanScenario,
}

/// Load the scenario, run the requested pipeline and write the result to
/// `request.output` when one is given.
pub fn execute(request: &RunRequest) -> Result<RunOutput> {
    let scenario = PlanScenario::from_file(&request.scenario)?;
    info!(
        path = %request.scenario.display(),
        owners = scenario.network.owners.len(),
        sites = scenario.network.sites.len(),
        links = scenario.network.links.len(),
        "Loaded scenario"
    );

    let (mut repo, terrain) = scenario.into_parts()?;
    let geo = SphericalGeodesy::new(terrain);
    let planner = Planner::new(&geo);

    let report = match request.pipeline {
        Pipeline::Links => PlanReport {
            links: Some(planner.plan_links(&mut repo, &request.owner, &request.sites)?),
            radio: None,
        },
        Pipeline::Radio => PlanReport {
            links: None,
            radio: Some(planner.plan_radio(
                &mut repo,
                &request.owner,
                &request.sites,
                &request.domains,
                request.seed,
            )?),
        },
        Pipeline::Plan => planner.plan(
            &mut repo,
            &request.owner,
            &request.sites,
            &PlanOptions {
                domains: request.domains.clone(),
                seed: request.seed,
            },
        )?,
    };

    let output = RunOutput {
        generated_at: Utc::now(),
        pipeline: request.pipeline,
        owner: request.owner.clone(),
        report,
        scenario: PlanScenario {
            network: Scenario::from_repository(&repo),
            terrain: geo.terrain().clone(),
        },
    };

    if let Some(path) = &request.output {
        write_output(path, &output)?;
        info!(path = %path.display(), pipeline = request.pipeline.as_str(), "Wrote plan");
    }
    Ok(output)
}
