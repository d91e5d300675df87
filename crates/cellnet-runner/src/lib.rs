//! Planning orchestrator for cellnet.
//!
//! Loads a scenario (owners, settings, sites, links and terrain) into an
//! in-memory repository, runs the link pipeline (topology synthesis followed
//! by clearance adjustment), the radio pipeline (channel and cell identity
//! assignment) or both, and writes the resulting network with a run report.
//!
//! ```
//! use cellnet_geo::{FlatTerrain, SphericalGeodesy};
//! use cellnet_model::{OwnerId, SiteId};
//! use cellnet_runner::{PlanScenario, Planner};
//!
//! let yaml = r#"
//! owners:
//!   - { id: acme, name: Acme, email: noc@acme.example }
//! sites:
//!   - { owner: acme, id: a, position: { lon: 0.0, lat: 0.0 }, height_m: 30.0, technology: 2G }
//!   - { owner: acme, id: b, position: { lon: 0.01, lat: 0.0 }, height_m: 30.0, technology: 2G }
//! "#;
//! let (mut repo, _) = PlanScenario::from_yaml_str(yaml)?.into_parts()?;
//! let geo = SphericalGeodesy::new(FlatTerrain::new(0.0));
//! let sites = [SiteId::from("a"), SiteId::from("b")];
//! let report = Planner::new(&geo).plan_links(&mut repo, &OwnerId::from("acme"), &sites)?;
//! assert_eq!(report.synthesis.backbone_link_ids.len(), 1);
//! # Ok::<(), cellnet_runner::RunnerError>(())
//! ```

mod app;
mod error;
mod output;
mod planner;
mod scenario;

pub use app::{execute, Pipeline, RunOutput, RunRequest};
pub use error::RunnerError;
pub use output::{write_output, OutputFormat};
pub use planner::{LinkPlanReport, PlanOptions, PlanReport, Planner, RadioPlanReport};
pub use scenario::{PlanScenario, TerrainConfig};

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
