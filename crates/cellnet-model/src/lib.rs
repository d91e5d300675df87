//! # cellnet-model
//!
//! The logical entities shared by the cellnet planners and the repository
//! interface through which they are read and written.
//!
//! ## Entities
//!
//! - [`Site`] - a positioned radio site owned by an [`Owner`]
//! - [`Link`] - a private or public microwave link between two sites
//! - [`Settings`] - per-owner planning configuration
//!
//! ## Repository
//!
//! Planners never hold entities across runs. They pull what they need through
//! the [`Repository`] trait at the start of a run and write results back as
//! they go. [`InMemoryRepository`] is the reference implementation and can be
//! loaded from a YAML [`Scenario`]:
//!
//! ```
//! use cellnet_model::{OwnerId, Repository, Scenario, SiteId};
//!
//! let yaml = r#"
//! owners:
//!   - id: acme
//!     name: Acme
//!     email: noc@acme.example
//! sites:
//!   - owner: acme
//!     id: s1
//!     position: { lon: 10.0, lat: 50.0 }
//!     height_m: 30.0
//!     technology: 2G
//! "#;
//!
//! let scenario = Scenario::from_yaml_str(yaml)?;
//! let repo = scenario.into_repository()?;
//! let owner = OwnerId::from("acme");
//! assert_eq!(repo.get_sites(&owner, &[SiteId::from("s1")])?.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod ids;
mod link;
mod repository;
mod scenario;
mod settings;
mod site;

pub use error::{ModelError, RepositoryError};
pub use ids::{LinkId, OwnerId, SiteId, SiteKey};
pub use link::{ForeignContact, Link, LinkEnd, LinkType};
pub use repository::{InMemoryRepository, Repository};
pub use scenario::Scenario;
pub use settings::{
    ClearanceSettings, CostModel, MicrowaveSettings, RadioPlanSettings, SearchSettings, Settings,
};
pub use site::{AntennaParams, Owner, RadioField, Site, Technology};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;
