//! Error types for link planning.

use cellnet_geo::GeoError;
use cellnet_model::{OwnerId, RepositoryError, SiteId};
use thiserror::Error;

/// Errors that can occur during topology synthesis or clearance adjustment.
#[derive(Debug, Error)]
pub enum LinkError {
    /// The request itself is unusable (e.g. an empty selection).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The owner does not exist.
    #[error("Unknown owner: {0}")]
    UnknownOwner(OwnerId),

    /// A selected site does not belong to the owner.
    #[error("Unknown site {site} for owner {owner}")]
    UnknownSite {
        /// Owner being planned.
        owner: OwnerId,
        /// The missing site.
        site: SiteId,
    },

    /// Repository read or write failed.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Terrain sampling failed.
    #[error("Geodesy error: {0}")]
    Geo(#[from] GeoError),
}
