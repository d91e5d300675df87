//! Error types for radio planning.

use cellnet_model::{OwnerId, RepositoryError, SiteId};
use thiserror::Error;

/// Errors that can occur while building neighbor graphs or assigning values.
#[derive(Debug, Error)]
pub enum RadioError {
    /// The request itself is unusable.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A value domain name could not be parsed.
    #[error("Unknown value domain: {0}")]
    UnknownDomain(String),

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
}
