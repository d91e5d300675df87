//! Error types for the model crate.

use crate::{LinkId, OwnerId, SiteId};
use thiserror::Error;

/// Errors returned by a [`Repository`](crate::Repository).
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The owner does not exist.
    #[error("Unknown owner: {0}")]
    UnknownOwner(OwnerId),

    /// The site does not exist for this owner.
    #[error("Unknown site {site} for owner {owner}")]
    UnknownSite {
        /// Owner that was searched.
        owner: OwnerId,
        /// Site that was not found.
        site: SiteId,
    },

    /// The link does not exist for this owner.
    #[error("Unknown link {link} for owner {owner}")]
    UnknownLink {
        /// Owner that was searched.
        owner: OwnerId,
        /// Link that was not found.
        link: LinkId,
    },

    /// A storage backend failure.
    #[error("Repository backend error: {0}")]
    Backend(String),
}

/// Errors that can occur when loading or validating model data.
#[derive(Debug, Error)]
pub enum ModelError {
    /// I/O error reading or writing a scenario.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Repository rejected the data.
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A site references an owner that is not declared.
    #[error("Site {site} references undeclared owner {owner}")]
    UndeclaredOwner {
        /// The undeclared owner.
        owner: OwnerId,
        /// The site referencing it.
        site: SiteId,
    },

    /// Two entities share the same identity.
    #[error("Duplicate {kind}: {id}")]
    Duplicate {
        /// Entity kind ("owner", "site" or "link").
        kind: &'static str,
        /// The duplicated identity.
        id: String,
    },

    /// A settings value is out of range.
    #[error("Invalid settings for {owner}: {message}")]
    InvalidSettings {
        /// Owner whose settings are invalid.
        owner: OwnerId,
        /// What is wrong.
        message: String,
    },
}
