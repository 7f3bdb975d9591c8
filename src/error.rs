//! Error types for the clustering engine.

use crate::cluster::ClusterId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClusterError>;

#[derive(Debug, Error)]
pub enum ClusterError {
    /// Rejected at construction time, never silently corrected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("no cluster with the specified id: {0}")]
    ClusterNotFound(ClusterId),

    /// A feature that cannot take part in clustering.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
