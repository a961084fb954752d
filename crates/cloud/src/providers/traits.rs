//! Cluster source trait and common provider errors.

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::cluster::Cluster;

/// Errors that can occur while talking to a cloud provider.
#[derive(Error, Debug)]
pub enum CloudProviderError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Kubeconfig document could not be parsed.
    #[error("Kubeconfig parse error: {0}")]
    Kubeconfig(#[from] serde_yaml::Error),

    /// Base64 payload could not be decoded.
    #[error("Decode error: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Authentication error.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A field needed to build a cluster record is absent.
    #[error("Cluster {cluster} has no {field}")]
    MissingField {
        cluster: String,
        field: &'static str,
    },

    /// AWS SDK call failed.
    #[error("AWS SDK error: {0}")]
    Sdk(String),
}

/// Something that enumerates the clusters of one scope (an AWS region, an
/// Azure subscription, a GCP project/zone pair, a DigitalOcean region).
///
/// Implementations send each cluster into `sink` and return when the scope
/// is exhausted or has failed. Failures are logged, never returned: one bad
/// scope must not stop the others. Dropping `sink` marks the scope as done.
#[async_trait]
pub trait ClusterSource: Send + Sync {
    /// Human readable description of the scope, used in logs.
    fn scope(&self) -> String;

    /// Stream every cluster of the scope into `sink`.
    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>);
}
