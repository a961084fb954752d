//! Per-provider cluster sources.
//!
//! Each provider module exposes a [`ClusterSource`] implementation for one
//! scope and a `sources` helper that builds one per requested scope.

pub mod aws;
pub mod azure;
pub mod credentials;
pub mod digitalocean;
pub mod gcp;
pub mod rest;
mod traits;

pub use traits::{CloudProviderError, ClusterSource};

// Re-export provider sources
pub use aws::Eks;
pub use azure::Aks;
pub use digitalocean::Doks;
pub use gcp::Gke;
