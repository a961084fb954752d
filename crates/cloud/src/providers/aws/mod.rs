//! Amazon EKS.
//!
//! One [`Eks`] source per region. Credentials come from the default AWS
//! provider chain (environment, shared profile, SSO, instance metadata).

mod client;
mod models;
pub mod regions;

pub use client::{Eks, EksApi, SdkEksApi};
pub use models::{to_cluster, ClusterPage};

use tracing::warn;

use crate::providers::ClusterSource;

/// Build one source per region. Regions whose client can't be built are
/// logged and skipped.
pub async fn sources(regions: &[String]) -> Vec<Box<dyn ClusterSource>> {
    let mut sources: Vec<Box<dyn ClusterSource>> = Vec::with_capacity(regions.len());
    for region in regions {
        match Eks::new(region.as_str()).await {
            Ok(eks) => sources.push(Box::new(eks)),
            Err(e) => warn!(region = %region, error = %e, "Failed to create EKS client"),
        }
    }
    sources
}
