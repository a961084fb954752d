//! `DigitalOcean` Kubernetes (DOKS).
//!
//! One [`Doks`] source per region, authenticated with `DIGITALOCEAN_TOKEN`.

mod client;
mod models;
pub mod regions;

pub use client::{Doks, API_BASE_URL};
pub use models::*;

use tracing::warn;

use crate::providers::ClusterSource;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "DIGITALOCEAN_TOKEN";

/// Build one source per region. Unknown regions are queried anyway.
/// Regions whose client can't be built are logged and skipped.
pub fn sources(api_token: &str, regions: &[String]) -> Vec<Box<dyn ClusterSource>> {
    let mut sources: Vec<Box<dyn ClusterSource>> = Vec::with_capacity(regions.len());
    for region in regions {
        if !regions::is_known_region(region) {
            warn!(region = %region, "Unknown DigitalOcean region, querying it anyway");
        }
        match Doks::new(api_token, region.as_str()) {
            Ok(doks) => sources.push(Box::new(doks)),
            Err(e) => warn!(region = %region, error = %e, "Failed to create DigitalOcean client"),
        }
    }
    sources
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_per_region() {
        let regions = vec!["fra1".to_string(), "mars1".to_string()];
        let sources = sources("token", &regions);
        let scopes: Vec<String> = sources.iter().map(|s| s.scope()).collect();
        assert_eq!(scopes, ["DOKS region fra1", "DOKS region mars1"]);
    }

    #[test]
    fn test_no_sources_without_token() {
        let regions = vec!["fra1".to_string()];
        assert!(sources("", &regions).is_empty());
    }
}
