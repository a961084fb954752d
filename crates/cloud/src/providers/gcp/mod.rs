//! Google Kubernetes Engine.
//!
//! One [`Gke`] source per project/zone pair. A bearer token is taken from
//! `GOOGLE_OAUTH_ACCESS_TOKEN`, or requested from `gcloud`.

mod client;
mod models;
pub mod scopes;

pub use client::{Gke, CONTAINER_API_URL};
pub use models::*;
pub use scopes::{ProjectZone, ScopeResolver};

use tracing::{error, warn};

use crate::providers::credentials::token_from_env_or_cli;
use crate::providers::rest::ApiClient;
use crate::providers::{CloudProviderError, ClusterSource};

/// Environment variable holding a pre-issued OAuth access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Environment variable naming the default project.
pub const DEFAULT_PROJECT_ENV: &str = "GOOGLE_CLOUD_PROJECT";

/// OAuth access token, from the environment or `gcloud`.
///
/// # Errors
/// Returns an auth error when neither source yields a token.
pub async fn access_token() -> Result<String, CloudProviderError> {
    token_from_env_or_cli(ACCESS_TOKEN_ENV, "gcloud", &["auth", "print-access-token"]).await
}

/// Resolve scopes and build one source per project/zone pair.
pub async fn sources(
    projects: &[String],
    zones: &[String],
    default_project: Option<&str>,
) -> Vec<Box<dyn ClusterSource>> {
    let token = match access_token().await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Can't obtain a Google access token");
            return Vec::new();
        }
    };
    let api = match ApiClient::new(token) {
        Ok(api) => api,
        Err(e) => {
            warn!(error = %e, "Failed to create GKE client");
            return Vec::new();
        }
    };

    ScopeResolver::new(api.clone())
        .resolve(projects, zones, default_project)
        .await
        .into_iter()
        .map(|scope| {
            Box::new(Gke::with_client(api.clone(), scope.project_id, scope.zone))
                as Box<dyn ClusterSource>
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[tokio::test]
    #[serial]
    async fn test_explicit_scopes_need_no_discovery() {
        std::env::set_var(ACCESS_TOKEN_ENV, "oauth-token");
        let projects = vec!["alpha".to_string(), "beta".to_string()];
        let zones = vec!["europe-west1-b".to_string()];
        let built = sources(&projects, &zones, None).await;
        std::env::remove_var(ACCESS_TOKEN_ENV);

        let scopes: Vec<String> = built.iter().map(|s| s.scope()).collect();
        assert_eq!(
            scopes,
            [
                "GKE project alpha zone europe-west1-b",
                "GKE project beta zone europe-west1-b",
            ]
        );
    }
}
