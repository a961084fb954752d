//! Azure Kubernetes Service.
//!
//! One [`Aks`] source per subscription. A Resource Manager bearer token is
//! taken from `AZURE_ACCESS_TOKEN`, or requested from the Azure CLI.

mod client;
mod models;

pub use client::{Aks, ARM_BASE_URL};
pub use models::*;

use tracing::{error, warn};

use crate::providers::credentials::token_from_env_or_cli;
use crate::providers::ClusterSource;

/// Environment variable holding a pre-issued Resource Manager token.
pub const ACCESS_TOKEN_ENV: &str = "AZURE_ACCESS_TOKEN";

/// Resource Manager access token, from the environment or `az`.
///
/// # Errors
/// Returns an auth error when neither source yields a token.
pub async fn access_token() -> Result<String, crate::CloudProviderError> {
    token_from_env_or_cli(
        ACCESS_TOKEN_ENV,
        "az",
        &[
            "account",
            "get-access-token",
            "--resource",
            "https://management.azure.com/",
            "--query",
            "accessToken",
            "--output",
            "tsv",
        ],
    )
    .await
}

/// Build one source per subscription. Without a token no source is built.
pub async fn sources(subscriptions: &[String]) -> Vec<Box<dyn ClusterSource>> {
    if subscriptions.is_empty() {
        return Vec::new();
    }
    let token = match access_token().await {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Can't obtain an Azure access token");
            return Vec::new();
        }
    };

    let mut sources: Vec<Box<dyn ClusterSource>> = Vec::with_capacity(subscriptions.len());
    for subscription in subscriptions {
        match Aks::new(subscription.as_str(), token.as_str()) {
            Ok(aks) => sources.push(Box::new(aks)),
            Err(e) => warn!(subscription = %subscription, error = %e, "Failed to create Azure AKS client"),
        }
    }
    sources
}
