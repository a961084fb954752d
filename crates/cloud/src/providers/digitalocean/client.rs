//! DOKS cluster source for one region.
//!
//! API Documentation: <https://docs.digitalocean.com/reference/api/>

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::models::{ClusterListResponse, DoksCluster};
use crate::cluster::{Cluster, Provider};
use crate::providers::credentials::ca_from_kubeconfig;
use crate::providers::rest::ApiClient;
use crate::providers::{CloudProviderError, ClusterSource};

/// Base URL for `DigitalOcean` API.
pub const API_BASE_URL: &str = "https://api.digitalocean.com/v2";

/// Page size for cluster listing.
const PER_PAGE: u32 = 200;

/// DOKS clusters of one region.
#[derive(Clone)]
pub struct Doks {
    /// HTTP client.
    api: ApiClient,
    /// API base URL.
    base_url: String,
    /// Region slug.
    region: String,
}

impl Doks {
    /// Create a source for `region`.
    ///
    /// # Errors
    /// Returns a configuration error for an empty token, or an HTTP error
    /// if the client cannot be created.
    pub fn new(
        api_token: impl Into<String>,
        region: impl Into<String>,
    ) -> Result<Self, CloudProviderError> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(CloudProviderError::Config(
                "DigitalOcean API token is empty".to_string(),
            ));
        }
        Ok(Self {
            api: ApiClient::new(api_token)?,
            base_url: API_BASE_URL.to_string(),
            region: region.into(),
        })
    }

    /// Point at a different API endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Fetch the cluster kubeconfig and build the cluster record.
    async fn describe(&self, doks: &DoksCluster) -> Result<Cluster, CloudProviderError> {
        let missing = |field| CloudProviderError::MissingField {
            cluster: doks.name.clone(),
            field,
        };
        let status = doks.status.as_ref().ok_or_else(|| missing("status"))?;
        let endpoint = doks
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| missing("endpoint"))?;

        let kubeconfig = self
            .api
            .get_text(&format!(
                "{}/kubernetes/clusters/{}/kubeconfig",
                self.base_url, doks.id
            ))
            .await?;

        Ok(Cluster {
            provider: Provider::DigitalOcean,
            name: doks.name.clone(),
            region: doks.region.clone(),
            id: doks.id.clone(),
            endpoint: endpoint.to_string(),
            certificate_authority_data: ca_from_kubeconfig(&kubeconfig)?,
            status: status.state.clone(),
        })
    }
}

#[async_trait]
impl ClusterSource for Doks {
    fn scope(&self) -> String {
        format!("DOKS region {}", self.region)
    }

    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>) {
        let mut next = Some(format!(
            "{}/kubernetes/clusters?per_page={PER_PAGE}",
            self.base_url
        ));
        while let Some(url) = next.take() {
            let page: ClusterListResponse = match self.api.get(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(region = %self.region, error = %e, "Can't list clusters");
                    return;
                }
            };
            debug!(region = %self.region, count = page.kubernetes_clusters.len(), "Parse page");

            for doks in page
                .kubernetes_clusters
                .iter()
                .filter(|c| c.region == self.region)
            {
                match self.describe(doks).await {
                    Ok(cluster) => {
                        if sink.send(cluster).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(region = %self.region, cluster = %doks.name, error = %e, "Can't get details on the cluster");
                    }
                }
            }

            next = page.next_page().map(str::to_string);
        }
    }
}
