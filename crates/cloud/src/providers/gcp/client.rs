//! GKE cluster source for one project/zone pair.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::models::{ClusterListResponse, GkeCluster};
use crate::cluster::{Cluster, Provider};
use crate::providers::credentials::decode_base64;
use crate::providers::rest::ApiClient;
use crate::providers::{CloudProviderError, ClusterSource};

/// GKE API endpoint.
pub const CONTAINER_API_URL: &str = "https://container.googleapis.com/v1";

/// GKE clusters of one project in one location.
#[derive(Clone)]
pub struct Gke {
    /// HTTP client.
    api: ApiClient,
    /// Container API base URL.
    base_url: String,
    /// Project ID.
    project_id: String,
    /// Zone or region.
    zone: String,
}

impl Gke {
    /// Create a source for `project_id` in `zone`.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(
        project_id: impl Into<String>,
        zone: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CloudProviderError> {
        Ok(Self::with_client(
            ApiClient::new(access_token)?,
            project_id,
            zone,
        ))
    }

    /// Create a source sharing an existing client.
    pub fn with_client(
        api: ApiClient,
        project_id: impl Into<String>,
        zone: impl Into<String>,
    ) -> Self {
        Self {
            api,
            base_url: CONTAINER_API_URL.to_string(),
            project_id: project_id.into(),
            zone: zone.into(),
        }
    }

    /// Point at a different Container API endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn clusters_url(&self) -> String {
        format!(
            "{}/projects/{}/locations/{}/clusters",
            self.base_url, self.project_id, self.zone
        )
    }

    /// Convert a GKE cluster to our type.
    fn to_cluster(&self, gke: &GkeCluster) -> Result<Cluster, CloudProviderError> {
        let missing = |field| CloudProviderError::MissingField {
            cluster: gke.name.clone(),
            field,
        };
        let ca = gke
            .master_auth
            .as_ref()
            .and_then(|auth| auth.cluster_ca_certificate.as_deref())
            .filter(|ca| !ca.is_empty())
            .ok_or_else(|| missing("cluster CA certificate"))?;
        let endpoint = gke
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .ok_or_else(|| missing("endpoint"))?;

        Ok(Cluster {
            provider: Provider::Google,
            name: gke.name.clone(),
            region: self.zone.clone(),
            id: gke.self_link.clone().unwrap_or_else(|| {
                format!(
                    "projects/{}/locations/{}/clusters/{}",
                    self.project_id, self.zone, gke.name
                )
            }),
            endpoint: format!("https://{endpoint}"),
            certificate_authority_data: decode_base64(ca)?,
            status: gke.status.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ClusterSource for Gke {
    fn scope(&self) -> String {
        format!("GKE project {} zone {}", self.project_id, self.zone)
    }

    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>) {
        let response: ClusterListResponse = match self.api.get(&self.clusters_url()).await {
            Ok(response) => response,
            Err(e) => {
                warn!(project = %self.project_id, zone = %self.zone, error = %e, "Can't list clusters");
                return;
            }
        };
        debug!(project = %self.project_id, zone = %self.zone, count = response.clusters.len(), "Parse page");

        for gke in &response.clusters {
            match self.to_cluster(gke) {
                Ok(cluster) => {
                    if sink.send(cluster).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    warn!(project = %self.project_id, zone = %self.zone, cluster = %gke.name, error = %e, "Can't get details on the cluster");
                }
            }
        }
    }
}
