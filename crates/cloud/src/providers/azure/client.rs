//! AKS cluster source for one subscription.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::models::{AksCluster, AksClusterListResponse, CredentialResults};
use crate::cluster::{Cluster, Provider};
use crate::providers::credentials::{ca_from_kubeconfig, decode_base64};
use crate::providers::rest::ApiClient;
use crate::providers::{CloudProviderError, ClusterSource};

/// Azure Resource Manager endpoint.
pub const ARM_BASE_URL: &str = "https://management.azure.com";

/// Azure API version for AKS.
const AKS_API_VERSION: &str = "2023-11-01";

/// AKS clusters of one subscription.
#[derive(Clone)]
pub struct Aks {
    /// HTTP client.
    api: ApiClient,
    /// Resource Manager base URL.
    base_url: String,
    /// Subscription ID.
    subscription_id: String,
}

impl Aks {
    /// Create a source for `subscription_id`.
    ///
    /// # Errors
    /// Returns error if HTTP client cannot be created.
    pub fn new(
        subscription_id: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Result<Self, CloudProviderError> {
        Ok(Self {
            api: ApiClient::new(access_token)?,
            base_url: ARM_BASE_URL.to_string(),
            subscription_id: subscription_id.into(),
        })
    }

    /// Point at a different Resource Manager endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn clusters_url(&self) -> String {
        format!(
            "{}/subscriptions/{}/providers/Microsoft.ContainerService/managedClusters?api-version={AKS_API_VERSION}",
            self.base_url, self.subscription_id
        )
    }

    fn credentials_url(&self, cluster_id: &str) -> String {
        format!(
            "{}{cluster_id}/listClusterAdminCredential?api-version={AKS_API_VERSION}",
            self.base_url
        )
    }

    /// Fetch admin credentials and build the cluster record.
    async fn describe(&self, aks: &AksCluster) -> Result<Cluster, CloudProviderError> {
        let host = aks
            .api_server_host()
            .ok_or_else(|| CloudProviderError::MissingField {
                cluster: aks.name.clone(),
                field: "fqdn",
            })?;

        let credentials: CredentialResults = self.api.post(&self.credentials_url(&aks.id)).await?;
        let kubeconfig = credentials
            .kubeconfigs
            .first()
            .ok_or_else(|| CloudProviderError::MissingField {
                cluster: aks.name.clone(),
                field: "kubeconfig",
            })?;
        debug!(cluster = %aks.name, kubeconfig = %kubeconfig.name, "Fetched credentials");

        let raw = String::from_utf8_lossy(&decode_base64(&kubeconfig.value)?).into_owned();
        let certificate_authority_data = ca_from_kubeconfig(&raw)?;

        Ok(Cluster {
            provider: Provider::Azure,
            name: aks.name.clone(),
            region: aks.location.clone(),
            id: aks.id.clone(),
            endpoint: format!("https://{host}"),
            certificate_authority_data,
            status: aks.properties.provisioning_state.clone().unwrap_or_default(),
        })
    }
}

#[async_trait]
impl ClusterSource for Aks {
    fn scope(&self) -> String {
        format!("AKS subscription {}", self.subscription_id)
    }

    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>) {
        let mut next = Some(self.clusters_url());
        while let Some(url) = next.take() {
            let page: AksClusterListResponse = match self.api.get(&url).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(subscription = %self.subscription_id, error = %e, "Can't list clusters");
                    return;
                }
            };
            debug!(subscription = %self.subscription_id, count = page.value.len(), "Parse page");

            for aks in &page.value {
                match self.describe(aks).await {
                    Ok(cluster) => {
                        if sink.send(cluster).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(subscription = %self.subscription_id, cluster = %aks.name, error = %e, "Can't get details on the cluster");
                    }
                }
            }

            next = page.next_link.filter(|link| !link.is_empty());
        }
    }
}

#[cfg(test)]
mod tests {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde_json::json;
    use wiremock::matchers::{bearer_token, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::aggregator::Aggregator;

    const SUBSCRIPTION: &str = "00000000-0000-0000-0000-000000000001";

    fn cluster_id(name: &str) -> String {
        format!(
            "/subscriptions/{SUBSCRIPTION}/resourceGroups/rg/providers/Microsoft.ContainerService/managedClusters/{name}"
        )
    }

    fn cluster_json(name: &str, fqdn: Option<&str>) -> serde_json::Value {
        json!({
            "id": cluster_id(name),
            "name": name,
            "location": "westeurope",
            "properties": {
                "provisioningState": "Succeeded",
                "kubernetesVersion": "1.29.2",
                "fqdn": fqdn,
            }
        })
    }

    fn credentials_json(ca_pem: &str) -> serde_json::Value {
        let kubeconfig = format!(
            "apiVersion: v1\nkind: Config\nclusters:\n- name: c\n  cluster:\n    server: https://x\n    certificate-authority-data: {}\n",
            STANDARD.encode(ca_pem)
        );
        json!({
            "kubeconfigs": [{ "name": "clusterAdmin", "value": STANDARD.encode(kubeconfig) }]
        })
    }

    async fn mount_credentials(server: &MockServer, name: &str, ca_pem: &str) {
        Mock::given(method("POST"))
            .and(path(format!("{}/listClusterAdminCredential", cluster_id(name))))
            .respond_with(ResponseTemplate::new(200).set_body_json(credentials_json(ca_pem)))
            .mount(server)
            .await;
    }

    async fn discover(aks: Aks) -> Vec<Cluster> {
        let source: Box<dyn ClusterSource> = Box::new(aks);
        let mut clusters = Aggregator::new(vec![source]).discover().await;
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        clusters
    }

    #[tokio::test]
    async fn test_lists_clusters_across_pages() {
        let server = MockServer::start().await;
        let list_path =
            format!("/subscriptions/{SUBSCRIPTION}/providers/Microsoft.ContainerService/managedClusters");

        Mock::given(method("GET"))
            .and(path(list_path.clone()))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [cluster_json("beta", Some("beta-dns.hcp.westeurope.azmk8s.io"))]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(list_path))
            .and(query_param("api-version", AKS_API_VERSION))
            .and(bearer_token("arm-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [cluster_json("alpha", Some("alpha-dns.hcp.westeurope.azmk8s.io"))],
                "nextLink": format!(
                    "{}/subscriptions/{SUBSCRIPTION}/providers/Microsoft.ContainerService/managedClusters?api-version={AKS_API_VERSION}&page=2",
                    server.uri()
                ),
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_credentials(&server, "alpha", "alpha-ca").await;
        mount_credentials(&server, "beta", "beta-ca").await;

        let aks = Aks::new(SUBSCRIPTION, "arm-token")
            .unwrap()
            .with_base_url(server.uri());
        let clusters = discover(aks).await;

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].name, "alpha");
        assert_eq!(clusters[0].provider, Provider::Azure);
        assert_eq!(clusters[0].region, "westeurope");
        assert_eq!(clusters[0].status, "Succeeded");
        assert_eq!(clusters[0].id, cluster_id("alpha"));
        assert_eq!(clusters[0].endpoint, "https://alpha-dns.hcp.westeurope.azmk8s.io");
        assert_eq!(clusters[0].certificate_authority_data, b"alpha-ca");
        assert_eq!(clusters[1].certificate_authority_data, b"beta-ca");
    }

    #[tokio::test]
    async fn test_cluster_without_fqdn_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/subscriptions/{SUBSCRIPTION}/providers/Microsoft.ContainerService/managedClusters"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [
                    cluster_json("hidden", None),
                    cluster_json("visible", Some("visible.azmk8s.io")),
                ]
            })))
            .mount(&server)
            .await;
        mount_credentials(&server, "visible", "pem").await;

        let aks = Aks::new(SUBSCRIPTION, "t").unwrap().with_base_url(server.uri());
        let clusters = discover(aks).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "visible");
    }

    #[tokio::test]
    async fn test_credential_failure_skips_cluster() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!(
                "/subscriptions/{SUBSCRIPTION}/providers/Microsoft.ContainerService/managedClusters"
            )))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "value": [cluster_json("locked", Some("locked.azmk8s.io"))]
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let aks = Aks::new(SUBSCRIPTION, "t").unwrap().with_base_url(server.uri());
        assert!(discover(aks).await.is_empty());
    }

    #[tokio::test]
    async fn test_listing_error_yields_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_string("expired token"))
            .mount(&server)
            .await;

        let aks = Aks::new(SUBSCRIPTION, "t").unwrap().with_base_url(server.uri());
        assert!(discover(aks).await.is_empty());
    }

    #[test]
    fn test_scope() {
        let aks = Aks::new(SUBSCRIPTION, "t").unwrap();
        assert_eq!(aks.scope(), format!("AKS subscription {SUBSCRIPTION}"));
    }
}
