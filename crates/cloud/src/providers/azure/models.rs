//! Azure Resource Manager response models.

use serde::Deserialize;

/// AKS managed cluster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AksCluster {
    /// Resource ID.
    pub id: String,
    /// Cluster name.
    pub name: String,
    /// Location.
    pub location: String,
    /// Cluster properties.
    #[serde(default)]
    pub properties: AksClusterProperties,
}

/// AKS cluster properties.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AksClusterProperties {
    /// Provisioning state.
    #[serde(default)]
    pub provisioning_state: Option<String>,
    /// Kubernetes version.
    #[serde(default)]
    pub kubernetes_version: Option<String>,
    /// Public API server FQDN.
    #[serde(default)]
    pub fqdn: Option<String>,
    /// Private API server FQDN.
    #[serde(default)]
    pub private_fqdn: Option<String>,
}

impl AksCluster {
    /// API server host, public FQDN first.
    #[must_use]
    pub fn api_server_host(&self) -> Option<&str> {
        [&self.properties.fqdn, &self.properties.private_fqdn]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|host| !host.is_empty())
    }
}

/// List managed clusters response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AksClusterListResponse {
    /// Clusters.
    #[serde(default)]
    pub value: Vec<AksCluster>,
    /// Absolute URL of the next page.
    #[serde(default)]
    pub next_link: Option<String>,
}

/// `listClusterAdminCredential` / `listClusterUserCredential` response.
#[derive(Debug, Deserialize)]
pub struct CredentialResults {
    #[serde(default)]
    pub kubeconfigs: Vec<CredentialResult>,
}

/// One kubeconfig document, base64 encoded.
#[derive(Debug, Deserialize)]
pub struct CredentialResult {
    pub name: String,
    pub value: String,
}
