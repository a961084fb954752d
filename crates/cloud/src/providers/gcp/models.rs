//! GCP API response models.

use serde::Deserialize;

/// GKE cluster.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GkeCluster {
    /// Cluster name.
    pub name: String,
    /// Zone or region.
    #[serde(default)]
    pub location: Option<String>,
    /// Status (PROVISIONING, RUNNING, RECONCILING, STOPPING, ERROR).
    #[serde(default)]
    pub status: Option<String>,
    /// API server IP or host, without scheme.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Resource URL.
    #[serde(default)]
    pub self_link: Option<String>,
    /// Control plane credentials.
    #[serde(default)]
    pub master_auth: Option<MasterAuth>,
}

/// Control plane auth material.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterAuth {
    /// Base64 PEM of the cluster CA.
    #[serde(default)]
    pub cluster_ca_certificate: Option<String>,
}

/// List clusters response.
#[derive(Debug, Deserialize)]
pub struct ClusterListResponse {
    /// Clusters.
    #[serde(default)]
    pub clusters: Vec<GkeCluster>,
}

/// Resource Manager project.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    #[serde(default)]
    pub lifecycle_state: Option<String>,
}

/// List projects response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectListResponse {
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

/// Compute Engine zone.
#[derive(Debug, Clone, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
}

/// List zones response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneListResponse {
    #[serde(default)]
    pub items: Vec<Zone>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}
