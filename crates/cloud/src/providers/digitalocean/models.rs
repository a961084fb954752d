//! `DigitalOcean` API response models.

use serde::Deserialize;

/// DOKS cluster.
#[derive(Debug, Clone, Deserialize)]
pub struct DoksCluster {
    /// Cluster UUID.
    pub id: String,
    /// Cluster name.
    pub name: String,
    /// Region slug.
    pub region: String,
    /// API server URL.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Lifecycle status.
    #[serde(default)]
    pub status: Option<DoksStatus>,
}

/// Cluster status.
#[derive(Debug, Clone, Deserialize)]
pub struct DoksStatus {
    /// State: "running", "provisioning", "degraded", "error", ...
    pub state: String,
    /// Human readable detail.
    #[serde(default)]
    pub message: Option<String>,
}

/// Cluster list response.
#[derive(Debug, Deserialize)]
pub struct ClusterListResponse {
    /// Clusters.
    #[serde(default)]
    pub kubernetes_clusters: Vec<DoksCluster>,
    /// Links for pagination.
    pub links: Option<Links>,
}

/// Pagination links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Pages.
    pub pages: Option<Pages>,
}

/// Page links.
#[derive(Debug, Clone, Deserialize)]
pub struct Pages {
    /// Next page.
    pub next: Option<String>,
}

impl ClusterListResponse {
    /// URL of the next page, if any.
    #[must_use]
    pub fn next_page(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|links| links.pages.as_ref())
            .and_then(|pages| pages.next.as_deref())
            .filter(|next| !next.is_empty())
    }
}
