//! Resolution of the project/zone pairs to query.

use tracing::{debug, info, warn};

use super::models::{ProjectListResponse, ZoneListResponse};
use crate::providers::rest::ApiClient;

/// Resource Manager endpoint.
pub const RESOURCE_MANAGER_URL: &str = "https://cloudresourcemanager.googleapis.com/v1";

/// Compute Engine endpoint.
pub const COMPUTE_API_URL: &str = "https://compute.googleapis.com/compute/v1";

/// Zones tried for the default project when nothing else resolves.
pub const COMMON_ZONES: &[&str] = &[
    "us-central1-a",
    "us-central1-b",
    "us-central1-c",
    "us-east1-a",
    "us-east1-b",
    "us-east1-c",
    "us-west1-a",
    "us-west1-b",
    "us-west1-c",
    "europe-west1-a",
    "europe-west1-b",
    "europe-west1-c",
    "asia-east1-a",
    "asia-east1-b",
    "asia-east1-c",
];

/// One GKE query scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectZone {
    pub project_id: String,
    pub zone: String,
}

impl ProjectZone {
    pub fn new(project_id: impl Into<String>, zone: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            zone: zone.into(),
        }
    }
}

/// Cross product of `projects` and `zones`.
#[must_use]
pub fn cross(projects: &[String], zones: &[String]) -> Vec<ProjectZone> {
    projects
        .iter()
        .flat_map(|p| zones.iter().map(move |z| ProjectZone::new(p.as_str(), z.as_str())))
        .collect()
}

/// `default_project` paired with [`COMMON_ZONES`], or nothing.
#[must_use]
pub fn fallback_scopes(default_project: Option<&str>) -> Vec<ProjectZone> {
    match default_project.filter(|p| !p.is_empty()) {
        Some(project) => COMMON_ZONES
            .iter()
            .map(|zone| ProjectZone::new(project, *zone))
            .collect(),
        None => Vec::new(),
    }
}

/// Discovers projects and zones the caller didn't name.
pub struct ScopeResolver {
    api: ApiClient,
    resource_manager_url: String,
    compute_url: String,
}

impl ScopeResolver {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            resource_manager_url: RESOURCE_MANAGER_URL.to_string(),
            compute_url: COMPUTE_API_URL.to_string(),
        }
    }

    /// Point both discovery APIs at `base_url`.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.resource_manager_url = base.to_string();
        self.compute_url = base.to_string();
        self
    }

    /// Resolve the scopes to query.
    ///
    /// Explicit projects and zones are used as given. Missing projects
    /// come from `default_project`, then from the Resource Manager.
    /// Missing zones come from Compute Engine per project. If nothing
    /// resolves, `default_project` is paired with [`COMMON_ZONES`].
    pub async fn resolve(
        &self,
        projects: &[String],
        zones: &[String],
        default_project: Option<&str>,
    ) -> Vec<ProjectZone> {
        let projects = if !projects.is_empty() {
            projects.to_vec()
        } else if let Some(project) = default_project.filter(|p| !p.is_empty()) {
            vec![project.to_string()]
        } else {
            self.active_projects().await
        };

        let mut scopes = Vec::new();
        for project in &projects {
            let project_zones = if zones.is_empty() {
                self.zones(project).await
            } else {
                zones.to_vec()
            };
            scopes.extend(cross(std::slice::from_ref(project), &project_zones));
        }

        if scopes.is_empty() {
            info!("No project/zone resolved, trying common zones of the default project");
            scopes = fallback_scopes(default_project);
        }
        debug!(count = scopes.len(), "Resolved GKE scopes");
        scopes
    }

    /// Every ACTIVE project visible to the token.
    async fn active_projects(&self) -> Vec<String> {
        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = format!("{}/projects", self.resource_manager_url);
            let query: Vec<(&str, &str)> = page_token
                .as_deref()
                .map(|token| vec![("pageToken", token)])
                .unwrap_or_default();
            let page: ProjectListResponse = match self.api.get_with_query(&url, &query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(error = %e, "Can't list projects");
                    break;
                }
            };
            projects.extend(
                page.projects
                    .into_iter()
                    .filter(|p| p.lifecycle_state.as_deref().unwrap_or("ACTIVE") == "ACTIVE")
                    .map(|p| p.project_id),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        projects
    }

    /// Every zone of `project` that is UP.
    async fn zones(&self, project: &str) -> Vec<String> {
        let mut zones = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let url = format!("{}/projects/{project}/zones", self.compute_url);
            let query: Vec<(&str, &str)> = page_token
                .as_deref()
                .map(|token| vec![("pageToken", token)])
                .unwrap_or_default();
            let page: ZoneListResponse = match self.api.get_with_query(&url, &query).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(project = %project, error = %e, "Can't list zones");
                    break;
                }
            };
            zones.extend(
                page.items
                    .into_iter()
                    .filter(|z| z.status.as_deref().unwrap_or("UP") == "UP")
                    .map(|z| z.name),
            );
            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }
        zones
    }
}
