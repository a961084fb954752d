//! Kubeconfig file store.
//!
//! Entries written here are keyed by [`Cluster::unique_id`], so running an
//! update twice replaces entries instead of duplicating them. Keys this
//! model doesn't know about are carried through unchanged.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use kubescout_cloud::{Cluster, ExecConfig};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use tracing::{debug, info};

/// Extension appended to the kubeconfig path for backups.
const BACKUP_SUFFIX: &str = ".bak";

/// Get the default kubeconfig path (~/.kube/config).
#[must_use]
pub fn default_kubeconfig_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(".kube")
        .join("config")
}

fn nullable_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A kubeconfig document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kubeconfig {
    #[serde(rename = "apiVersion", default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub clusters: Vec<NamedCluster>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub users: Vec<NamedUser>,
    #[serde(default, deserialize_with = "nullable_vec")]
    pub contexts: Vec<NamedContext>,
    #[serde(
        rename = "current-context",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub current_context: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Named cluster entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: ClusterEntry,
}

/// Cluster connection details.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    #[serde(default)]
    pub server: String,
    #[serde(
        rename = "certificate-authority-data",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub certificate_authority_data: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Named user entry. The user body is kept as raw YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedUser {
    pub name: String,
    #[serde(default)]
    pub user: BTreeMap<String, Value>,
}

/// Named context entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedContext {
    pub name: String,
    pub context: ContextEntry,
}

/// Context binding a cluster to a user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContextEntry {
    #[serde(default)]
    pub cluster: String,
    #[serde(default)]
    pub user: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

trait Named {
    fn name(&self) -> &str;
}

impl Named for NamedCluster {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedUser {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for NamedContext {
    fn name(&self) -> &str {
        &self.name
    }
}

fn upsert<T: Named>(entries: &mut Vec<T>, entry: T) {
    match entries.iter_mut().find(|e| e.name() == entry.name()) {
        Some(existing) => *existing = entry,
        None => entries.push(entry),
    }
}

impl Kubeconfig {
    /// An empty `v1` config.
    #[must_use]
    pub fn new() -> Self {
        let mut extra = BTreeMap::new();
        extra.insert(
            "preferences".to_string(),
            Value::Mapping(serde_yaml::Mapping::new()),
        );
        Self {
            api_version: Some("v1".to_string()),
            kind: Some("Config".to_string()),
            extra,
            ..Self::default()
        }
    }

    /// Load `path`. A missing or empty file yields an empty config.
    ///
    /// # Errors
    /// Returns an error if the file can't be read or isn't valid YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No kubeconfig yet");
                return Ok(Self::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        if content.trim().is_empty() {
            return Ok(Self::new());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse kubeconfig {}", path.display()))
    }

    /// Insert or replace the cluster, user and context entries of `cluster`.
    ///
    /// Cluster and user are keyed by the cluster's unique id, the context
    /// by `context_name`. Without `exec` the user entry is left empty.
    ///
    /// # Errors
    /// Returns an error if the exec stanza can't be serialized.
    pub fn add_cluster(
        &mut self,
        cluster: &Cluster,
        exec: Option<ExecConfig>,
        context_name: &str,
    ) -> Result<()> {
        let key = cluster.unique_id();

        upsert(
            &mut self.clusters,
            NamedCluster {
                name: key.clone(),
                cluster: ClusterEntry {
                    server: cluster.endpoint.clone(),
                    certificate_authority_data: Some(
                        STANDARD.encode(&cluster.certificate_authority_data),
                    ),
                    extra: BTreeMap::new(),
                },
            },
        );

        let mut user = BTreeMap::new();
        if let Some(exec) = exec {
            user.insert(
                "exec".to_string(),
                serde_yaml::to_value(exec).context("Failed to serialize exec config")?,
            );
        }
        upsert(
            &mut self.users,
            NamedUser {
                name: key.clone(),
                user,
            },
        );

        upsert(
            &mut self.contexts,
            NamedContext {
                name: context_name.to_string(),
                context: ContextEntry {
                    cluster: key.clone(),
                    user: key,
                    extra: BTreeMap::new(),
                },
            },
        );
        Ok(())
    }

    /// Whether some context points at a cluster whose server is `endpoint`.
    #[must_use]
    pub fn is_exported(&self, endpoint: &str) -> bool {
        self.contexts.iter().any(|ctx| {
            self.clusters
                .iter()
                .any(|c| c.name == ctx.context.cluster && c.cluster.server == endpoint)
        })
    }

    /// Name of the first context pointing at `endpoint`.
    #[must_use]
    pub fn context_for(&self, endpoint: &str) -> Option<&str> {
        self.contexts
            .iter()
            .find(|ctx| {
                self.clusters
                    .iter()
                    .any(|c| c.name == ctx.context.cluster && c.cluster.server == endpoint)
            })
            .map(|ctx| ctx.name.as_str())
    }

    /// Write to `path` with owner-only permissions, creating parent
    /// directories as needed.
    ///
    /// # Errors
    /// Returns an error if the directory or file can't be written.
    pub fn persist(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let content = serde_yaml::to_string(self).context("Failed to serialize kubeconfig")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        restrict_permissions(path)?;
        info!(path = %path.display(), "Kubeconfig written");
        Ok(())
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("Failed to set permissions on {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// First of `path.bak`, `path.bak.bak`, ... that doesn't exist yet.
#[must_use]
pub fn backup_name(path: &Path) -> PathBuf {
    let mut candidate = path.as_os_str().to_owned();
    loop {
        candidate.push(BACKUP_SUFFIX);
        let candidate_path = PathBuf::from(&candidate);
        if !candidate_path.exists() {
            return candidate_path;
        }
    }
}

/// Copy `path` to a fresh backup file and return the backup's path.
///
/// # Errors
/// Returns an error if `path` isn't a regular file or the copy fails.
pub fn backup(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        bail!("{} is not a regular file", path.display());
    }
    let target = backup_name(path);
    std::fs::copy(path, &target).with_context(|| {
        format!(
            "Failed to back up {} to {}",
            path.display(),
            target.display()
        )
    })?;
    info!(source = %path.display(), backup = %target.display(), "Kubeconfig backed up");
    Ok(target)
}
