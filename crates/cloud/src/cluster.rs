//! Provider-agnostic description of a discovered managed cluster.

use std::fmt;

use handlebars::{no_escape, Handlebars, RenderError};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Template used for context names when the caller supplies none.
pub const DEFAULT_CONTEXT_TEMPLATE: &str = "{{name}}";

/// Cloud vendor that hosts a cluster.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// Unset.
    #[default]
    None,
    /// Amazon EKS.
    Aws,
    /// Google GKE.
    Google,
    /// Azure AKS.
    Azure,
    /// DigitalOcean Kubernetes.
    DigitalOcean,
}

impl Provider {
    /// Lowercase tag used in identifiers and templates.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Aws => "aws",
            Self::Google => "google",
            Self::Azure => "azure",
            Self::DigitalOcean => "digitalocean",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A managed Kubernetes cluster as reported by its provider.
///
/// Plain data: credential helpers are derived from [`Cluster::provider`]
/// when a kubeconfig entry is written, never stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Cluster {
    /// Hosting provider.
    pub provider: Provider,
    /// Provider-assigned display name.
    pub name: String,
    /// Region, zone or location.
    pub region: String,
    /// Provider-native identifier (ARN, resource id, self link, uuid).
    pub id: String,
    /// API server URL.
    pub endpoint: String,
    /// Decoded PEM bytes of the cluster CA. Empty when unavailable.
    pub certificate_authority_data: Vec<u8>,
    /// Provider-native lifecycle state.
    pub status: String,
}

#[derive(Serialize)]
struct TemplateFields<'a> {
    provider: &'static str,
    name: &'a str,
    region: &'a str,
    id: &'a str,
    endpoint: &'a str,
    status: &'a str,
}

impl<'a> From<&'a Cluster> for TemplateFields<'a> {
    fn from(cluster: &'a Cluster) -> Self {
        Self {
            provider: cluster.provider.as_str(),
            name: &cluster.name,
            region: &cluster.region,
            id: &cluster.id,
            endpoint: &cluster.endpoint,
            status: &cluster.status,
        }
    }
}

impl Cluster {
    /// Stable key for the cluster and user entries of a kubeconfig.
    ///
    /// The provider, id, region and name joined with `-`. Inside each field
    /// `%` and `-` are percent-escaped, so distinct clusters never share a
    /// key.
    #[must_use]
    pub fn unique_id(&self) -> String {
        [
            self.provider.as_str(),
            self.id.as_str(),
            self.region.as_str(),
            self.name.as_str(),
        ]
        .map(escape_id_field)
        .join("-")
    }

    /// Whether the provider returned CA bytes for this cluster.
    #[must_use]
    pub fn has_certificate_authority(&self) -> bool {
        !self.certificate_authority_data.is_empty()
    }

    /// Render `template` against the cluster's fields.
    ///
    /// Rendering is strict: a reference to an unknown field fails.
    ///
    /// # Errors
    /// Returns the template engine error on parse or render failure.
    pub fn pretty_name(&self, template: &str) -> Result<String, RenderError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(no_escape);
        registry.render_template(template, &TemplateFields::from(self))
    }

    /// Context name for this cluster, falling back to the raw name when
    /// the template fails or renders to nothing.
    #[must_use]
    pub fn context_name(&self, template: &str) -> String {
        match self.pretty_name(template) {
            Ok(rendered) if !rendered.trim().is_empty() => rendered,
            Ok(_) => self.name.clone(),
            Err(e) => {
                warn!(cluster = %self.name, template = %template, error = %e, "Can't render context name, using cluster name");
                self.name.clone()
            }
        }
    }
}

fn escape_id_field(field: &str) -> String {
    let mut escaped = String::with_capacity(field.len());
    for c in field.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '-' => escaped.push_str("%2D"),
            c => escaped.push(c),
        }
    }
    escaped
}
