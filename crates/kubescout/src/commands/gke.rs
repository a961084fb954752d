//! `gke` command: GKE clusters across projects and zones.

use anyhow::{bail, Result};
use clap::Args;
use kubescout_cloud::{gcp, Provider};

use super::discover::{Action, CommonArgs, Discovery};
use crate::cli::GlobalOptions;

/// Discover GKE clusters. Without `--gcp-projects` every active project is
/// scanned, without `--gcp-zones` every zone that is up.
#[derive(Args, Debug)]
pub struct GkeCommand {
    /// Project IDs to scan.
    #[arg(long, value_delimiter = ',', value_name = "PROJECT")]
    pub gcp_projects: Vec<String>,

    /// Zones to scan.
    #[arg(long, value_delimiter = ',', value_name = "ZONE")]
    pub gcp_zones: Vec<String>,

    /// Project used when project discovery finds nothing.
    #[arg(long, env = gcp::DEFAULT_PROJECT_ENV, value_name = "PROJECT")]
    pub gcp_default_project: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub action: Action,
}

impl GkeCommand {
    /// Run the command.
    ///
    /// # Errors
    /// Returns an error when no project/zone pair resolves, or when the
    /// kubeconfig can't be updated.
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let sources = gcp::sources(
            &self.gcp_projects,
            &self.gcp_zones,
            self.gcp_default_project.as_deref(),
        )
        .await;
        if sources.is_empty() {
            bail!(
                "No GKE project/zone to scan; check gcloud credentials or set --gcp-projects, --gcp-zones or {}",
                gcp::DEFAULT_PROJECT_ENV
            );
        }
        Discovery {
            provider: Provider::Google,
            sources,
            global,
            common: &self.common,
        }
        .run(&self.action)
        .await
    }
}
