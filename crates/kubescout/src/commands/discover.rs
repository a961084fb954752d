//! List and update flows shared by every provider command.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Subcommand};
use kubescout_cloud::{
    Aggregator, AuthEnvironment, Cluster, ClusterSource, Provider, DEFAULT_CONTEXT_TEMPLATE,
};
use tracing::{debug, warn};

use crate::cli::GlobalOptions;
use crate::kubeconfig::{self, Kubeconfig};
use crate::ui;

/// Flags every provider command accepts.
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Template for context names. Fields: provider, name, region, id,
    /// endpoint, status.
    #[arg(
        long,
        visible_alias = "cluster-name-template",
        value_name = "TEMPLATE",
        default_value = DEFAULT_CONTEXT_TEMPLATE
    )]
    pub context_name_alias: String,

    /// Give up on a single region/subscription/zone after this many seconds.
    #[arg(long, value_name = "SECONDS")]
    pub scope_timeout: Option<u64>,
}

/// What to do with the discovered clusters.
#[derive(Subcommand, Debug, Clone)]
pub enum Action {
    /// Print the discovered clusters.
    List,
    /// Add the discovered clusters to the kubeconfig.
    Update(UpdateArgs),
}

/// Flags of `update`.
#[derive(Args, Debug, Clone)]
pub struct UpdateArgs {
    /// Copy the kubeconfig to a `.bak` file before writing.
    #[arg(long, default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub backup_kubeconfig: bool,
}

/// One resolved provider invocation.
pub struct Discovery<'a> {
    pub provider: Provider,
    pub sources: Vec<Box<dyn ClusterSource>>,
    pub global: &'a GlobalOptions,
    pub common: &'a CommonArgs,
}

impl Discovery<'_> {
    /// Query every scope, then list or update.
    ///
    /// # Errors
    /// Returns an error when the kubeconfig can't be read, backed up or
    /// written.
    pub async fn run(self, action: &Action) -> Result<()> {
        let scopes = self.sources.len();
        debug!(provider = %self.provider, scopes, "Starting discovery");

        let clusters = Aggregator::new(self.sources)
            .with_scope_timeout(self.common.scope_timeout.map(Duration::from_secs))
            .discover_with(|cluster| {
                debug!(cluster = %cluster.name, region = %cluster.region, "Found cluster");
            })
            .await;

        match action {
            Action::List => list(&clusters, &self.global.kubeconfig_path, self.common),
            Action::Update(args) => {
                let provider = self.provider;
                let auth = tokio::task::spawn_blocking(move || AuthEnvironment::detect(provider))
                    .await
                    .context("Auth tool detection failed")?;
                update(
                    &clusters,
                    &self.global.kubeconfig_path,
                    self.common,
                    args,
                    &auth,
                )?;
                Ok(())
            }
        }
    }
}

/// Print `clusters` as a table.
///
/// # Errors
/// Returns an error when an existing kubeconfig can't be parsed.
pub fn list(clusters: &[Cluster], kubeconfig_path: &Path, common: &CommonArgs) -> Result<()> {
    let kubeconfig = Kubeconfig::load(kubeconfig_path)?;
    println!(
        "{}",
        ui::cluster_table(clusters, &kubeconfig, &common.context_name_alias)
    );
    println!("Number of clusters: {}", clusters.len());
    Ok(())
}

/// Merge `clusters` into the kubeconfig at `kubeconfig_path`.
///
/// Returns how many clusters were written.
///
/// # Errors
/// Returns an error when the backup, load or write fails.
pub fn update(
    clusters: &[Cluster],
    kubeconfig_path: &Path,
    common: &CommonArgs,
    args: &UpdateArgs,
    auth: &AuthEnvironment,
) -> Result<usize> {
    ui::print_info(&format!("Found {} clusters remote", clusters.len()));

    if args.backup_kubeconfig && kubeconfig_path.is_file() {
        let backup = kubeconfig::backup(kubeconfig_path)?;
        ui::print_info(&format!("Backup kubeconfig to {}", backup.display()));
    }

    let mut store = Kubeconfig::load(kubeconfig_path)?;
    let mut written = 0;
    for cluster in clusters {
        if !cluster.has_certificate_authority() {
            warn!(cluster = %cluster.name, status = %cluster.status, "Skipping cluster without certificate authority data");
            ui::print_warning(&format!(
                "Skipping {}: certificate authority not available yet (status {})",
                cluster.name, cluster.status
            ));
            continue;
        }
        let context = cluster.context_name(&common.context_name_alias);
        store.add_cluster(cluster, auth.exec_config(cluster), &context)?;
        written += 1;
    }

    store.persist(kubeconfig_path)?;
    ui::print_success(&format!(
        "Wrote {written} clusters to {}",
        kubeconfig_path.display()
    ));
    Ok(written)
}
