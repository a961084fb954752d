//! `aks` command: AKS clusters across subscriptions.

use anyhow::{bail, Result};
use clap::Args;
use kubescout_cloud::{azure, Provider};

use super::discover::{Action, CommonArgs, Discovery};
use crate::cli::GlobalOptions;

/// Discover AKS clusters in the given subscriptions.
#[derive(Args, Debug)]
pub struct AksCommand {
    /// Subscription IDs to scan.
    #[arg(
        long,
        env = "AZURE_SUBSCRIPTION_ID",
        value_delimiter = ',',
        value_name = "ID"
    )]
    pub azure_subscriptions: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub action: Action,
}

impl AksCommand {
    /// Run the command.
    ///
    /// # Errors
    /// Returns an error without subscriptions, or when the kubeconfig can't
    /// be updated.
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let subscriptions = subscriptions(&self.azure_subscriptions)?;
        Discovery {
            provider: Provider::Azure,
            sources: azure::sources(&subscriptions).await,
            global,
            common: &self.common,
        }
        .run(&self.action)
        .await
    }
}

/// Non-blank subscription IDs.
///
/// # Errors
/// Returns an error when none is given.
pub fn subscriptions(raw: &[String]) -> Result<Vec<String>> {
    let ids: Vec<String> = raw
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    if ids.is_empty() {
        bail!("No Azure subscription given; use --azure-subscriptions or AZURE_SUBSCRIPTION_ID");
    }
    Ok(ids)
}
