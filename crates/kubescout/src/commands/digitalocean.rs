//! `digitalocean` command: DOKS clusters across regions.

use anyhow::{bail, Result};
use clap::Args;
use kubescout_cloud::digitalocean::{self, regions::DEFAULT_REGIONS};
use kubescout_cloud::Provider;

use super::discover::{Action, CommonArgs, Discovery};
use crate::cli::GlobalOptions;

/// Discover DOKS clusters in the given regions.
#[derive(Args, Debug)]
pub struct DigitalOceanCommand {
    /// Region slugs to scan.
    #[arg(
        long,
        value_delimiter = ',',
        value_name = "REGION",
        default_values_t = DEFAULT_REGIONS.iter().map(|r| (*r).to_string())
    )]
    pub do_regions: Vec<String>,

    /// API token.
    #[arg(long, env = digitalocean::TOKEN_ENV, hide_env_values = true, value_name = "TOKEN")]
    pub do_token: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub action: Action,
}

impl DigitalOceanCommand {
    /// Run the command.
    ///
    /// # Errors
    /// Returns an error without a token, or when the kubeconfig can't be
    /// updated.
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let token = self.token()?;
        Discovery {
            provider: Provider::DigitalOcean,
            sources: digitalocean::sources(token, &self.do_regions),
            global,
            common: &self.common,
        }
        .run(&self.action)
        .await
    }

    fn token(&self) -> Result<&str> {
        match self.do_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Ok(token),
            _ => bail!(
                "No DigitalOcean token; set {} or pass --do-token",
                digitalocean::TOKEN_ENV
            ),
        }
    }
}
