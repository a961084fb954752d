//! `aws` command: EKS clusters across partitions.

use anyhow::{bail, Result};
use clap::Args;
use kubescout_cloud::aws::{self, regions};
use kubescout_cloud::Provider;
use tracing::warn;

use super::discover::{Action, CommonArgs, Discovery};
use crate::cli::GlobalOptions;

/// Discover EKS clusters in every region of the selected partitions.
#[derive(Args, Debug)]
pub struct AwsCommand {
    /// AWS partitions to scan (aws, aws-cn, aws-us-gov, aws-iso, aws-iso-b).
    #[arg(
        long,
        value_delimiter = ',',
        value_name = "PARTITION",
        default_value = regions::DEFAULT_PARTITION
    )]
    pub aws_partitions: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,

    #[command(subcommand)]
    pub action: Action,
}

impl AwsCommand {
    /// Run the command.
    ///
    /// # Errors
    /// Returns an error when no region can be derived from the partitions
    /// or the kubeconfig can't be updated.
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let regions = resolve_regions(&self.aws_partitions)?;
        Discovery {
            provider: Provider::Aws,
            sources: aws::sources(&regions).await,
            global,
            common: &self.common,
        }
        .run(&self.action)
        .await
    }
}

/// Expand partitions into regions, warning about unknown partitions.
///
/// # Errors
/// Returns an error when nothing is left to scan.
pub fn resolve_regions(partitions: &[String]) -> Result<Vec<String>> {
    for partition in partitions {
        if regions::partition_regions(partition).is_none() {
            warn!(partition = %partition, known = ?regions::partition_names(), "Unknown AWS partition");
        }
    }
    let resolved = regions::regions_for_partitions(partitions);
    if resolved.is_empty() {
        bail!(
            "No AWS regions for partitions {partitions:?}; known partitions are {}",
            regions::partition_names().join(", ")
        );
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_resolve_regions_skips_unknown() {
        let regions = resolve_regions(&strings(&["aws-mars", "aws-us-gov"])).unwrap();
        assert_eq!(regions, ["us-gov-east-1", "us-gov-west-1"]);
    }

    #[test]
    fn test_resolve_regions_all_unknown_is_an_error() {
        let err = resolve_regions(&strings(&["aws-mars"])).unwrap_err();
        assert!(err.to_string().contains("aws-us-gov"));
    }

    #[test]
    fn test_partition_flag_is_comma_separated() {
        use crate::cli::{Cli, Commands};
        use clap::Parser;

        let cli = Cli::try_parse_from([
            "kubescout",
            "aws",
            "--aws-partitions",
            "aws,aws-cn",
            "list",
        ])
        .unwrap();
        let Commands::Aws(cmd) = cli.command else {
            panic!("expected aws");
        };
        assert_eq!(cmd.aws_partitions, ["aws", "aws-cn"]);
    }
}
