//! Command-line surface.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::commands::aks::AksCommand;
use crate::commands::aws::AwsCommand;
use crate::commands::digitalocean::DigitalOceanCommand;
use crate::commands::gke::GkeCommand;
use crate::commands::version::VersionCommand;
use crate::kubeconfig::default_kubeconfig_path;
use crate::logging::LogLevel;

/// Discover managed Kubernetes clusters and add them to your kubeconfig.
#[derive(Parser, Debug)]
#[command(
    name = "kubescout",
    version,
    about = "Discover managed Kubernetes clusters",
    long_about = "Discover EKS, AKS, GKE and DOKS clusters across every region,\n\
                  subscription or project you can reach, then list them or add\n\
                  them to your kubeconfig.\n\n\
                  Installed as `kubectl-discover` it also works as a kubectl plugin."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options accepted by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Log verbosity. `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Kubeconfig to read and update.
    #[arg(long, global = true, value_name = "PATH", default_value_os_t = default_kubeconfig_path())]
    pub kubeconfig_path: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Amazon EKS clusters.
    Aws(AwsCommand),

    /// Azure AKS clusters.
    #[command(visible_alias = "azure")]
    Aks(AksCommand),

    /// Google GKE clusters.
    #[command(visible_alias = "gcp")]
    Gke(GkeCommand),

    /// `DigitalOcean` DOKS clusters.
    #[command(name = "digitalocean", visible_alias = "do")]
    DigitalOcean(DigitalOceanCommand),

    /// Print version information.
    Version(VersionCommand),
}

impl Cli {
    /// Run the selected subcommand.
    ///
    /// # Errors
    /// Returns whatever the subcommand fails with.
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Aws(cmd) => cmd.run(&self.global).await,
            Commands::Aks(cmd) => cmd.run(&self.global).await,
            Commands::Gke(cmd) => cmd.run(&self.global).await,
            Commands::DigitalOcean(cmd) => cmd.run(&self.global).await,
            Commands::Version(cmd) => cmd.run(),
        }
    }
}

/// Name shown in usage output, based on how the binary was invoked.
#[must_use]
pub fn bin_name(argv0: Option<&OsStr>) -> &'static str {
    let invoked_as_plugin = argv0
        .and_then(|arg| Path::new(arg).file_name())
        .and_then(OsStr::to_str)
        .is_some_and(|name| name.starts_with("kubectl-"));
    if invoked_as_plugin {
        "kubectl discover"
    } else {
        "kubescout"
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;
    use crate::commands::discover::Action;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_bin_name() {
        assert_eq!(
            bin_name(Some(OsStr::new("/usr/local/bin/kubectl-discover"))),
            "kubectl discover"
        );
        assert_eq!(bin_name(Some(OsStr::new("./kubescout"))), "kubescout");
        assert_eq!(bin_name(None), "kubescout");
    }

    #[test]
    fn test_global_defaults() {
        let cli = Cli::try_parse_from(["kubescout", "aws", "list"]).unwrap();
        assert_eq!(cli.global.log_level, LogLevel::Warn);
        assert_eq!(cli.global.kubeconfig_path, default_kubeconfig_path());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kubescout",
            "do",
            "list",
            "--log-level",
            "debug",
            "--kubeconfig-path",
            "/tmp/kc",
        ])
        .unwrap();
        assert_eq!(cli.global.log_level, LogLevel::Debug);
        assert_eq!(cli.global.kubeconfig_path, PathBuf::from("/tmp/kc"));
        assert!(matches!(cli.command, Commands::DigitalOcean(_)));
    }

    #[test]
    fn test_aliases() {
        for (alias, expected) in [("azure", "aks"), ("gcp", "gke"), ("do", "digitalocean")] {
            let cli = Cli::try_parse_from(["kubescout", alias, "list"]).unwrap();
            let name = match cli.command {
                Commands::Aks(_) => "aks",
                Commands::Gke(_) => "gke",
                Commands::DigitalOcean(_) => "digitalocean",
                _ => "other",
            };
            assert_eq!(name, expected);
        }
    }

    #[test]
    fn test_update_backup_flag() {
        let cli = Cli::try_parse_from(["kubescout", "aws", "update"]).unwrap();
        let Commands::Aws(cmd) = cli.command else {
            panic!("expected aws");
        };
        assert!(matches!(cmd.action, Action::Update(ref a) if a.backup_kubeconfig));

        let cli = Cli::try_parse_from([
            "kubescout",
            "aws",
            "update",
            "--backup-kubeconfig",
            "false",
        ])
        .unwrap();
        let Commands::Aws(cmd) = cli.command else {
            panic!("expected aws");
        };
        assert!(matches!(cmd.action, Action::Update(ref a) if !a.backup_kubeconfig));
    }

    #[test]
    fn test_template_alias_and_timeout() {
        let cli = Cli::try_parse_from([
            "kubescout",
            "gke",
            "--cluster-name-template",
            "gke-{{name}}",
            "--scope-timeout",
            "30",
            "list",
        ])
        .unwrap();
        let Commands::Gke(cmd) = cli.command else {
            panic!("expected gke");
        };
        assert_eq!(cmd.common.context_name_alias, "gke-{{name}}");
        assert_eq!(cmd.common.scope_timeout, Some(30));
    }

    #[test]
    fn test_missing_action_is_an_error() {
        assert!(Cli::try_parse_from(["kubescout", "aws"]).is_err());
    }
}
