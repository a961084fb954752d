//! `version` command.

use anyhow::Result;
use clap::{Args, ValueEnum};
use serde::Serialize;

/// Machine-readable output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Print version information.
#[derive(Args, Debug)]
pub struct VersionCommand {
    /// Print only the version number.
    #[arg(long)]
    pub short: bool,

    /// Print build information as JSON or YAML.
    #[arg(long, short = 'o', value_enum, conflicts_with = "short")]
    pub output: Option<OutputFormat>,
}

/// Build metadata baked in at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildInfo {
    pub version: &'static str,
    pub git_commit: &'static str,
    pub build_date: &'static str,
}

impl BuildInfo {
    #[must_use]
    pub const fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_commit: match option_env!("KUBESCOUT_GIT_COMMIT") {
                Some(commit) => commit,
                None => "unknown",
            },
            build_date: match option_env!("KUBESCOUT_BUILD_DATE") {
                Some(date) => date,
                None => "unknown",
            },
        }
    }
}

impl VersionCommand {
    /// Run the command.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn run(&self) -> Result<()> {
        println!("{}", self.render(&BuildInfo::current())?);
        Ok(())
    }

    fn render(&self, info: &BuildInfo) -> Result<String> {
        Ok(match self.output {
            Some(OutputFormat::Json) => serde_json::to_string_pretty(info)?,
            Some(OutputFormat::Yaml) => serde_yaml::to_string(info)?.trim_end().to_string(),
            None if self.short => info.version.to_string(),
            None => format!(
                "kubescout {} (commit {}, built {})",
                info.version, info.git_commit, info.build_date
            ),
        })
    }
}
