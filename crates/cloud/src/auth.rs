//! Kubeconfig exec credential stanzas per provider.
//!
//! Which helper binary AWS clusters use depends on the locally installed
//! AWS CLI, so the choice is detected once per run and kept in an
//! [`AuthEnvironment`] instead of being stored on every cluster.

use std::process::Command;

use regex::Regex;
use semver::Version;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cluster::{Cluster, Provider};

/// Client authentication API served by every helper below.
pub const EXEC_API_VERSION: &str = "client.authentication.k8s.io/v1beta1";

/// First AWS CLI release with `aws eks get-token`.
const AWS_CLI_GET_TOKEN_SINCE: Version = Version::new(1, 16, 266);

/// Azure AD application id of the AKS API server.
const AKS_AAD_SERVER_ID: &str = "6dae42f8-4368-4678-94ff-3960e28e3630";

const GKE_INSTALL_HINT: &str = "Install gke-gcloud-auth-plugin for use with kubectl by following \
https://cloud.google.com/kubernetes-engine/docs/how-to/cluster-access-for-kubectl#install_plugin";

/// Environment variable passed to an exec helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecEnvVar {
    pub name: String,
    pub value: String,
}

/// The `user.exec` stanza of a kubeconfig.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecConfig {
    pub api_version: String,
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<ExecEnvVar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interactive_mode: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub provide_cluster_info: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_hint: Option<String>,
}

impl ExecConfig {
    fn new(command: &str, args: &[&str]) -> Self {
        Self {
            api_version: EXEC_API_VERSION.to_string(),
            command: command.to_string(),
            args: args.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }
}

/// Token helper used for EKS clusters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AwsAuthTool {
    /// `aws eks get-token`.
    AwsCli,
    /// `aws-iam-authenticator token`.
    IamAuthenticator,
}

impl AwsAuthTool {
    /// Pick the helper matching an AWS CLI version, if any is installed.
    #[must_use]
    pub fn for_cli_version(version: Option<&Version>) -> Self {
        match version {
            Some(v) if *v >= AWS_CLI_GET_TOKEN_SINCE => Self::AwsCli,
            _ => Self::IamAuthenticator,
        }
    }

    /// Run `aws --version` and pick the helper accordingly.
    #[must_use]
    pub fn detect() -> Self {
        if which::which("aws").is_err() {
            info!("AWS CLI not found, falling back to aws-iam-authenticator");
            return Self::IamAuthenticator;
        }
        let version = match Command::new("aws").arg("--version").output() {
            Ok(output) => {
                // Old releases print the banner on stderr.
                let mut banner = String::from_utf8_lossy(&output.stdout).into_owned();
                banner.push_str(&String::from_utf8_lossy(&output.stderr));
                parse_aws_cli_version(&banner)
            }
            Err(e) => {
                debug!(error = %e, "Can't run aws --version");
                None
            }
        };
        let tool = Self::for_cli_version(version.as_ref());
        info!(version = ?version.map(|v| v.to_string()), tool = ?tool, "Detected AWS CLI");
        tool
    }
}

/// Extract the version from `aws --version` output.
#[must_use]
pub fn parse_aws_cli_version(banner: &str) -> Option<Version> {
    let pattern = Regex::new(r"aws-cli/([0-9]+\.[0-9]+\.[0-9]+)").ok()?;
    let captured = pattern.captures(banner)?.get(1)?;
    Version::parse(captured.as_str()).ok()
}

/// Host facts needed to build exec stanzas, detected once per run.
#[derive(Debug, Clone, Copy)]
pub struct AuthEnvironment {
    aws_tool: AwsAuthTool,
}

impl Default for AuthEnvironment {
    fn default() -> Self {
        Self::new(AwsAuthTool::AwsCli)
    }
}

impl AuthEnvironment {
    #[must_use]
    pub const fn new(aws_tool: AwsAuthTool) -> Self {
        Self { aws_tool }
    }

    /// Probe the host for whatever `provider` needs. Only AWS needs a probe.
    #[must_use]
    pub fn detect(provider: Provider) -> Self {
        match provider {
            Provider::Aws => Self::new(AwsAuthTool::detect()),
            _ => Self::default(),
        }
    }

    /// Exec stanza for `cluster`, or `None` when its provider has no helper.
    #[must_use]
    pub fn exec_config(&self, cluster: &Cluster) -> Option<ExecConfig> {
        match cluster.provider {
            Provider::None => None,
            Provider::Aws => Some(match self.aws_tool {
                AwsAuthTool::AwsCli => ExecConfig::new(
                    "aws",
                    &[
                        "eks",
                        "get-token",
                        "--cluster-name",
                        &cluster.name,
                        "--region",
                        &cluster.region,
                    ],
                ),
                AwsAuthTool::IamAuthenticator => ExecConfig::new(
                    "aws-iam-authenticator",
                    &["token", "-i", &cluster.name, "--region", &cluster.region],
                ),
            }),
            Provider::Azure => Some(ExecConfig {
                interactive_mode: Some("IfAvailable".to_string()),
                ..ExecConfig::new(
                    "kubelogin",
                    &[
                        "get-token",
                        "--login",
                        "azurecli",
                        "--server-id",
                        AKS_AAD_SERVER_ID,
                    ],
                )
            }),
            Provider::Google => Some(ExecConfig {
                provide_cluster_info: true,
                install_hint: Some(GKE_INSTALL_HINT.to_string()),
                ..ExecConfig::new("gke-gcloud-auth-plugin", &[])
            }),
            Provider::DigitalOcean => Some(ExecConfig::new(
                "doctl",
                &[
                    "kubernetes",
                    "cluster",
                    "kubeconfig",
                    "exec-credential",
                    "--version=v1beta1",
                    &cluster.id,
                ],
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster(provider: Provider) -> Cluster {
        Cluster {
            provider,
            name: "demo".to_string(),
            region: "us-east-2".to_string(),
            id: "4f9c1c9e-0c55-4a4b-9a8e-000000000001".to_string(),
            endpoint: "https://demo.example.test".to_string(),
            certificate_authority_data: b"pem".to_vec(),
            status: "running".to_string(),
        }
    }

    #[test]
    fn test_parse_aws_cli_version() {
        assert_eq!(
            parse_aws_cli_version("aws-cli/2.15.30 Python/3.11.8 Linux/6.5.0 exe/x86_64.ubuntu.22"),
            Some(Version::new(2, 15, 30))
        );
        assert_eq!(
            parse_aws_cli_version("aws-cli/1.16.266 Python/2.7.16 Darwin/18.7.0 botocore/1.13.2"),
            Some(Version::new(1, 16, 266))
        );
        assert_eq!(parse_aws_cli_version("command not found"), None);
    }

    #[test]
    fn test_aws_tool_threshold() {
        assert_eq!(
            AwsAuthTool::for_cli_version(Some(&Version::new(1, 16, 265))),
            AwsAuthTool::IamAuthenticator
        );
        assert_eq!(
            AwsAuthTool::for_cli_version(Some(&Version::new(1, 16, 266))),
            AwsAuthTool::AwsCli
        );
        assert_eq!(
            AwsAuthTool::for_cli_version(Some(&Version::new(2, 0, 0))),
            AwsAuthTool::AwsCli
        );
        assert_eq!(
            AwsAuthTool::for_cli_version(None),
            AwsAuthTool::IamAuthenticator
        );
    }

    #[test]
    fn test_aws_cli_exec() {
        let exec = AuthEnvironment::new(AwsAuthTool::AwsCli)
            .exec_config(&cluster(Provider::Aws))
            .unwrap();
        assert_eq!(exec.api_version, EXEC_API_VERSION);
        assert_eq!(exec.command, "aws");
        assert_eq!(
            exec.args,
            ["eks", "get-token", "--cluster-name", "demo", "--region", "us-east-2"]
        );
    }

    #[test]
    fn test_iam_authenticator_exec() {
        let exec = AuthEnvironment::new(AwsAuthTool::IamAuthenticator)
            .exec_config(&cluster(Provider::Aws))
            .unwrap();
        assert_eq!(exec.command, "aws-iam-authenticator");
        assert_eq!(exec.args, ["token", "-i", "demo", "--region", "us-east-2"]);
    }

    #[test]
    fn test_azure_exec() {
        let exec = AuthEnvironment::default()
            .exec_config(&cluster(Provider::Azure))
            .unwrap();
        assert_eq!(exec.command, "kubelogin");
        assert_eq!(exec.interactive_mode.as_deref(), Some("IfAvailable"));
        assert!(exec.args.contains(&AKS_AAD_SERVER_ID.to_string()));
    }

    #[test]
    fn test_gke_exec() {
        let exec = AuthEnvironment::default()
            .exec_config(&cluster(Provider::Google))
            .unwrap();
        assert_eq!(exec.command, "gke-gcloud-auth-plugin");
        assert!(exec.args.is_empty());
        assert!(exec.provide_cluster_info);
        assert!(exec.install_hint.is_some());
    }

    #[test]
    fn test_digitalocean_exec_uses_cluster_id() {
        let exec = AuthEnvironment::default()
            .exec_config(&cluster(Provider::DigitalOcean))
            .unwrap();
        assert_eq!(exec.command, "doctl");
        assert_eq!(
            exec.args.last().map(String::as_str),
            Some("4f9c1c9e-0c55-4a4b-9a8e-000000000001")
        );
    }

    #[test]
    fn test_no_exec_for_unset_provider() {
        assert!(AuthEnvironment::default()
            .exec_config(&cluster(Provider::None))
            .is_none());
    }

    #[test]
    fn test_exec_serializes_camel_case() {
        let exec = AuthEnvironment::default()
            .exec_config(&cluster(Provider::Google))
            .unwrap();
        let yaml = serde_yaml::to_string(&exec).unwrap();
        assert!(yaml.contains("apiVersion: client.authentication.k8s.io/v1beta1"));
        assert!(yaml.contains("provideClusterInfo: true"));
        assert!(yaml.contains("installHint:"));
        assert!(!yaml.contains("args"));
        assert!(!yaml.contains("interactiveMode"));
    }
}
