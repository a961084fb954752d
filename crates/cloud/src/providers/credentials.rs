//! Bearer tokens and kubeconfig fragments shared by the REST providers.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use super::CloudProviderError;

/// Token from `env_var` if set and non-empty, otherwise the trimmed stdout
/// of `program args...`.
///
/// # Errors
/// Returns [`CloudProviderError::Auth`] when the command can't be run,
/// fails, or prints nothing.
pub async fn token_from_env_or_cli(
    env_var: &str,
    program: &str,
    args: &[&str],
) -> Result<String, CloudProviderError> {
    if let Ok(token) = std::env::var(env_var) {
        let token = token.trim();
        if !token.is_empty() {
            debug!(source = %env_var, "Using access token from environment");
            return Ok(token.to_string());
        }
    }

    debug!(program = %program, "Requesting access token from CLI");
    let output = Command::new(program)
        .args(args)
        .output()
        .await
        .map_err(|e| CloudProviderError::Auth(format!("can't run {program}: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CloudProviderError::Auth(format!(
            "{program} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(CloudProviderError::Auth(format!(
            "{program} returned an empty token; set {env_var}"
        )));
    }
    Ok(token)
}

/// Decode standard base64, ignoring surrounding whitespace.
///
/// # Errors
/// Returns [`CloudProviderError::Decode`] on malformed input.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, CloudProviderError> {
    Ok(STANDARD.decode(data.trim())?)
}

#[derive(Deserialize)]
struct KubeconfigDoc {
    #[serde(default)]
    clusters: Option<Vec<KubeconfigCluster>>,
}

#[derive(Deserialize)]
struct KubeconfigCluster {
    cluster: KubeconfigClusterData,
}

#[derive(Deserialize)]
struct KubeconfigClusterData {
    #[serde(rename = "certificate-authority-data", default)]
    certificate_authority_data: Option<String>,
}

/// Decoded CA bytes of the first cluster in a provider-issued kubeconfig.
///
/// # Errors
/// Fails when the document doesn't parse, carries no CA, or the CA isn't
/// valid base64.
pub fn ca_from_kubeconfig(raw: &str) -> Result<Vec<u8>, CloudProviderError> {
    let doc: KubeconfigDoc = serde_yaml::from_str(raw)?;
    let encoded = doc
        .clusters
        .unwrap_or_default()
        .into_iter()
        .find_map(|c| c.cluster.certificate_authority_data)
        .filter(|data| !data.trim().is_empty())
        .ok_or_else(|| {
            CloudProviderError::NotFound("certificate-authority-data in kubeconfig".to_string())
        })?;
    decode_base64(&encoded)
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    const KUBECONFIG: &str = r"
apiVersion: v1
kind: Config
clusters:
- cluster:
    certificate-authority-data: LS0tLS1CRUdJTiBDRVJUSUZJQ0FURS0tLS0t
    server: https://demo.example.test
  name: demo
contexts: []
users: []
";

    #[test]
    fn test_ca_from_kubeconfig() {
        let ca = ca_from_kubeconfig(KUBECONFIG).unwrap();
        assert_eq!(ca, b"-----BEGIN CERTIFICATE-----");
    }

    #[test]
    fn test_ca_from_kubeconfig_without_ca() {
        let raw = "clusters:\n- name: demo\n  cluster:\n    server: https://x\n";
        assert!(matches!(
            ca_from_kubeconfig(raw),
            Err(CloudProviderError::NotFound(_))
        ));
    }

    #[test]
    fn test_ca_from_kubeconfig_without_clusters() {
        assert!(ca_from_kubeconfig("clusters: null\n").is_err());
        assert!(matches!(
            ca_from_kubeconfig("clusters: [\n"),
            Err(CloudProviderError::Kubeconfig(_))
        ));
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        assert!(matches!(
            decode_base64("***"),
            Err(CloudProviderError::Decode(_))
        ));
        assert_eq!(decode_base64(" aGk= \n").unwrap(), b"hi");
    }

    #[tokio::test]
    #[serial]
    async fn test_token_from_env_wins() {
        let var = "KUBESCOUT_TEST_TOKEN_FROM_ENV";
        std::env::set_var(var, "  secret-token \n");
        let token = token_from_env_or_cli(var, "definitely-not-a-real-binary", &[]).await;
        std::env::remove_var(var);
        assert_eq!(token.unwrap(), "secret-token");
    }

    #[tokio::test]
    #[serial]
    async fn test_blank_env_falls_back_to_missing_cli() {
        std::env::set_var("KUBESCOUT_TEST_TOKEN_UNSET", "   ");
        let result = token_from_env_or_cli(
            "KUBESCOUT_TEST_TOKEN_UNSET",
            "definitely-not-a-real-binary",
            &[],
        )
        .await;
        std::env::remove_var("KUBESCOUT_TEST_TOKEN_UNSET");
        assert!(matches!(result, Err(CloudProviderError::Auth(_))));
    }
}
