//! Mapping from EKS API shapes to [`Cluster`].

use aws_sdk_eks::types::Cluster as EksCluster;

use crate::cluster::{Cluster, Provider};
use crate::providers::credentials::decode_base64;
use crate::providers::CloudProviderError;

/// One page of `ListClusters`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterPage {
    /// Cluster names on this page.
    pub names: Vec<String>,
    /// Token for the next page, `None` on the last one.
    pub next_token: Option<String>,
}

fn required<'a>(
    value: Option<&'a str>,
    cluster: &str,
    field: &'static str,
) -> Result<&'a str, CloudProviderError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CloudProviderError::MissingField {
            cluster: cluster.to_string(),
            field,
        })
}

/// Convert a described EKS cluster found in `region`.
///
/// # Errors
/// Fails when the name, ARN, endpoint or CA is missing, or the CA isn't
/// valid base64. Clusters still being created have no CA and end up here.
pub fn to_cluster(eks: &EksCluster, region: &str) -> Result<Cluster, CloudProviderError> {
    let name = required(eks.name(), "<unnamed>", "name")?;
    let arn = required(eks.arn(), name, "arn")?;
    let endpoint = required(eks.endpoint(), name, "endpoint")?;
    let ca = required(
        eks.certificate_authority().and_then(|ca| ca.data()),
        name,
        "certificate authority",
    )?;

    Ok(Cluster {
        provider: Provider::Aws,
        name: name.to_string(),
        region: region.to_string(),
        id: arn.to_string(),
        endpoint: endpoint.to_string(),
        certificate_authority_data: decode_base64(ca)?,
        status: eks
            .status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default(),
    })
}
