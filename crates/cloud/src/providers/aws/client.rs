//! EKS cluster source for one region.

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_eks::error::DisplayErrorContext;
use aws_sdk_eks::types::Cluster as EksCluster;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::models::{to_cluster, ClusterPage};
use crate::cluster::Cluster;
use crate::providers::{CloudProviderError, ClusterSource};

/// The two EKS calls discovery needs.
#[async_trait]
pub trait EksApi: Send + Sync {
    /// Fetch one page of cluster names.
    async fn list_clusters_page(
        &self,
        next_token: Option<String>,
    ) -> Result<ClusterPage, CloudProviderError>;

    /// Describe one cluster by name.
    async fn describe_cluster(&self, name: &str) -> Result<Option<EksCluster>, CloudProviderError>;
}

/// [`EksApi`] backed by the AWS SDK.
#[derive(Clone, Debug)]
pub struct SdkEksApi {
    client: aws_sdk_eks::Client,
}

impl SdkEksApi {
    /// Load shared AWS configuration for `region`.
    ///
    /// # Errors
    /// Returns an error when no credentials provider can be resolved.
    pub async fn from_region(region: &str) -> Result<Self, CloudProviderError> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        if config.credentials_provider().is_none() {
            return Err(CloudProviderError::Auth(format!(
                "no AWS credentials provider for region {region}"
            )));
        }
        Ok(Self {
            client: aws_sdk_eks::Client::new(&config),
        })
    }
}

#[async_trait]
impl EksApi for SdkEksApi {
    async fn list_clusters_page(
        &self,
        next_token: Option<String>,
    ) -> Result<ClusterPage, CloudProviderError> {
        let output = self
            .client
            .list_clusters()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| CloudProviderError::Sdk(DisplayErrorContext(&e).to_string()))?;

        Ok(ClusterPage {
            names: output.clusters().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    async fn describe_cluster(&self, name: &str) -> Result<Option<EksCluster>, CloudProviderError> {
        let output = self
            .client
            .describe_cluster()
            .name(name)
            .send()
            .await
            .map_err(|e| CloudProviderError::Sdk(DisplayErrorContext(&e).to_string()))?;

        Ok(output.cluster().cloned())
    }
}

/// EKS clusters of one region.
pub struct Eks<A = SdkEksApi> {
    api: A,
    region: String,
}

impl Eks<SdkEksApi> {
    /// Create a source for `region` using the default credential chain.
    ///
    /// # Errors
    /// Returns an error when the SDK configuration can't be built.
    pub async fn new(region: impl Into<String>) -> Result<Self, CloudProviderError> {
        let region = region.into();
        let api = SdkEksApi::from_region(&region).await?;
        Ok(Self { api, region })
    }
}

impl<A: EksApi> Eks<A> {
    /// Create a source over an arbitrary [`EksApi`].
    pub fn with_api(api: A, region: impl Into<String>) -> Self {
        Self {
            api,
            region: region.into(),
        }
    }

    async fn describe(&self, name: &str) -> Result<Cluster, CloudProviderError> {
        let eks = self
            .api
            .describe_cluster(name)
            .await?
            .ok_or_else(|| CloudProviderError::NotFound(name.to_string()))?;
        to_cluster(&eks, &self.region)
    }
}

#[async_trait]
impl<A: EksApi> ClusterSource for Eks<A> {
    fn scope(&self) -> String {
        format!("EKS region {}", self.region)
    }

    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>) {
        let mut next_token = None;
        loop {
            let page = match self.api.list_clusters_page(next_token.take()).await {
                Ok(page) => page,
                Err(e) => {
                    warn!(region = %self.region, error = %e, "Can't list clusters");
                    return;
                }
            };
            debug!(region = %self.region, count = page.names.len(), "Parse page");

            for name in &page.names {
                match self.describe(name).await {
                    Ok(cluster) => {
                        if sink.send(cluster).await.is_err() {
                            return;
                        }
                    }
                    Err(e) => {
                        warn!(region = %self.region, cluster = %name, error = %e, "Can't get details on the cluster");
                    }
                }
            }

            match page.next_token {
                Some(token) if !token.is_empty() => next_token = Some(token),
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use aws_sdk_eks::types::{Certificate, ClusterStatus};

    use super::*;
    use crate::aggregator::Aggregator;

    #[derive(Default)]
    struct FakeEks {
        pages: Vec<Vec<String>>,
        details: HashMap<String, EksCluster>,
        fail_listing: bool,
    }

    #[async_trait]
    impl EksApi for FakeEks {
        async fn list_clusters_page(
            &self,
            next_token: Option<String>,
        ) -> Result<ClusterPage, CloudProviderError> {
            if self.fail_listing {
                return Err(CloudProviderError::Sdk("AccessDenied".to_string()));
            }
            let index: usize = next_token.map_or(0, |t| t.parse().unwrap());
            let names = self.pages.get(index).cloned().unwrap_or_default();
            let next_token = (index + 1 < self.pages.len()).then(|| (index + 1).to_string());
            Ok(ClusterPage { names, next_token })
        }

        async fn describe_cluster(
            &self,
            name: &str,
        ) -> Result<Option<EksCluster>, CloudProviderError> {
            match self.details.get(name) {
                Some(cluster) => Ok(Some(cluster.clone())),
                None => Err(CloudProviderError::Sdk(format!("ResourceNotFound: {name}"))),
            }
        }
    }

    fn active(name: &str) -> EksCluster {
        EksCluster::builder()
            .name(name)
            .arn(format!("arn:aws:eks:us-east-1:123456789012:cluster/{name}"))
            .endpoint(format!("https://{name}.eks.example.test"))
            .status(ClusterStatus::Active)
            .certificate_authority(Certificate::builder().data("cGVt").build())
            .build()
    }

    async fn collect(eks: Eks<FakeEks>) -> Vec<Cluster> {
        let source: Box<dyn ClusterSource> = Box::new(eks);
        let mut clusters = Aggregator::new(vec![source]).discover().await;
        clusters.sort_by(|a, b| a.name.cmp(&b.name));
        clusters
    }

    #[tokio::test]
    async fn test_follows_pagination() {
        let mut fake = FakeEks {
            pages: vec![
                vec!["a".to_string(), "b".to_string()],
                vec!["c".to_string()],
            ],
            ..FakeEks::default()
        };
        for name in ["a", "b", "c"] {
            fake.details.insert(name.to_string(), active(name));
        }

        let clusters = collect(Eks::with_api(fake, "us-east-1")).await;
        let names: Vec<&str> = clusters.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(clusters.iter().all(|c| c.region == "us-east-1"));
        assert!(clusters.iter().all(|c| c.certificate_authority_data == b"pem"));
    }

    #[tokio::test]
    async fn test_creating_cluster_without_ca_is_skipped() {
        let mut fake = FakeEks {
            pages: vec![vec!["ready".to_string(), "fresh".to_string()]],
            ..FakeEks::default()
        };
        fake.details.insert("ready".to_string(), active("ready"));
        fake.details.insert(
            "fresh".to_string(),
            EksCluster::builder()
                .name("fresh")
                .arn("arn:aws:eks:us-east-1:123456789012:cluster/fresh")
                .status(ClusterStatus::Creating)
                .build(),
        );

        let clusters = collect(Eks::with_api(fake, "us-east-1")).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "ready");
    }

    #[tokio::test]
    async fn test_describe_failure_skips_only_that_cluster() {
        let mut fake = FakeEks {
            pages: vec![vec!["ghost".to_string(), "real".to_string()]],
            ..FakeEks::default()
        };
        fake.details.insert("real".to_string(), active("real"));

        let clusters = collect(Eks::with_api(fake, "us-east-1")).await;
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].name, "real");
    }

    #[tokio::test]
    async fn test_listing_failure_yields_nothing() {
        let fake = FakeEks {
            fail_listing: true,
            ..FakeEks::default()
        };
        assert!(collect(Eks::with_api(fake, "eu-west-1")).await.is_empty());
    }

    #[test]
    fn test_scope() {
        let eks = Eks::with_api(FakeEks::default(), "ap-south-2");
        assert_eq!(eks.scope(), "EKS region ap-south-2");
    }
}
