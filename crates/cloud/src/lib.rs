//! Managed Kubernetes cluster discovery.
//!
//! Clusters are enumerated concurrently across every requested scope:
//!
//! - **AWS** - EKS, one scope per region
//! - **Azure** - AKS, one scope per subscription
//! - **GCP** - GKE, one scope per project/zone pair
//! - **`DigitalOcean`** - DOKS, one scope per region
//!
//! The [`Aggregator`] fans out over [`ClusterSource`]s and collects every
//! [`Cluster`] they report. [`AuthEnvironment`] supplies the kubeconfig
//! exec stanza for each cluster at write time.

pub mod aggregator;
pub mod auth;
pub mod cluster;
pub mod providers;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use aggregator::Aggregator;
pub use auth::{AuthEnvironment, AwsAuthTool, ExecConfig, ExecEnvVar, EXEC_API_VERSION};
pub use cluster::{Cluster, Provider, DEFAULT_CONTEXT_TEMPLATE};
pub use providers::{aws, azure, digitalocean, gcp, CloudProviderError, ClusterSource};
