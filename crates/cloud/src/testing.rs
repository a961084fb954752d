//! Test fixtures: mock clusters and an in-memory cluster source.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::cluster::{Cluster, Provider};
use crate::providers::ClusterSource;

static BATCH: AtomicUsize = AtomicUsize::new(0);

const PEM: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIBfake\n-----END CERTIFICATE-----\n";

fn mock_cluster(tag: &str, index: usize) -> Cluster {
    Cluster {
        provider: Provider::None,
        name: format!("cluster-{tag}-{index}"),
        region: format!("region-{}", index % 3),
        id: format!("id-{tag}-{index}"),
        endpoint: format!("https://{tag}-{index}.example.test"),
        certificate_authority_data: PEM.to_vec(),
        status: "RUNNING".to_string(),
    }
}

/// `count` clusters whose identities differ from every other call.
#[must_use]
pub fn mock_clusters(count: usize) -> Vec<Cluster> {
    let batch = BATCH.fetch_add(1, Ordering::Relaxed);
    let tag = format!("b{batch}");
    (0..count).map(|i| mock_cluster(&tag, i)).collect()
}

/// `count` clusters with the same identities on every call.
#[must_use]
pub fn predictable_mock_clusters(count: usize) -> Vec<Cluster> {
    (0..count).map(|i| mock_cluster("fixed", i)).collect()
}

/// Cluster source that replays a fixed list.
pub struct FakeSource {
    scope: String,
    clusters: Vec<Cluster>,
    fail: Failure,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Failure {
    None,
    Immediately,
    AfterEmitting,
}

impl FakeSource {
    /// Source that emits `clusters` and finishes.
    pub fn new(scope: impl Into<String>, clusters: Vec<Cluster>) -> Self {
        Self {
            scope: scope.into(),
            clusters,
            fail: Failure::None,
        }
    }

    /// Source whose listing fails before producing anything.
    pub fn failing(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            clusters: Vec::new(),
            fail: Failure::Immediately,
        }
    }

    /// Emit the configured clusters, then fail.
    #[must_use]
    pub fn fail_after_emitting(mut self) -> Self {
        self.fail = Failure::AfterEmitting;
        self
    }
}

#[async_trait]
impl ClusterSource for FakeSource {
    fn scope(&self) -> String {
        self.scope.clone()
    }

    async fn get_clusters(&self, sink: mpsc::Sender<Cluster>) {
        if self.fail == Failure::Immediately {
            warn!(scope = %self.scope, "Simulated listing failure");
            return;
        }
        for cluster in &self.clusters {
            if sink.send(cluster.clone()).await.is_err() {
                return;
            }
        }
        if self.fail == Failure::AfterEmitting {
            warn!(scope = %self.scope, "Simulated failure after partial results");
        }
    }
}
