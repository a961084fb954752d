//! Concurrent fan-out over cluster sources with a single fan-in stream.
//!
//! Every scope gets its own producer task writing into a bounded channel.
//! A drain task per scope forwards that channel into the shared output
//! channel, and a watcher task drops the last output sender once every
//! drain has finished, which is what ends the caller's receive loop.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::cluster::Cluster;
use crate::providers::ClusterSource;

/// Capacity of the per-scope and shared channels.
const CHANNEL_CAPACITY: usize = 64;

/// Collects clusters from many scopes concurrently.
pub struct Aggregator {
    sources: Vec<Box<dyn ClusterSource>>,
    scope_timeout: Option<Duration>,
}

impl Aggregator {
    /// Create an aggregator over `sources`.
    #[must_use]
    pub fn new(sources: Vec<Box<dyn ClusterSource>>) -> Self {
        Self {
            sources,
            scope_timeout: None,
        }
    }

    /// Abandon any scope still running after `timeout`.
    ///
    /// Clusters it already produced are kept.
    #[must_use]
    pub fn with_scope_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.scope_timeout = timeout;
        self
    }

    /// Number of scopes that will be queried.
    #[must_use]
    pub fn scope_count(&self) -> usize {
        self.sources.len()
    }

    /// Query every scope and return all clusters found.
    pub async fn discover(self) -> Vec<Cluster> {
        self.discover_with(|_| {}).await
    }

    /// Query every scope, running `on_cluster` on each cluster as it
    /// arrives, before it is collected.
    ///
    /// Completes once every scope has finished, failed or timed out. The
    /// order of the result is unspecified.
    pub async fn discover_with<F>(self, mut on_cluster: F) -> Vec<Cluster>
    where
        F: FnMut(&mut Cluster),
    {
        let scopes = self.sources.len();
        let mut clusters = Vec::new();
        if scopes == 0 {
            debug!("No scopes to query");
            return clusters;
        }

        let (out_tx, mut out_rx) = mpsc::channel::<Cluster>(CHANNEL_CAPACITY);
        let mut drains = JoinSet::new();

        for source in self.sources {
            let scope = source.scope();
            let (scope_tx, mut scope_rx) = mpsc::channel::<Cluster>(CHANNEL_CAPACITY);
            tokio::spawn(produce(source, scope_tx, self.scope_timeout));

            let out = out_tx.clone();
            drains.spawn(async move {
                let mut forwarded = 0usize;
                while let Some(cluster) = scope_rx.recv().await {
                    if out.send(cluster).await.is_err() {
                        break;
                    }
                    forwarded += 1;
                }
                debug!(scope = %scope, clusters = forwarded, "Scope drained");
            });
        }

        tokio::spawn(async move {
            while let Some(result) = drains.join_next().await {
                if let Err(e) = result {
                    warn!(error = %e, "Drain task failed");
                }
            }
            drop(out_tx);
        });

        while let Some(mut cluster) = out_rx.recv().await {
            on_cluster(&mut cluster);
            clusters.push(cluster);
        }

        info!(scopes, clusters = clusters.len(), "Discovery finished");
        clusters
    }
}

async fn produce(
    source: Box<dyn ClusterSource>,
    sink: mpsc::Sender<Cluster>,
    timeout: Option<Duration>,
) {
    let scope = source.scope();
    debug!(scope = %scope, "Querying scope");
    match timeout {
        Some(limit) => {
            if tokio::time::timeout(limit, source.get_clusters(sink))
                .await
                .is_err()
            {
                warn!(scope = %scope, timeout_secs = limit.as_secs(), "Scope query timed out");
            }
        }
        None => source.get_clusters(sink).await,
    }
}
