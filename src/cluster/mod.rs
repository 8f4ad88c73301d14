//! Cluster transport
//!
//! Concrete [`ClusterView`] and [`Node`] implementations speaking the info
//! protocol over TCP.

pub mod connection;
pub mod protocol;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::collector::{ClusterView, CollectResult, Node};
use crate::error::CollectorError;

pub use connection::TcpNode;

/// One configured seed host and its node, once reached
struct Seed {
    address: String,
    node: Mutex<Option<Arc<TcpNode>>>,
}

/// Cluster view over a fixed list of seed hosts
///
/// Seeds that cannot be reached are retried every time the node list is
/// requested, so a node that was down at startup joins once it answers.
pub struct StaticCluster {
    seeds: Vec<Seed>,
    timeout: Duration,
    closed: AtomicBool,
}

impl StaticCluster {
    /// Connect to every host in `hosts` (`host:port`).
    ///
    /// Unreachable hosts are logged and kept for later attempts. Hosts that
    /// turn out to be the same node are listed once.
    ///
    /// # Errors
    /// Returns `NoSeedNodes` when no host could be reached
    pub async fn connect(hosts: &[String], timeout: Duration) -> CollectResult<Self> {
        let cluster = Self {
            seeds: hosts
                .iter()
                .map(|address| Seed {
                    address: address.clone(),
                    node: Mutex::new(None),
                })
                .collect(),
            timeout,
            closed: AtomicBool::new(false),
        };

        let connected = cluster.connect_pending(true).await;
        if connected == 0 {
            return Err(CollectorError::NoSeedNodes(hosts.join(",")));
        }

        info!(
            nodes = connected,
            seeds = hosts.len(),
            "Connected to cluster"
        );

        Ok(cluster)
    }

    /// Try every seed that has no node yet; returns how many are connected
    /// afterwards.
    async fn connect_pending(&self, startup: bool) -> usize {
        let mut join_set = JoinSet::new();
        let mut connected = 0;

        for (index, seed) in self.seeds.iter().enumerate() {
            if seed.node.lock().await.is_some() {
                connected += 1;
                continue;
            }

            let address = seed.address.clone();
            let timeout = self.timeout;
            join_set.spawn(async move {
                let result = TcpNode::connect(&address, timeout).await;
                (index, address, result)
            });
        }

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((index, _, Ok(node))) => {
                    let mut slot = self.seeds[index].node.lock().await;
                    if self.is_closed() {
                        node.close().await;
                    } else if slot.is_none() {
                        if !startup {
                            info!(node = %node.name(), address = %node.address(), "Seed host joined");
                        }
                        *slot = Some(Arc::new(node));
                        connected += 1;
                    }
                }
                Ok((_, host, Err(e))) if startup => {
                    warn!(
                        host = %host,
                        error = %e,
                        retryable = e.is_retryable(),
                        "Failed to connect to seed host"
                    );
                }
                Ok((_, host, Err(e))) => {
                    debug!(host = %host, error = %e, "Seed host still unreachable");
                }
                Err(e) => warn!(error = %e, "Seed connection task failed"),
            }
        }

        connected
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl ClusterView for StaticCluster {
    async fn nodes(&self) -> CollectResult<Vec<Arc<dyn Node>>> {
        if self.is_closed() {
            return Err(CollectorError::ClusterClosed);
        }

        self.connect_pending(false).await;

        // configuration order; the first seed of a node wins
        let mut seen = HashSet::new();
        let mut nodes: Vec<Arc<dyn Node>> = Vec::with_capacity(self.seeds.len());
        for seed in &self.seeds {
            if let Some(node) = seed.node.lock().await.as_ref() {
                if seen.insert(node.name()) {
                    nodes.push(Arc::clone(node) as Arc<dyn Node>);
                } else {
                    debug!(node = %node.name(), address = %seed.address, "Duplicate seed for node");
                }
            }
        }

        if self.is_closed() {
            return Err(CollectorError::ClusterClosed);
        }

        Ok(nodes)
    }

    async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        for seed in &self.seeds {
            if let Some(node) = seed.node.lock().await.as_ref() {
                node.close().await;
            }
        }

        info!("Cluster connections closed");
    }
}
