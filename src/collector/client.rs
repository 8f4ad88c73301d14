//! Cluster info 수집 클라이언트
//!
//! 모든 노드에 info 요청을 동시에 보내고 결과를 노드 이름 기준으로 병합합니다.
//! 한 노드의 실패는 해당 노드의 항목만 비우고 나머지 수집에는 영향을 주지 않습니다.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, instrument, warn};

use super::node::{ClusterView, Node};
use super::parser::{
    is_error_reply, namespace_command, namespace_names, parse_flat, parse_namespaces,
    reply_error, ClusterInfo, MetricsMap, NamespaceInfo,
};
use super::CollectConfig;

/// Info command returning the node's own name
pub const CMD_NODE: &str = "node";
/// Info command returning node-level statistics
pub const CMD_STATISTICS: &str = "statistics";
/// Info command listing the node's namespaces
pub const CMD_NAMESPACES: &str = "namespaces";

/// Info 수집 클라이언트
///
/// Holds no per-cycle state, so overlapping calls on a shared client are
/// independent of each other.
#[derive(Clone)]
pub struct InfoClient {
    cluster: Arc<dyn ClusterView>,
    config: CollectConfig,
}

impl InfoClient {
    /// 새 클라이언트 생성
    pub fn new(cluster: Arc<dyn ClusterView>, config: CollectConfig) -> Self {
        Self { cluster, config }
    }

    /// Node-level statistics for every node.
    ///
    /// Every node listed at the start of the cycle gets an entry; nodes
    /// whose request failed map to an empty metrics map.
    #[instrument(skip(self), name = "cluster_info")]
    pub async fn info(&self) -> ClusterInfo {
        let start = Instant::now();
        let nodes = self.list_nodes().await;
        let timeout = self.config.timeout();

        let info = fan_out(nodes, self.config.max_concurrent_nodes, move |node| async move {
            node_statistics(node.as_ref(), timeout).await
        })
        .await;

        debug!(
            nodes = info.len(),
            empty = info.values().filter(|m| m.is_empty()).count(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Cluster info collection complete"
        );

        info
    }

    /// Per-namespace statistics for every node.
    ///
    /// Nodes whose requests failed map to an empty inner mapping.
    #[instrument(skip(self), name = "namespace_info")]
    pub async fn namespace_info(&self) -> NamespaceInfo {
        let start = Instant::now();
        let nodes = self.list_nodes().await;
        let timeout = self.config.timeout();

        let info = fan_out(nodes, self.config.max_concurrent_nodes, move |node| async move {
            node_namespaces(node.as_ref(), timeout).await
        })
        .await;

        debug!(
            nodes = info.len(),
            namespaces = info.values().map(HashMap::len).sum::<usize>(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Namespace info collection complete"
        );

        info
    }

    /// 클러스터 연결 해제
    pub async fn close(&self) {
        self.cluster.close().await;
    }

    async fn list_nodes(&self) -> Vec<Arc<dyn Node>> {
        match self.cluster.nodes().await {
            Ok(nodes) => nodes,
            Err(e) => {
                warn!(error = %e, "Failed to list cluster nodes");
                Vec::new()
            }
        }
    }
}

/// Run `task` for every node with at most `limit` in flight and key the
/// results by node name.
///
/// A node whose task panicked still gets a default entry.
async fn fan_out<T, F, Fut>(nodes: Vec<Arc<dyn Node>>, limit: usize, task: F) -> HashMap<String, T>
where
    T: Default + Send + 'static,
    F: Fn(Arc<dyn Node>) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(limit.max(1)));
    let mut join_set = JoinSet::new();
    let mut names = Vec::with_capacity(nodes.len());

    for node in nodes {
        let name = node.name();
        names.push(name.clone());

        let semaphore = Arc::clone(&semaphore);
        let work = task(node);
        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            (name, work.await)
        });
    }

    let mut results = HashMap::with_capacity(names.len());
    while let Some(joined) = join_set.join_next().await {
        match joined {
            Ok((name, value)) => {
                results.insert(name, value);
            }
            Err(e) => error!(error = %e, "Node collection task failed"),
        }
    }

    for name in names {
        results.entry(name).or_default();
    }

    results
}

async fn node_statistics(node: &dyn Node, timeout: Duration) -> MetricsMap {
    let name = node.name();
    let commands = [CMD_NODE.to_string(), CMD_STATISTICS.to_string()];

    let reply = match node.request_info(&commands, timeout).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                node = %name,
                error = %e,
                retryable = e.is_retryable(),
                "Failed to collect node statistics"
            );
            return MetricsMap::new();
        }
    };

    if let Some(err) = reply_error(&reply) {
        debug!(node = %name, error = %err, "Statistics request rejected by node");
        return MetricsMap::new();
    }

    if let Some(reported) = reply.get(CMD_NODE) {
        let reported = reported.trim();
        if !reported.is_empty() && reported != name {
            warn!(node = %name, reported = %reported, "Node reported a different name");
        }
    }

    match reply.get(CMD_STATISTICS) {
        Some(line) if is_error_reply(line) => {
            debug!(node = %name, error = %line.trim(), "Statistics returned error");
            MetricsMap::new()
        }
        Some(line) => parse_flat(line),
        None => MetricsMap::new(),
    }
}

async fn node_namespaces(node: &dyn Node, timeout: Duration) -> HashMap<String, MetricsMap> {
    let name = node.name();

    let listing = match node.request_info(&[CMD_NAMESPACES.to_string()], timeout).await {
        Ok(reply) => {
            if let Some(err) = reply_error(&reply) {
                debug!(node = %name, error = %err, "Namespace listing rejected by node");
                return HashMap::new();
            }
            reply.get(CMD_NAMESPACES).cloned().unwrap_or_default()
        }
        Err(e) => {
            warn!(
                node = %name,
                error = %e,
                retryable = e.is_retryable(),
                "Failed to list namespaces"
            );
            return HashMap::new();
        }
    };

    let names = namespace_names(&listing);
    if names.is_empty() {
        debug!(node = %name, "Node reported no namespaces");
        return HashMap::new();
    }

    let commands: Vec<String> = names.iter().map(|n| namespace_command(n)).collect();
    match node.request_info(&commands, timeout).await {
        Ok(reply) => parse_namespaces(&names, &reply),
        Err(e) => {
            warn!(
                node = %name,
                namespaces = names.len(),
                error = %e,
                "Failed to collect namespace statistics"
            );
            HashMap::new()
        }
    }
}
