//! Aerospike info 통계 수집 모듈
//!
//! 클러스터의 모든 노드에 info 요청을 보내고 응답을 노드별/네임스페이스별 맵으로 변환합니다.
//!
//! # Example
//!
//! ```ignore
//! use asinfo_exporter::cluster::StaticCluster;
//! use asinfo_exporter::collector::{CollectConfig, InfoClient};
//!
//! let cluster = StaticCluster::connect(&["127.0.0.1:3000".to_string()], timeout).await?;
//! let client = InfoClient::new(Arc::new(cluster), CollectConfig::default());
//! let stats = client.info().await;
//! let namespaces = client.namespace_info().await;
//! ```

mod client;
mod node;
mod parser;

use std::time::Duration;

pub use client::{InfoClient, CMD_NAMESPACES, CMD_NODE, CMD_STATISTICS};
pub use node::{ClusterView, Node};
pub use parser::{
    is_error_reply, namespace_command, namespace_names, parse_flat, parse_namespaces,
    reply_error, ClusterInfo, CollectResult, MetricsMap, NamespaceInfo, RawReply, ERROR_PREFIX,
};

/// 수집 설정
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// 노드 요청 타임아웃 (밀리초)
    pub timeout_ms: u64,
    /// 동시에 조회할 최대 노드 수
    pub max_concurrent_nodes: usize,
}

impl CollectConfig {
    /// Per-request timeout handed to every node
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            max_concurrent_nodes: 16,
        }
    }
}

impl From<&crate::config::ClusterConfig> for CollectConfig {
    fn from(config: &crate::config::ClusterConfig) -> Self {
        Self {
            timeout_ms: config.timeout_ms,
            max_concurrent_nodes: config.max_concurrent_nodes,
        }
    }
}
