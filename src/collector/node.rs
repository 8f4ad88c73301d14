//! Cluster access traits
//!
//! The collector talks to the cluster only through these two traits, so it
//! can be driven by the TCP transport in [`crate::cluster`] or by in-memory
//! doubles in tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::parser::{CollectResult, RawReply};

/// A single cluster member that answers info requests
#[async_trait]
pub trait Node: Send + Sync {
    /// Stable name of the node for the current cycle
    fn name(&self) -> String;

    /// Send all `commands` in one round trip.
    ///
    /// Returns one entry per answered command. Fails only when the round
    /// trip itself could not complete within `timeout`.
    async fn request_info(&self, commands: &[String], timeout: Duration) -> CollectResult<RawReply>;
}

/// Source of the current node list
#[async_trait]
pub trait ClusterView: Send + Sync {
    /// Current cluster members.
    ///
    /// Fails with [`crate::error::CollectorError::ClusterClosed`] once
    /// [`ClusterView::close`] has been called.
    async fn nodes(&self) -> CollectResult<Vec<Arc<dyn Node>>>;

    /// Release every underlying connection
    async fn close(&self);
}
