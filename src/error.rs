//! Error types for asinfo-exporter
//!
//! This module defines the error types used throughout the application.

use thiserror::Error;

/// Application error type
///
/// Only raised during setup. The steady-state collection operations never
/// fail; see [`crate::collector::InfoClient`].
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Collector error
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Listener or socket error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Bind address could not be parsed
    #[error("Invalid bind_address '{0}'. Use an IP address (e.g., '0.0.0.0', '127.0.0.1') or 'localhost'.")]
    InvalidBindAddress(String),
}

/// Collector 모듈 에러 타입
///
/// Node 단위의 전송 실패를 나타냅니다. `ERROR:` 응답은 에러가 아니라 데이터로 취급됩니다.
#[derive(Error, Debug)]
pub enum CollectorError {
    /// 소켓 읽기/쓰기 실패
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// 타임아웃
    /// The value is the configured timeout in milliseconds, if known.
    #[error("Request timed out{}", .0.map(|ms| format!(" after {}ms", ms)).unwrap_or_default())]
    Timeout(Option<u64>),

    /// 연결 실패
    #[error("Connection to {address} failed: {reason}")]
    ConnectionFailed { address: String, reason: String },

    /// 프로토콜 헤더/본문 오류
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// 응답 크기 초과
    #[error("Info response of {0} bytes exceeds the allowed maximum")]
    ResponseTooLarge(u64),

    /// 클러스터가 이미 닫힘
    #[error("Cluster connection is closed")]
    ClusterClosed,

    /// 접속 가능한 seed 노드 없음
    #[error("None of the seed hosts could be reached: {0}")]
    NoSeedNodes(String),
}

impl CollectorError {
    /// 재시도 가능한 에러인지 확인
    ///
    /// The collector itself never retries; this is for callers that want
    /// to re-run a cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CollectorError::Io(_)
                | CollectorError::Timeout(..)
                | CollectorError::ConnectionFailed { .. }
        )
    }

    /// Create a Timeout error with known duration
    pub fn timeout_with_duration(ms: u64) -> Self {
        CollectorError::Timeout(Some(ms))
    }
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;
