//! 领域层统一错误定义
//!
//! 聚焦仓储、事件存储、命令与状态校验等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 仓储/持久化 ---
    #[error("event store error: {reason}")]
    EventStore { reason: String },
    #[error("repository error: {reason}")]
    Repository { reason: String },
    #[error("version conflict: stream={stream}, expected={expected}, actual={actual}")]
    VersionConflict {
        stream: String,
        expected: usize,
        actual: usize,
    },

    // --- 领域规则/命令与状态 ---
    #[error("invalid command: {reason}")]
    InvalidCommand { reason: String },
    #[error("invalid state: {reason}")]
    InvalidState { reason: String },
    #[error("not found: {reason}")]
    NotFound { reason: String },

    // --- 通用 ---
    #[error("operation cancelled")]
    Cancelled,
}

impl DomainError {
    pub fn event_store(reason: impl Into<String>) -> Self {
        DomainError::EventStore {
            reason: reason.into(),
        }
    }

    pub fn invalid_command(reason: impl Into<String>) -> Self {
        DomainError::InvalidCommand {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        DomainError::InvalidState {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
