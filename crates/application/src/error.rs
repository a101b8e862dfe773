use domain::DomainError;
use thiserror::Error;

use crate::broadcaster::BroadcastError;

/// 应用层错误类型。
#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("broadcast error: {0}")]
    Broadcast(#[from] BroadcastError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// 创建内部错误：事件处理边界兜住的意外故障走这里
    pub fn internal(message: impl Into<String>) -> Self {
        ApplicationError::Internal(message.into())
    }
}
