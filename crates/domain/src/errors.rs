//! 领域错误定义。

use thiserror::Error;

/// 领域层错误类型。
///
/// 所有变体都是调用方可恢复的业务错误，直接回给发起请求的连接。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 输入校验失败
    #[error("{field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    /// 用户名已被占用（包括已离线的记录，名字在进程生命周期内不释放）
    #[error("username already taken")]
    UsernameTaken,

    /// 消息去除首尾空白后为空
    #[error("message is empty")]
    EmptyMessage,
}

impl DomainError {
    /// 创建校验错误
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// 领域层结果类型。
pub type DomainResult<T> = Result<T, DomainError>;
