use async_trait::async_trait;
use domain::{ConnectionId, ServerEvent};
use thiserror::Error;

/// 一次广播的接收范围。
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Audience {
    /// 所有连接
    All,
    /// 除指定连接外的所有连接（打字信号不回给发送者）
    Except(ConnectionId),
}

/// 放上广播总线的载荷：事件加上接收范围。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct EventBroadcast {
    pub audience: Audience,
    pub event: ServerEvent,
}

impl EventBroadcast {
    pub fn to_all(event: ServerEvent) -> Self {
        Self {
            audience: Audience::All,
            event,
        }
    }

    pub fn except(connection: ConnectionId, event: ServerEvent) -> Self {
        Self {
            audience: Audience::Except(connection),
            event,
        }
    }

    /// 判断载荷是否应投递给指定连接。
    pub fn is_visible_to(&self, connection: ConnectionId) -> bool {
        match self.audience {
            Audience::All => true,
            Audience::Except(excluded) => excluded != connection,
        }
    }
}

#[derive(Debug, Error)]
pub enum BroadcastError {
    #[error("broadcast failed: {0}")]
    Failed(String),
}

impl BroadcastError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

/// 事件广播端口。
///
/// 投递是尽力而为、发完即忘：不可达的连接收不到这一帧，
/// 引擎不重试也不为单个客户端排队。
#[async_trait]
pub trait EventBroadcaster: Send + Sync {
    async fn broadcast(&self, payload: EventBroadcast) -> Result<(), BroadcastError>;
}
