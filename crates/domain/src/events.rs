//! 出入站事件定义
//!
//! 每个事件都是带固定模式的 tagged 变体，在传输边界完成校验后
//! 才会进入引擎；引擎自身不接触任何松散的 JSON。

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::user::UserRecord;
use crate::value_objects::format_timestamp;

/// 客户端经由 WebSocket 发来的事件。
///
/// 加入（join）走 HTTP 注册加连接升级两步，发送消息走 HTTP，
/// 所以这里只剩打字信号和显式登出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// 打字开始信号
    Typing,
    /// 打字停止信号（客户端侧 1 秒空闲计时器触发）
    StopTyping,
    /// 显式登出
    Logout,
}

/// 在线名单里的一项，按注册顺序排列。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub username: String,
    #[serde(rename = "joinedAt")]
    pub joined_at: String,
    pub online: bool,
}

impl From<&UserRecord> for RosterEntry {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.username.as_str().to_owned(),
            joined_at: format_timestamp(record.joined_at),
            online: record.online,
        }
    }
}

/// 服务端广播给客户端的事件。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// 新消息，发给所有连接（包括发送者自己的回声）
    Message {
        id: i64,
        username: String,
        text: String,
        timestamp: String,
    },

    /// 完整在线名单快照，发给所有连接
    UsersUpdate { users: Vec<RosterEntry> },

    /// 某用户正在打字，发给除发送者外的所有连接
    UserTyping { username: String },

    /// 某用户停止打字，发给除发送者外的所有连接
    UserStopTyping { username: String },

    /// 错误回复，只发给发起请求的连接
    Error { error: String },
}

impl ServerEvent {
    /// 由已入库的消息构造广播事件
    pub fn message(message: &Message) -> Self {
        ServerEvent::Message {
            id: message.id,
            username: message.username.clone(),
            text: message.text.clone(),
            timestamp: message.timestamp.clone(),
        }
    }

    /// 由注册表快照构造在线名单事件
    pub fn users_update(records: &[UserRecord]) -> Self {
        ServerEvent::UsersUpdate {
            users: records.iter().map(RosterEntry::from).collect(),
        }
    }

    pub fn user_typing(username: impl Into<String>) -> Self {
        ServerEvent::UserTyping {
            username: username.into(),
        }
    }

    pub fn user_stop_typing(username: impl Into<String>) -> Self {
        ServerEvent::UserStopTyping {
            username: username.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerEvent::Error {
            error: message.into(),
        }
    }

    /// 获取事件类型名称（用于日志）
    pub fn event_type(&self) -> &'static str {
        match self {
            ServerEvent::Message { .. } => "message",
            ServerEvent::UsersUpdate { .. } => "users_update",
            ServerEvent::UserTyping { .. } => "user_typing",
            ServerEvent::UserStopTyping { .. } => "user_stop_typing",
            ServerEvent::Error { .. } => "error",
        }
    }
}
