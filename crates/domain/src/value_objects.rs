use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

/// 按秒精度格式化时间戳（`YYYY-MM-DD HH:MM:SS`，UTC）。
pub fn format_timestamp(at: Timestamp) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 用户名长度上限（字符数）。
pub const MAX_USERNAME_CHARS: usize = 20;

/// 正文转义所针对的标记字符，用户名里直接拒绝。
const FORBIDDEN_USERNAME_CHARS: &[char] = &['<', '>', '"', '\''];

/// 经过验证的用户名。
///
/// 大小写敏感，作为注册表的唯一键使用。构造时去除首尾空白，
/// 并拒绝包含标记字符的名字，这样用户名进入广播载荷前不需要再转义。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_owned();
        if value.is_empty() {
            return Err(DomainError::invalid_argument("username", "cannot be empty"));
        }
        if value.chars().count() > MAX_USERNAME_CHARS {
            return Err(DomainError::invalid_argument("username", "too long"));
        }
        if value.contains(FORBIDDEN_USERNAME_CHARS) {
            return Err(DomainError::invalid_argument(
                "username",
                "contains markup characters",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 单个传输连接的唯一标识。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for ConnectionId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl From<ConnectionId> for Uuid {
    fn from(value: ConnectionId) -> Self {
        value.0
    }
}
