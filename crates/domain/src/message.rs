use crate::errors::{DomainError, DomainResult};
use crate::sanitize::sanitize;
use crate::value_objects::{format_timestamp, Timestamp};

/// 一条已入库的聊天消息，正文在构造时已完成转义。
///
/// `id` 由墙上时钟毫秒数导出，只保证单调不减，
/// 高频并发发送时可能出现重复值，仅用于排序和展示。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    pub id: i64,
    pub username: String,
    pub text: String,
    pub timestamp: String,
}

impl Message {
    /// 由原始输入构造消息：去除首尾空白、拒绝空正文、转义标记字符。
    pub fn compose(id: i64, username: &str, raw_text: &str, at: Timestamp) -> DomainResult<Self> {
        let trimmed = raw_text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::EmptyMessage);
        }
        Ok(Self {
            id,
            username: username.to_owned(),
            text: sanitize(trimmed),
            timestamp: format_timestamp(at),
        })
    }
}
