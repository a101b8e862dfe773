//! 有界消息日志
//!
//! 最近消息的有序缓冲区：只追加，容量满时淘汰最旧一条。
//! 容量自调节是唯一的背压手段，生产者永远不会被阻塞。

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::{DomainError, Message};

use crate::clock::Clock;

/// 默认容量。
pub const DEFAULT_MAX_MESSAGES: usize = 1000;

/// 消息日志端口。
#[async_trait]
pub trait MessageLog: Send + Sync {
    /// 净化并入库一条消息，返回入库后的内容供广播使用。
    /// 去除空白后为空的正文返回 `EmptyMessage`。
    async fn append(&self, username: &str, raw_text: &str) -> Result<Message, DomainError>;

    /// 缓冲区当前内容，最旧在前。
    async fn recent(&self) -> Vec<Message>;
}

struct LogState {
    messages: VecDeque<Message>,
    last_id: i64,
}

/// 内存实现的有界消息日志。
pub struct InMemoryMessageLog {
    state: RwLock<LogState>,
    capacity: usize,
    clock: Arc<dyn Clock>,
}

impl InMemoryMessageLog {
    pub fn new(capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(LogState {
                messages: VecDeque::new(),
                last_id: 0,
            }),
            capacity,
            clock,
        }
    }
}

#[async_trait]
impl MessageLog for InMemoryMessageLog {
    async fn append(&self, username: &str, raw_text: &str) -> Result<Message, DomainError> {
        let now = self.clock.now();
        // 追加和淘汰检查在同一次写锁内完成，保证顺序不被并发打乱
        let mut state = self.state.write().await;
        // 墙钟可能回拨，id 以上一条为下界保持单调不减
        let id = state.last_id.max(now.timestamp_millis());
        let message = Message::compose(id, username, raw_text, now)?;
        state.last_id = id;
        state.messages.push_back(message.clone());
        if state.messages.len() > self.capacity {
            state.messages.pop_front();
        }
        Ok(message)
    }

    async fn recent(&self) -> Vec<Message> {
        let state = self.state.read().await;
        state.messages.iter().cloned().collect()
    }
}
