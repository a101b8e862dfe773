//! 用户注册表
//!
//! 用户名到在线记录的映射。记录只增不删：离线的名字保持被占用，
//! 这是有意为之的"身份保留"策略，代价是长期高流失场景下的内存增长。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use domain::{ConnectionId, DomainError, UserRecord, Username};

use crate::clock::Clock;

/// 用户注册表端口。
///
/// 所有修改操作相对彼此原子：同名并发注册最多一个成功。
#[async_trait]
pub trait UserRegistry: Send + Sync {
    /// 注册新用户名；与现存记录（含离线）冲突时返回 `UsernameTaken`。
    async fn register(&self, username: Username) -> Result<UserRecord, DomainError>;

    /// 已知用户绑定连接并置为在线；未知用户名静默忽略。
    async fn mark_online(&self, username: &str, connection: ConnectionId);

    /// 尝试把用户置为离线；只有连接匹配时生效，返回是否发生了切换。
    async fn mark_offline(&self, username: &str, connection: ConnectionId) -> bool;

    /// 按注册顺序返回全部记录（在线与离线）。
    async fn snapshot(&self) -> Vec<UserRecord>;
}

#[derive(Default)]
struct RegistryState {
    records: HashMap<String, UserRecord>,
    /// 注册顺序，快照按这个序列输出
    order: Vec<String>,
}

/// 内存实现的用户注册表。
pub struct InMemoryUserRegistry {
    state: RwLock<RegistryState>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(RegistryState::default()),
            clock,
        }
    }
}

#[async_trait]
impl UserRegistry for InMemoryUserRegistry {
    async fn register(&self, username: Username) -> Result<UserRecord, DomainError> {
        let now = self.clock.now();
        // 查重和插入在同一次写锁内完成
        let mut state = self.state.write().await;
        if state.records.contains_key(username.as_str()) {
            return Err(DomainError::UsernameTaken);
        }
        let record = UserRecord::register(username, now);
        let key = record.username.as_str().to_owned();
        state.order.push(key.clone());
        state.records.insert(key, record.clone());
        Ok(record)
    }

    async fn mark_online(&self, username: &str, connection: ConnectionId) {
        let mut state = self.state.write().await;
        if let Some(record) = state.records.get_mut(username) {
            record.bring_online(connection);
        }
    }

    async fn mark_offline(&self, username: &str, connection: ConnectionId) -> bool {
        let mut state = self.state.write().await;
        match state.records.get_mut(username) {
            Some(record) => record.take_offline(connection),
            None => false,
        }
    }

    async fn snapshot(&self) -> Vec<UserRecord> {
        let state = self.state.read().await;
        state
            .order
            .iter()
            .filter_map(|name| state.records.get(name))
            .cloned()
            .collect()
    }
}
