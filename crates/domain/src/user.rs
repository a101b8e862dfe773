use crate::value_objects::{ConnectionId, Timestamp, Username};

/// 一个聊天用户的在线状态记录。
///
/// 记录在首次注册成功时创建，之后只有 `online` 和连接绑定会变化；
/// 进程存活期间记录永不删除，离线的名字保持被占用状态。
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct UserRecord {
    pub username: Username,
    pub joined_at: Timestamp,
    pub online: bool,
    #[serde(skip)] // 连接引用只在进程内有意义，不暴露给客户端
    pub connection: Option<ConnectionId>,
}

impl UserRecord {
    /// 首次注册：记录立刻处于在线状态，连接在传输层随后绑定。
    pub fn register(username: Username, now: Timestamp) -> Self {
        Self {
            username,
            joined_at: now,
            online: true,
            connection: None,
        }
    }

    /// 绑定新的传输连接；同名重连会顶替旧连接的绑定。
    pub fn bring_online(&mut self, connection: ConnectionId) {
        self.online = true;
        self.connection = Some(connection);
    }

    /// 只有当前绑定的连接才能把用户置为离线。
    ///
    /// 被顶替的旧连接之后断开时不再匹配，这里返回 false，
    /// 用户保持在线。返回值表示记录是否真的发生了状态切换。
    pub fn take_offline(&mut self, connection: ConnectionId) -> bool {
        if self.connection != Some(connection) {
            return false;
        }
        self.connection = None;
        self.online = false;
        true
    }
}
