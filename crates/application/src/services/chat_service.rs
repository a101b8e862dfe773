//! 在线状态与广播引擎
//!
//! 对注册表和消息日志的每次变更在这里编排，并决定把哪些事件
//! 扇出给哪些连接。错误只回给发起请求的一方；广播发完即忘，
//! 一次变更提交后对应的广播无条件尝试，不重试、不排队。

use std::sync::Arc;

use domain::{ConnectionId, Message, ServerEvent, UserRecord, Username};

use crate::{
    broadcaster::{EventBroadcast, EventBroadcaster},
    error::ApplicationError,
    message_log::MessageLog,
    registry::UserRegistry,
};

/// 引擎的外部依赖，构造时显式注入，没有任何全局状态。
pub struct ChatServiceDependencies {
    pub registry: Arc<dyn UserRegistry>,
    pub message_log: Arc<dyn MessageLog>,
    pub broadcaster: Arc<dyn EventBroadcaster>,
}

pub struct ChatService {
    deps: ChatServiceDependencies,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        Self { deps }
    }

    /// 加入的第一步：校验并注册用户名。
    ///
    /// 校验失败和重名只回给请求者，不产生任何广播。
    pub async fn register(&self, raw_username: &str) -> Result<UserRecord, ApplicationError> {
        let username = Username::parse(raw_username)?;
        let record = self.deps.registry.register(username).await?;

        tracing::info!(username = %record.username, "用户注册成功");
        Ok(record)
    }

    /// 加入的第二步：传输连接就位后绑定用户，并向所有连接
    /// （包括刚加入的这个）广播完整名单快照。
    ///
    /// 没有走注册路径的名字在注册表层面被静默忽略，快照照常广播。
    pub async fn attach(
        &self,
        username: &str,
        connection: ConnectionId,
    ) -> Result<(), ApplicationError> {
        self.deps.registry.mark_online(username, connection).await;
        tracing::info!(username, connection_id = %connection, "连接已绑定");
        self.broadcast_roster().await
    }

    /// 发送消息：入库后向所有连接广播，发送者依赖自己的回声
    /// 更新本地视图（按用户名区分"自己的"消息，而不是靠压制回声）。
    pub async fn send_message(
        &self,
        username: &str,
        text: &str,
    ) -> Result<Message, ApplicationError> {
        let stored = self.deps.message_log.append(username, text).await?;

        self.deps
            .broadcaster
            .broadcast(EventBroadcast::to_all(ServerEvent::message(&stored)))
            .await?;
        Ok(stored)
    }

    /// 转发打字开始信号给除发送者外的所有连接。
    /// 空闲超时由客户端计时，引擎只转发收到的信号。
    pub async fn typing(
        &self,
        username: &str,
        connection: ConnectionId,
    ) -> Result<(), ApplicationError> {
        self.deps
            .broadcaster
            .broadcast(EventBroadcast::except(
                connection,
                ServerEvent::user_typing(username),
            ))
            .await?;
        Ok(())
    }

    /// 转发打字停止信号给除发送者外的所有连接。
    pub async fn stop_typing(
        &self,
        username: &str,
        connection: ConnectionId,
    ) -> Result<(), ApplicationError> {
        self.deps
            .broadcaster
            .broadcast(EventBroadcast::except(
                connection,
                ServerEvent::user_stop_typing(username),
            ))
            .await?;
        Ok(())
    }

    /// 断开：显式登出和传输层掉线都走这里。
    ///
    /// 只有当前绑定的连接才会触发离线切换和名单广播，被顶替的
    /// 旧连接断开时什么都不发生。用户名不释放，之后同名注册
    /// 仍然返回 `UsernameTaken`。
    pub async fn disconnect(
        &self,
        username: &str,
        connection: ConnectionId,
    ) -> Result<(), ApplicationError> {
        if self.deps.registry.mark_offline(username, connection).await {
            tracing::info!(username, connection_id = %connection, "用户已离线");
            self.broadcast_roster().await?;
        }
        Ok(())
    }

    /// 完整名单快照，按注册顺序（在线与离线都含，调用方自行过滤）。
    pub async fn roster(&self) -> Vec<UserRecord> {
        self.deps.registry.snapshot().await
    }

    /// 消息缓冲区当前内容，最旧在前。
    pub async fn history(&self) -> Vec<Message> {
        self.deps.message_log.recent().await
    }

    async fn broadcast_roster(&self) -> Result<(), ApplicationError> {
        let snapshot = self.deps.registry.snapshot().await;
        self.deps
            .broadcaster
            .broadcast(EventBroadcast::to_all(ServerEvent::users_update(&snapshot)))
            .await?;
        Ok(())
    }
}
