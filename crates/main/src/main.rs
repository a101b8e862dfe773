//! 主应用程序入口
//!
//! 组装内存存储、时钟、广播器和聊天引擎，启动 Axum 服务。

use std::sync::Arc;

use application::{
    ChatService, ChatServiceDependencies, Clock, InMemoryMessageLog, InMemoryUserRegistry,
    LocalEventBroadcaster, SystemClock,
};
use config::AppConfig;
use tracing_subscriber::EnvFilter;
use web_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();

    // 存储与广播器的生命周期等于进程生命周期，这里一次性装配，
    // 之后只通过显式注入的引用访问，没有模块级单例
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let registry = Arc::new(InMemoryUserRegistry::new(clock.clone()));
    let message_log = Arc::new(InMemoryMessageLog::new(config.chat.max_messages, clock));
    let broadcaster = LocalEventBroadcaster::new(config.chat.broadcast_capacity);

    let chat_service = ChatService::new(ChatServiceDependencies {
        registry,
        message_log,
        broadcaster: Arc::new(broadcaster.clone()),
    });

    let state = AppState::new(Arc::new(chat_service), broadcaster);

    // 启动 Web 服务器
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.server.bind_address()).await?;

    tracing::info!("聊天服务器启动在 http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
