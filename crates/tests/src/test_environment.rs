//! 测试环境装配
//!
//! 每个测试拿到一套完全独立的引擎和路由，相互之间没有共享状态。

use std::net::SocketAddr;
use std::sync::Arc;

use application::{
    ChatService, ChatServiceDependencies, Clock, InMemoryMessageLog, InMemoryUserRegistry,
    LocalEventBroadcaster, SystemClock,
};
use axum::Router;
use web_api::{router, AppState};

pub struct TestEnvironment {
    pub state: AppState,
    pub broadcaster: LocalEventBroadcaster,
}

impl TestEnvironment {
    /// 用生产环境同样的装配方式搭一套内存引擎。
    pub fn new() -> Self {
        Self::with_max_messages(1000)
    }

    pub fn with_max_messages(max_messages: usize) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let registry = Arc::new(InMemoryUserRegistry::new(clock.clone()));
        let message_log = Arc::new(InMemoryMessageLog::new(max_messages, clock));
        let broadcaster = LocalEventBroadcaster::new(64);

        let chat_service = ChatService::new(ChatServiceDependencies {
            registry,
            message_log,
            broadcaster: Arc::new(broadcaster.clone()),
        });

        Self {
            state: AppState::new(Arc::new(chat_service), broadcaster.clone()),
            broadcaster,
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    /// 把应用跑在随机端口上，返回监听地址。
    pub async fn start_app(&self) -> anyhow::Result<SocketAddr> {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let app = self.router();

        tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, app).await {
                eprintln!("test server exited: {err}");
            }
        });

        Ok(addr)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
