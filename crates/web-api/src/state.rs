use std::sync::Arc;

use application::{ChatService, LocalEventBroadcaster};

#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ChatService>,
    /// 具体类型而不是 trait 对象：连接任务需要 subscribe()
    pub broadcaster: LocalEventBroadcaster,
}

impl AppState {
    pub fn new(chat_service: Arc<ChatService>, broadcaster: LocalEventBroadcaster) -> Self {
        Self {
            chat_service,
            broadcaster,
        }
    }
}
