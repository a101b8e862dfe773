// 进程内广播器实现
use crate::broadcaster::{BroadcastError, EventBroadcast, EventBroadcaster};
use async_trait::async_trait;
use tokio::sync::broadcast;

#[derive(Clone)]
pub struct LocalEventBroadcaster {
    sender: broadcast::Sender<EventBroadcast>,
}

impl LocalEventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventBroadcast> {
        self.sender.subscribe()
    }
}

#[async_trait]
impl EventBroadcaster for LocalEventBroadcaster {
    async fn broadcast(&self, payload: EventBroadcast) -> Result<(), BroadcastError> {
        // 一个订阅者都没有时 send 会失败，对尽力而为的投递这不算错误
        if self.sender.send(payload).is_err() {
            tracing::debug!("no active subscribers, event dropped");
        }
        Ok(())
    }
}
