//! 应用层实现。
//!
//! 围绕领域模型提供用例服务：用户注册表与消息日志的内存存储、
//! 时钟与广播端口，以及编排这一切的在线状态与广播引擎。

pub mod broadcaster;
pub mod clock;
pub mod error;
pub mod local_broadcast;
pub mod message_log;
pub mod registry;
pub mod services;

pub use broadcaster::{Audience, BroadcastError, EventBroadcast, EventBroadcaster};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::ApplicationError;
pub use local_broadcast::LocalEventBroadcaster;
pub use message_log::{InMemoryMessageLog, MessageLog, DEFAULT_MAX_MESSAGES};
pub use registry::{InMemoryUserRegistry, UserRegistry};
pub use services::{ChatService, ChatServiceDependencies};
