//! 聊天代理核心领域模型
//!
//! 包含用户在线记录、消息实体、正文净化函数，
//! 以及出入站事件的固定模式（tagged enum）定义。

pub mod errors;
pub mod events;
pub mod message;
pub mod sanitize;
pub mod user;
pub mod value_objects;

pub use errors::{DomainError, DomainResult};
pub use events::{ClientEvent, RosterEntry, ServerEvent};
pub use message::Message;
pub use sanitize::sanitize;
pub use user::UserRecord;
pub use value_objects::{format_timestamp, ConnectionId, Timestamp, Username};
