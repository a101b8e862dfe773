//! Web API 层。
//!
//! 提供 Axum 路由，把 HTTP / WebSocket 请求委托给应用层的聊天引擎。
//! 这一层负责出入站事件的模式校验：引擎只见到结构化的事件。

mod error;
mod routes;
mod state;
mod ws_connection;

pub use error::ApiError;
pub use routes::router;
pub use state::AppState;
