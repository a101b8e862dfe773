//! 统一配置中心
//!
//! 提供应用的全局配置管理，包括：
//! - 服务监听地址
//! - 聊天引擎参数（消息缓冲容量、广播总线容量）
//!
//! 所有配置都可以用环境变量覆盖，缺省值适合本地开发。

use serde::{Deserialize, Serialize};
use std::env;

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
    /// 聊天引擎配置
    pub chat: ChatConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// 监听地址
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 聊天引擎配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// 消息日志容量，超出后按先进先出淘汰
    pub max_messages: usize,
    /// 广播总线容量，落后的订阅者会丢帧
    pub broadcast_capacity: usize,
}

impl AppConfig {
    /// 从环境变量加载配置；解析失败或变量缺失时使用缺省值
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
                port: env::var("SERVER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
            },
            chat: ChatConfig {
                max_messages: env::var("MAX_MESSAGES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
                broadcast_capacity: env::var("BROADCAST_CAPACITY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(1000),
            },
        }
    }
}
