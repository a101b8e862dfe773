use axum::{
    extract::{Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::Response,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use domain::{Message, RosterEntry};

use crate::{error::ApiError, state::AppState, ws_connection::WebSocketConnection};

#[derive(Debug, Deserialize)]
struct LoginPayload {
    username: String,
}

#[derive(Debug, Deserialize)]
struct MessagePayload {
    username: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct WsQuery {
    username: String,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(login))
        .route("/message", post(send_message))
        .route("/messages", get(get_messages))
        .route("/users", get(get_users))
        .route("/ws", get(websocket_upgrade))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> StatusCode {
    StatusCode::OK
}

/// 加入的注册半步：名字校验失败或冲突只回给请求者。
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> Result<(StatusCode, Json<RosterEntry>), ApiError> {
    let record = state.chat_service.register(&payload.username).await?;
    Ok((StatusCode::CREATED, Json(RosterEntry::from(&record))))
}

/// 发送消息：入库成功即对所有连接广播，响应里带入库后的消息。
async fn send_message(
    State(state): State<AppState>,
    Json(payload): Json<MessagePayload>,
) -> Result<Json<Message>, ApiError> {
    let stored = state
        .chat_service
        .send_message(&payload.username, &payload.message)
        .await?;
    Ok(Json(stored))
}

/// 消息缓冲区内容，最旧在前。新加入的连接不会自动收到历史，
/// 客户端需要时自行拉取。
async fn get_messages(State(state): State<AppState>) -> Json<Vec<Message>> {
    Json(state.chat_service.history().await)
}

/// 完整名单快照（在线与离线），按注册顺序。
async fn get_users(State(state): State<AppState>) -> Json<Vec<RosterEntry>> {
    let roster = state.chat_service.roster().await;
    Json(roster.iter().map(RosterEntry::from).collect())
}

/// 加入的连接半步：升级成功后绑定用户并触发名单广播。
async fn websocket_upgrade(
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<Response, ApiError> {
    let username = query.username.trim().to_owned();
    if username.is_empty() {
        return Err(ApiError::bad_request("username: cannot be empty"));
    }

    Ok(ws.on_upgrade(move |socket| WebSocketConnection::new(socket, state, username).run()))
}
