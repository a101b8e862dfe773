use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast::error::RecvError, mpsc};

use domain::{ClientEvent, ConnectionId, ServerEvent};

use crate::state::AppState;

/// 单个 WebSocket 连接的生命周期。
///
/// 升级完成即视为加入流程的连接绑定半步：先订阅广播总线，
/// 再绑定用户并触发名单快照。之后转发客户端的打字与登出
/// 信号；连接结束（登出、关闭帧或传输层掉线）统一走断开流程。
pub struct WebSocketConnection {
    socket: WebSocket,
    state: AppState,
    username: String,
    connection_id: ConnectionId,
}

/// WebSocket 写操作命令，统一经由发送任务落到 sender 上
#[derive(Debug)]
enum WsCommand {
    SendText(String),
    SendPong(Vec<u8>),
}

impl WebSocketConnection {
    pub fn new(socket: WebSocket, state: AppState, username: String) -> Self {
        Self {
            socket,
            state,
            username,
            connection_id: ConnectionId::new(),
        }
    }

    /// 连接主循环。
    pub async fn run(self) {
        let WebSocketConnection {
            socket,
            state,
            username,
            connection_id,
        } = self;

        tracing::info!(username, connection_id = %connection_id, "WebSocket 连接已建立");

        // 先订阅再绑定，保证自己的加入快照也投递到本连接
        let mut events = state.broadcaster.subscribe();

        if let Err(err) = state.chat_service.attach(&username, connection_id).await {
            tracing::error!(error = %err, username, "连接绑定失败");
            return;
        }

        let (mut sender, mut incoming) = socket.split();
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<WsCommand>(32);

        // 发送任务：统一处理所有对 sender 的写操作
        let mut send_task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        let frame = match cmd {
                            WsCommand::SendText(text) => WsMessage::Text(text.into()),
                            WsCommand::SendPong(data) => WsMessage::Pong(data.into()),
                        };
                        if sender.send(frame).await.is_err() {
                            break;
                        }
                    }
                    event = events.recv() => {
                        let payload = match event {
                            Ok(payload) => payload,
                            // 落后被总线挤掉的帧直接跳过：投递是尽力而为的
                            Err(RecvError::Lagged(skipped)) => {
                                tracing::warn!(skipped, connection_id = %connection_id, "连接消费过慢，部分事件被丢弃");
                                continue;
                            }
                            Err(RecvError::Closed) => break,
                        };
                        if !payload.is_visible_to(connection_id) {
                            continue;
                        }
                        let json = match serde_json::to_string(&payload.event) {
                            Ok(json) => json,
                            Err(err) => {
                                tracing::warn!(error = %err, "failed to serialize websocket payload");
                                continue;
                            }
                        };
                        if sender.send(WsMessage::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        // 接收任务：处理来自客户端的帧
        let recv_state = state.clone();
        let recv_username = username.clone();
        let mut recv_task = tokio::spawn(async move {
            while let Some(Ok(message)) = incoming.next().await {
                let keep_going = Self::handle_incoming(
                    &recv_state,
                    &recv_username,
                    connection_id,
                    message,
                    &cmd_tx,
                )
                .await;
                if keep_going.is_err() {
                    break;
                }
            }
        });

        // 任一任务结束即认为连接生命周期终止
        tokio::select! {
            _ = &mut send_task => {}
            _ = &mut recv_task => {}
        }
        send_task.abort();
        recv_task.abort();

        // 断开流程：只有仍绑定着本连接的用户才会被置为离线
        if let Err(err) = state.chat_service.disconnect(&username, connection_id).await {
            tracing::error!(error = %err, username, "断开处理失败");
        }

        tracing::info!(username, connection_id = %connection_id, "WebSocket 连接已清理");
    }

    /// 处理单个入站帧。返回 `Err(())` 表示连接应当结束。
    ///
    /// 任何格式错误或处理失败只回给这个连接一个 error 事件，
    /// 绝不让单个连接的坏输入影响其他连接。
    async fn handle_incoming(
        state: &AppState,
        username: &str,
        connection_id: ConnectionId,
        message: WsMessage,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        match message {
            WsMessage::Close(_) => {
                tracing::debug!(connection_id = %connection_id, "客户端发来关闭帧");
                return Err(());
            }
            WsMessage::Ping(data) => {
                if cmd_tx
                    .send(WsCommand::SendPong(data.to_vec()))
                    .await
                    .is_err()
                {
                    return Err(());
                }
            }
            WsMessage::Pong(_) => {}
            WsMessage::Binary(_) => {
                tracing::debug!("binary frames are not supported");
            }
            WsMessage::Text(text) => {
                let event: ClientEvent = match serde_json::from_str(text.as_str()) {
                    Ok(event) => event,
                    Err(err) => {
                        Self::reply_error(cmd_tx, format!("malformed event: {err}")).await;
                        return Ok(());
                    }
                };
                return Self::dispatch(state, username, connection_id, event, cmd_tx).await;
            }
        }
        Ok(())
    }

    async fn dispatch(
        state: &AppState,
        username: &str,
        connection_id: ConnectionId,
        event: ClientEvent,
        cmd_tx: &mpsc::Sender<WsCommand>,
    ) -> Result<(), ()> {
        let result = match event {
            ClientEvent::Typing => state.chat_service.typing(username, connection_id).await,
            ClientEvent::StopTyping => {
                state
                    .chat_service
                    .stop_typing(username, connection_id)
                    .await
            }
            ClientEvent::Logout => {
                tracing::info!(username, "用户请求登出");
                return Err(());
            }
        };

        if let Err(err) = result {
            tracing::warn!(error = %err, username, "事件处理失败");
            Self::reply_error(cmd_tx, err.to_string()).await;
        }
        Ok(())
    }

    /// 错误只回给发起请求的连接自己。
    async fn reply_error(cmd_tx: &mpsc::Sender<WsCommand>, message: String) {
        let reply = ServerEvent::error(message);
        match serde_json::to_string(&reply) {
            Ok(json) => {
                let _ = cmd_tx.send(WsCommand::SendText(json)).await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize error reply");
            }
        }
    }
}
