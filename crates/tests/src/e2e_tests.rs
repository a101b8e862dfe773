//! 端到端测试
//!
//! 把应用跑在随机端口上，用真实的 HTTP 和 WebSocket 客户端
//! 走完整的加入、发消息、打字、登出流程。

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

use tests::TestEnvironment;

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn login(client: &reqwest::Client, addr: SocketAddr, username: &str) -> reqwest::StatusCode {
    client
        .post(format!("http://{addr}/login"))
        .json(&json!({ "username": username }))
        .send()
        .await
        .expect("login request failed")
        .status()
}

async fn connect(addr: SocketAddr, username: &str) -> Result<WsClient> {
    let (ws, _) = connect_async(format!("ws://{addr}/ws?username={username}"))
        .await
        .context("websocket handshake failed")?;
    Ok(ws)
}

/// 读取下一个文本帧并解析为 JSON，最多等 5 秒。
async fn next_event(ws: &mut WsClient) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("connection closed unexpectedly")
            .expect("websocket error");
        if let WsMessage::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("frame is not valid JSON");
        }
    }
}

/// 在 users_update 事件里取某个用户的在线标记。
fn online_flag(event: &Value, username: &str) -> Option<bool> {
    assert_eq!(event["type"], "users_update");
    event["users"]
        .as_array()
        .unwrap()
        .iter()
        .find(|entry| entry["username"] == username)
        .map(|entry| entry["online"].as_bool().unwrap())
}

#[tokio::test]
async fn full_chat_session_flow() -> Result<()> {
    let env = TestEnvironment::new();
    let addr = env.start_app().await?;
    let client = reqwest::Client::new();

    // alice 加入；重名加入被拒绝
    assert_eq!(login(&client, addr, "alice").await, reqwest::StatusCode::CREATED);
    assert_eq!(login(&client, addr, "alice").await, reqwest::StatusCode::CONFLICT);

    let mut alice = connect(addr, "alice").await?;
    let update = next_event(&mut alice).await;
    assert_eq!(online_flag(&update, "alice"), Some(true), "加入后自己也要收到名单");

    // bob 加入：双方都收到包含 bob 的名单快照
    assert_eq!(login(&client, addr, "bob").await, reqwest::StatusCode::CREATED);
    let mut bob = connect(addr, "bob").await?;

    let update = next_event(&mut bob).await;
    assert_eq!(online_flag(&update, "alice"), Some(true));
    assert_eq!(online_flag(&update, "bob"), Some(true));

    let update = next_event(&mut alice).await;
    assert_eq!(online_flag(&update, "bob"), Some(true));

    // bob 打字：alice 能看到，bob 自己收不到
    bob.send(WsMessage::Text(r#"{"type":"typing"}"#.into()))
        .await?;
    let typing = next_event(&mut alice).await;
    assert_eq!(typing["type"], "user_typing");
    assert_eq!(typing["username"], "bob");

    // bob 发消息：两边都收到转义后的正文；
    // bob 的下一帧是消息而不是打字信号，证明打字广播没有回给发送者
    let response = client
        .post(format!("http://{addr}/message"))
        .json(&json!({"username": "bob", "message": "<script>hi</script>"}))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);

    let message = next_event(&mut bob).await;
    assert_eq!(message["type"], "message");
    assert_eq!(message["username"], "bob");
    assert_eq!(message["text"], "&lt;script&gt;hi&lt;/script&gt;");

    let message = next_event(&mut alice).await;
    assert_eq!(message["type"], "message");
    assert_eq!(message["text"], "&lt;script&gt;hi&lt;/script&gt;");

    // bob 登出：alice 收到 bob 离线的名单，bob 的记录还在
    bob.send(WsMessage::Text(r#"{"type":"logout"}"#.into()))
        .await?;
    let update = next_event(&mut alice).await;
    assert_eq!(online_flag(&update, "bob"), Some(false));
    assert_eq!(online_flag(&update, "alice"), Some(true));

    // 登出后名字仍被占用
    assert_eq!(login(&client, addr, "bob").await, reqwest::StatusCode::CONFLICT);

    Ok(())
}

#[tokio::test]
async fn transport_disconnect_marks_user_offline() -> Result<()> {
    let env = TestEnvironment::new();
    let addr = env.start_app().await?;
    let client = reqwest::Client::new();

    assert_eq!(login(&client, addr, "alice").await, reqwest::StatusCode::CREATED);
    assert_eq!(login(&client, addr, "bob").await, reqwest::StatusCode::CREATED);

    let mut alice = connect(addr, "alice").await?;
    next_event(&mut alice).await; // 自己的加入快照

    let mut bob = connect(addr, "bob").await?;
    next_event(&mut bob).await;
    next_event(&mut alice).await; // bob 的加入快照

    // 不发登出事件，直接关闭传输连接
    bob.close(None).await?;

    let update = next_event(&mut alice).await;
    assert_eq!(online_flag(&update, "bob"), Some(false));
    assert_eq!(online_flag(&update, "alice"), Some(true));

    Ok(())
}

#[tokio::test]
async fn malformed_frame_gets_error_reply_only() -> Result<()> {
    let env = TestEnvironment::new();
    let addr = env.start_app().await?;
    let client = reqwest::Client::new();

    assert_eq!(login(&client, addr, "alice").await, reqwest::StatusCode::CREATED);
    assert_eq!(login(&client, addr, "bob").await, reqwest::StatusCode::CREATED);

    let mut alice = connect(addr, "alice").await?;
    next_event(&mut alice).await;
    let mut bob = connect(addr, "bob").await?;
    next_event(&mut bob).await;
    next_event(&mut alice).await;

    // 坏帧只换来一条发给自己的 error 事件
    bob.send(WsMessage::Text("this is not json".into())).await?;
    let reply = next_event(&mut bob).await;
    assert_eq!(reply["type"], "error");

    // 其他连接不受影响，下一条广播照常到达
    let response = client
        .post(format!("http://{addr}/message"))
        .json(&json!({"username": "alice", "message": "still alive"}))
        .send()
        .await?;
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(next_event(&mut alice).await["type"], "message");
    assert_eq!(next_event(&mut bob).await["type"], "message");

    Ok(())
}

#[tokio::test]
async fn blank_username_cannot_upgrade() -> Result<()> {
    let env = TestEnvironment::new();
    let addr = env.start_app().await?;

    assert!(connect(addr, "%20").await.is_err());
    Ok(())
}
