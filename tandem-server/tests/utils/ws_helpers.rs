use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use tandem_core::SignalMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub async fn ws_connect(addr: SocketAddr) -> WsClient {
    let url = format!("ws://{}/ws", addr);
    let (ws, _) = connect_async(url.as_str()).await.expect("Failed to connect");
    ws
}

pub async fn ws_send(ws: &mut WsClient, msg: &SignalMessage) {
    let text = serde_json::to_string(msg).expect("Failed to serialize");
    ws.send(Message::Text(text.into()))
        .await
        .expect("Failed to send");
}

/// Drain frames until one matches `pred`, or the timeout elapses.
pub async fn ws_expect<F>(ws: &mut WsClient, timeout_ms: u64, pred: F) -> Option<SignalMessage>
where
    F: Fn(&SignalMessage) -> bool,
{
    let deadline = std::time::Duration::from_millis(timeout_ms);

    let fut = async {
        while let Some(frame) = ws.next().await {
            let Ok(Message::Text(text)) = frame else {
                continue;
            };
            let Ok(msg) = serde_json::from_str::<SignalMessage>(&text) else {
                continue;
            };
            if pred(&msg) {
                return Some(msg);
            }
        }
        None
    };

    tokio::time::timeout(deadline, fut).await.ok().flatten()
}
