use crate::error::ClientError;
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tandem_core::SignalMessage;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{info, warn};

/// Duplex signaling channel to the relay. The session only ever sees
/// decoded [`SignalMessage`]s; framing and encoding live here.
#[async_trait]
pub trait SignalTransport: Send {
    async fn send(&mut self, msg: SignalMessage) -> Result<(), ClientError>;

    /// `None` once the socket is closed. Malformed frames are logged and
    /// skipped, never surfaced.
    async fn recv(&mut self) -> Option<SignalMessage>;

    async fn close(&mut self);
}

pub struct SignalingClient {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl SignalingClient {
    pub async fn connect(url: &str) -> Result<Self, ClientError> {
        let (ws, _) = connect_async(url).await?;
        info!("Signaling socket connected to {}", url);
        Ok(Self { ws })
    }
}

#[async_trait]
impl SignalTransport for SignalingClient {
    async fn send(&mut self, msg: SignalMessage) -> Result<(), ClientError> {
        let text = serde_json::to_string(&msg)?;
        self.ws.send(Message::Text(text.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<SignalMessage> {
        while let Some(frame) = self.ws.next().await {
            match frame {
                Ok(Message::Text(text)) => match serde_json::from_str(&text) {
                    Ok(msg) => return Some(msg),
                    Err(e) => warn!("Invalid SignalMessage from server: {:?}", e),
                },
                Ok(Message::Close(_)) => return None,
                Ok(_) => {}
                Err(e) => {
                    warn!("Signaling socket error: {}", e);
                    return None;
                }
            }
        }
        None
    }

    async fn close(&mut self) {
        let _ = self.ws.close(None).await;
    }
}
