use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("signaling transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("webrtc error: {0}")]
    Rtc(#[from] webrtc::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("media unavailable: {0}")]
    Media(String),
}
