use async_trait::async_trait;
use tandem_core::{ParticipantId, SignalMessage};

/// Outbound path for matchmaker events (`paired`, `waiting`,
/// `partner-left`). Implemented by the WebSocket layer; tests substitute a
/// capturing mock.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, to: ParticipantId, msg: SignalMessage);
}
