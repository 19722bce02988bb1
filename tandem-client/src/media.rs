use crate::error::ClientError;
use async_trait::async_trait;
use std::sync::Arc;
use webrtc::track::track_local::TrackLocal;

/// Client-owned camera/microphone permission state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaReadiness {
    Pending,
    Granted,
    Denied,
}

/// Seam to whatever captures local media. The session asks for tracks once
/// at startup; an error is a terminal denial and the session continues
/// text-only.
#[async_trait]
pub trait MediaProvider: Send + Sync {
    async fn acquire(&self) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, ClientError>;
}

/// Headless provider: media is "granted" with no tracks to publish.
pub struct NullMedia;

#[async_trait]
impl MediaProvider for NullMedia {
    async fn acquire(&self) -> Result<Vec<Arc<dyn TrackLocal + Send + Sync>>, ClientError> {
        Ok(Vec::new())
    }
}
