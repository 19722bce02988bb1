use crate::error::ClientError;
use std::sync::Arc;
use tandem_core::IceServerConfig;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

#[derive(Debug)]
pub enum PeerEventKind {
    /// Local candidate gathered after the local description was set.
    LocalCandidate(RTCIceCandidateInit),
    ConnectionState(RTCPeerConnectionState),
    RemoteTrack,
}

/// Callback-side events from the peer connection, tagged with the
/// negotiation generation that created the link so the session can drop
/// leftovers from a torn-down link.
#[derive(Debug)]
pub struct PeerEvent {
    pub generation: u64,
    pub kind: PeerEventKind,
}

/// Thin wrapper around one `RTCPeerConnection`: wiring of callbacks into a
/// channel plus the handful of SDP operations the negotiation machine
/// needs.
pub struct PeerLink {
    peer_connection: Arc<RTCPeerConnection>,
}

impl PeerLink {
    pub async fn new(
        ice_servers: &[IceServerConfig],
        generation: u64,
        event_tx: mpsc::Sender<PeerEvent>,
    ) -> Result<Self, ClientError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|s| RTCIceServer {
                    urls: s.urls.clone(),
                    username: s.username.clone().unwrap_or_default(),
                    credential: s.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx
                    .send(PeerEvent {
                        generation,
                        kind: PeerEventKind::LocalCandidate(init),
                    })
                    .await;
            })
        }));

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {:?}", s);
                    let _ = tx
                        .send(PeerEvent {
                            generation,
                            kind: PeerEventKind::ConnectionState(s),
                        })
                        .await;
                })
            },
        ));

        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(
            move |_track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    debug!("Remote track received");
                    let _ = tx
                        .send(PeerEvent {
                            generation,
                            kind: PeerEventKind::RemoteTrack,
                        })
                        .await;
                })
            },
        ));

        Ok(Self { peer_connection })
    }

    pub async fn add_track(&self, track: Arc<dyn TrackLocal + Send + Sync>) -> Result<(), ClientError> {
        let _ = self.peer_connection.add_track(track).await?;
        Ok(())
    }

    /// Create a local offer and install it as the local description.
    pub async fn create_offer(&self) -> Result<String, ClientError> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    /// Apply a remote offer and produce the local answer.
    pub async fn accept_offer(&self, sdp: String) -> Result<String, ClientError> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(offer).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    /// Apply the remote answer to our outstanding offer.
    pub async fn accept_answer(&self, sdp: String) -> Result<(), ClientError> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(answer).await?;
        Ok(())
    }

    pub async fn add_remote_candidate(
        &self,
        candidate: RTCIceCandidateInit,
    ) -> Result<(), ClientError> {
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    pub async fn close(&self) -> Result<(), ClientError> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
