use crate::error::ClientError;
use crate::media::{MediaProvider, MediaReadiness};
use crate::negotiation::Negotiation;
use crate::peer::{PeerEvent, PeerEventKind, PeerLink};
use crate::signaling::{SignalTransport, SignalingClient};
use std::sync::Arc;
use tandem_core::{IceServerConfig, NegotiationRole, ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_local::TrackLocal;

/// What the embedding UI shows for this session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStatus {
    Idle,
    Waiting,
    Chatting,
    /// Partner skipped or disconnected; stays terminal until the user
    /// explicitly asks for a new partner.
    PartnerGone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Author {
    Me,
    Them,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEntry {
    pub author: Author,
    pub text: String,
}

/// Surfaced to the embedding UI over an unbounded channel. The UI is an
/// external collaborator; nothing here blocks on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Status(ChatStatus),
    Media(MediaReadiness),
    Chat(ChatEntry),
    RemoteMediaActive,
    RemoteMediaLost,
}

#[derive(Debug)]
pub enum SessionCommand {
    FindPartner,
    SendChat(String),
    Skip,
    Stop,
}

/// Caller-side handle: commands in, events out.
pub struct SessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    pub events: mpsc::UnboundedReceiver<SessionEvent>,
    pub task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn find_partner(&self) {
        let _ = self.commands.send(SessionCommand::FindPartner);
    }

    pub fn send_chat(&self, text: impl Into<String>) {
        let _ = self.commands.send(SessionCommand::SendChat(text.into()));
    }

    pub fn skip(&self) {
        let _ = self.commands.send(SessionCommand::Skip);
    }

    pub fn stop(&self) {
        let _ = self.commands.send(SessionCommand::Stop);
    }

    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.events.recv().await
    }
}

/// Session lifecycle controller: one actor owning the signaling
/// transport, the optional negotiation machine, the chat history and the
/// media readiness flag. Everything is serialized through its event loop,
/// so no two negotiation attempts ever overlap for one partnership.
pub struct Session {
    transport: Box<dyn SignalTransport>,
    media: Arc<dyn MediaProvider>,
    cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    events_tx: mpsc::UnboundedSender<SessionEvent>,

    peer_tx: mpsc::Sender<PeerEvent>,
    peer_rx: mpsc::Receiver<PeerEvent>,
    /// Bumped for every negotiation so leftovers from a closed link are
    /// recognizable.
    generation: u64,

    own_id: Option<ParticipantId>,
    ice_servers: Vec<IceServerConfig>,
    media_readiness: MediaReadiness,
    tracks: Vec<Arc<dyn TrackLocal + Send + Sync>>,

    status: ChatStatus,
    history: Vec<ChatEntry>,
    negotiation: Option<Negotiation>,
}

impl Session {
    /// Connect to a relay and spawn the session actor.
    pub async fn connect(
        url: &str,
        media: Arc<dyn MediaProvider>,
    ) -> Result<SessionHandle, ClientError> {
        let transport = SignalingClient::connect(url).await?;
        Ok(Self::spawn(Box::new(transport), media))
    }

    /// Spawn the actor over an already-established transport.
    pub fn spawn(transport: Box<dyn SignalTransport>, media: Arc<dyn MediaProvider>) -> SessionHandle {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (peer_tx, peer_rx) = mpsc::channel(64);

        let session = Session {
            transport,
            media,
            cmd_rx,
            events_tx,
            peer_tx,
            peer_rx,
            generation: 0,
            own_id: None,
            ice_servers: Vec::new(),
            media_readiness: MediaReadiness::Pending,
            tracks: Vec::new(),
            status: ChatStatus::Idle,
            history: Vec::new(),
            negotiation: None,
        };

        let task = tokio::spawn(session.run());

        SessionHandle {
            commands: cmd_tx,
            events: events_rx,
            task,
        }
    }

    async fn run(mut self) {
        info!("Session event loop started");

        self.acquire_media().await;
        self.enter_queue().await;

        loop {
            tokio::select! {
                msg = self.transport.recv() => {
                    match msg {
                        Some(m) => self.handle_signal(m).await,
                        None => {
                            // Transport failure is handled like a partner
                            // loss followed by a stop.
                            info!("Signaling transport closed");
                            self.teardown_negotiation().await;
                            self.set_status(ChatStatus::Idle);
                            break;
                        }
                    }
                }

                cmd = self.cmd_rx.recv() => {
                    match cmd {
                        Some(SessionCommand::Stop) | None => {
                            self.shutdown().await;
                            break;
                        }
                        Some(c) => self.handle_command(c).await,
                    }
                }

                Some(evt) = self.peer_rx.recv() => {
                    self.handle_peer_event(evt).await;
                }
            }
        }

        info!("Session event loop finished for {:?}", self.own_id);
    }

    async fn acquire_media(&mut self) {
        self.emit(SessionEvent::Media(MediaReadiness::Pending));

        match self.media.acquire().await {
            Ok(tracks) => {
                self.tracks = tracks;
                self.media_readiness = MediaReadiness::Granted;
            }
            Err(e) => {
                // Terminal for video only; chat keeps working.
                warn!("Media acquisition failed: {}", e);
                self.media_readiness = MediaReadiness::Denied;
            }
        }

        self.emit(SessionEvent::Media(self.media_readiness));
    }

    async fn enter_queue(&mut self) {
        self.history.clear();
        self.send_signal(SignalMessage::FindPartner).await;
        self.set_status(ChatStatus::Waiting);
    }

    async fn handle_signal(&mut self, msg: SignalMessage) {
        match msg {
            SignalMessage::Welcome { participant_id } => {
                debug!("Admitted as {}", participant_id);
                self.own_id = Some(participant_id);
            }

            SignalMessage::IceConfig { ice_servers } => {
                debug!("Received ICE config: {} servers", ice_servers.len());
                self.ice_servers = ice_servers;
            }

            SignalMessage::Paired { role } => {
                self.begin_partnership(role).await;
            }

            SignalMessage::Waiting => {
                self.teardown_negotiation().await;
                self.history.clear();
                self.set_status(ChatStatus::Waiting);
            }

            SignalMessage::PartnerLeft => {
                self.teardown_negotiation().await;
                self.set_status(ChatStatus::PartnerGone);
            }

            SignalMessage::Chat { text } => {
                if self.status == ChatStatus::Chatting {
                    let entry = ChatEntry {
                        author: Author::Them,
                        text,
                    };
                    self.history.push(entry.clone());
                    self.emit(SessionEvent::Chat(entry));
                } else {
                    debug!("Chat text outside a partnership, ignored");
                }
            }

            SignalMessage::Offer { sdp } => {
                let Some(neg) = self.negotiation.as_mut() else {
                    debug!("Offer with no active negotiation, ignored");
                    return;
                };
                match neg.handle_offer(sdp).await {
                    Ok(Some(answer)) => self.send_signal(answer).await,
                    Ok(None) => {}
                    Err(e) => warn!("Offer handling failed: {}", e),
                }
            }

            SignalMessage::Answer { sdp } => {
                let Some(neg) = self.negotiation.as_mut() else {
                    debug!("Answer with no active negotiation, ignored");
                    return;
                };
                if let Err(e) = neg.handle_answer(sdp).await {
                    warn!("Answer handling failed: {}", e);
                }
            }

            SignalMessage::IceCandidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => {
                let Some(neg) = self.negotiation.as_mut() else {
                    debug!("Candidate with no active negotiation, ignored");
                    return;
                };
                neg.handle_candidate(RTCIceCandidateInit {
                    candidate,
                    sdp_mid,
                    sdp_mline_index: sdp_m_line_index,
                    ..Default::default()
                })
                .await;
            }

            other => {
                warn!("Unexpected server message: {:?}", other);
            }
        }
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::FindPartner => {
                self.teardown_negotiation().await;
                self.enter_queue().await;
            }

            SessionCommand::SendChat(text) => {
                if self.status != ChatStatus::Chatting {
                    debug!("Chat input outside a partnership, dropped");
                    return;
                }
                let entry = ChatEntry {
                    author: Author::Me,
                    text: text.clone(),
                };
                self.history.push(entry.clone());
                self.emit(SessionEvent::Chat(entry));
                self.send_signal(SignalMessage::Chat { text }).await;
            }

            SessionCommand::Skip => {
                self.teardown_negotiation().await;
                self.history.clear();
                self.send_signal(SignalMessage::Skip).await;
                self.set_status(ChatStatus::Waiting);
            }

            // Stop breaks the loop before reaching here.
            SessionCommand::Stop => {}
        }
    }

    async fn handle_peer_event(&mut self, evt: PeerEvent) {
        if evt.generation != self.generation {
            debug!("Peer event from torn-down link, dropped");
            return;
        }

        match evt.kind {
            PeerEventKind::LocalCandidate(init) => {
                self.send_signal(SignalMessage::IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                })
                .await;
            }

            PeerEventKind::ConnectionState(state) => match state {
                RTCPeerConnectionState::Connected => {
                    if let Some(neg) = self.negotiation.as_mut() {
                        neg.mark_connected();
                    }
                }
                RTCPeerConnectionState::Failed
                | RTCPeerConnectionState::Disconnected
                | RTCPeerConnectionState::Closed => {
                    self.emit(SessionEvent::RemoteMediaLost);
                }
                _ => {}
            },

            PeerEventKind::RemoteTrack => {
                self.emit(SessionEvent::RemoteMediaActive);
            }
        }
    }

    /// `paired` arrived: fresh transcript, fresh negotiation with the
    /// server-assigned role. Without granted media the session stays
    /// text-only.
    async fn begin_partnership(&mut self, role: NegotiationRole) {
        self.teardown_negotiation().await;
        self.history.clear();
        self.set_status(ChatStatus::Chatting);

        if self.media_readiness != MediaReadiness::Granted {
            info!("Media not granted; text-only session as {:?}", role);
            return;
        }

        self.generation += 1;

        let link =
            match PeerLink::new(&self.ice_servers, self.generation, self.peer_tx.clone()).await {
                Ok(link) => link,
                Err(e) => {
                    warn!("Failed to create peer connection: {}", e);
                    return;
                }
            };

        for track in &self.tracks {
            if let Err(e) = link.add_track(track.clone()).await {
                warn!("Failed to publish local track: {}", e);
            }
        }

        let mut negotiation = Negotiation::new(role, link);
        match negotiation.start().await {
            Ok(Some(offer)) => self.send_signal(offer).await,
            Ok(None) => {}
            Err(e) => warn!("Failed to start negotiation: {}", e),
        }

        self.negotiation = Some(negotiation);
    }

    /// Cancels any in-flight negotiation before anything new may start.
    async fn teardown_negotiation(&mut self) {
        if let Some(mut neg) = self.negotiation.take() {
            neg.teardown().await;
        }
    }

    async fn shutdown(&mut self) {
        self.teardown_negotiation().await;
        self.transport.close().await;
        self.set_status(ChatStatus::Idle);
    }

    async fn send_signal(&mut self, msg: SignalMessage) {
        if let Err(e) = self.transport.send(msg).await {
            warn!("Failed to send signal: {}", e);
        }
    }

    fn set_status(&mut self, status: ChatStatus) {
        if self.status != status {
            self.status = status;
            self.emit(SessionEvent::Status(status));
        }
    }

    fn emit(&self, event: SessionEvent) {
        let _ = self.events_tx.send(event);
    }
}
