use crate::matchmaker::{MatchmakerCommand, PartnerMap};
use crate::relay::EventSink;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{IceServerConfig, ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, error};

struct RelayInner {
    /// Connection registry: one outbound channel per connected participant.
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    partners: PartnerMap,
    ice_servers: Vec<IceServerConfig>,
}

/// Connection registry plus the message relay. Forwarding runs on the
/// per-connection tasks, concurrent with matchmaker mutations; the relay
/// only ever reads the partnership map.
#[derive(Clone)]
pub struct RelayService {
    inner: Arc<RelayInner>,
    pub(crate) matchmaker_tx: mpsc::Sender<MatchmakerCommand>,
}

impl RelayService {
    pub fn new(
        matchmaker_tx: mpsc::Sender<MatchmakerCommand>,
        partners: PartnerMap,
        ice_servers: Vec<IceServerConfig>,
    ) -> Self {
        Self {
            inner: Arc::new(RelayInner {
                peers: DashMap::new(),
                partners,
                ice_servers,
            }),
            matchmaker_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, id: ParticipantId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(id, tx);
    }

    /// Drop the participant from the registry. Must happen before the
    /// matchmaker learns about the disconnect, so nothing can be routed to
    /// the id afterwards.
    pub fn remove_peer(&self, id: &ParticipantId) {
        self.inner.peers.remove(id);
    }

    /// Deliver `msg` to `from`'s current partner, unchanged. Best effort:
    /// without a partner, or with the partner already unregistered, the
    /// message is silently dropped.
    pub fn forward(&self, from: &ParticipantId, msg: SignalMessage) {
        let Some(partner) = self.inner.partners.get(from).map(|e| e.value().clone()) else {
            debug!("Dropping message from unpartnered {}", from);
            return;
        };

        self.send_to(&partner, &msg);
    }

    pub fn send_to(&self, id: &ParticipantId, msg: &SignalMessage) {
        if let Some(peer) = self.inner.peers.get(id) {
            match serde_json::to_string(msg) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to queue message for {}: {:?}", id, e);
                    }
                }
                Err(e) => error!("Failed to serialize signal message: {}", e),
            }
        } else {
            debug!("Dropping message for unregistered {}", id);
        }
    }
}

#[async_trait]
impl EventSink for RelayService {
    async fn deliver(&self, to: ParticipantId, msg: SignalMessage) {
        self.send_to(&to, &msg);
    }
}
