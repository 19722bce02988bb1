use crate::error::ClientError;
use crate::peer::PeerLink;
use tandem_core::{NegotiationRole, SignalMessage};
use tracing::{debug, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Progress of one negotiation attempt. The pre-pairing "idle" phase is
/// the absence of a machine; a fresh `paired` event always builds a fresh
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    AwaitingRole,
    Negotiating,
    Connected,
    TornDown,
}

/// Per-pairing offer/answer/candidate state machine. The role is assigned
/// by the server inside the `paired` event, so there is no timer race to
/// resolve; stale traffic relayed across a re-pairing is tolerated by the
/// idempotence checks below.
pub struct Negotiation {
    role: NegotiationRole,
    state: NegotiationState,
    link: PeerLink,
    /// Candidates received before the remote description, FIFO.
    pending: Vec<RTCIceCandidateInit>,
    remote_description_set: bool,
    offer_sent: bool,
}

impl Negotiation {
    pub fn new(role: NegotiationRole, link: PeerLink) -> Self {
        Self {
            role,
            state: NegotiationState::AwaitingRole,
            link,
            pending: Vec::new(),
            remote_description_set: false,
            offer_sent: false,
        }
    }

    pub fn role(&self) -> NegotiationRole {
        self.role
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending.len()
    }

    /// Kick off the exchange. The initiator produces the offer to
    /// transmit; the responder just waits for one. Calling this more than
    /// once is a no-op.
    pub async fn start(&mut self) -> Result<Option<SignalMessage>, ClientError> {
        if self.state != NegotiationState::AwaitingRole {
            debug!("start ignored in state {:?}", self.state);
            return Ok(None);
        }
        self.state = NegotiationState::Negotiating;

        match self.role {
            NegotiationRole::Initiator => {
                let sdp = self.link.create_offer().await?;
                self.offer_sent = true;
                Ok(Some(SignalMessage::Offer { sdp }))
            }
            NegotiationRole::Responder => Ok(None),
        }
    }

    /// Remote offer arrived. Returns the answer to transmit, or `None`
    /// when the offer was ignored.
    pub async fn handle_offer(&mut self, sdp: String) -> Result<Option<SignalMessage>, ClientError> {
        if self.state == NegotiationState::TornDown {
            return Ok(None);
        }
        if self.remote_description_set {
            debug!("Duplicate offer ignored");
            return Ok(None);
        }
        if self.role == NegotiationRole::Initiator {
            // The server honored us as initiator; a foreign offer can only
            // be a leftover relayed across a re-pairing.
            warn!("Stale offer received while initiating, ignored");
            return Ok(None);
        }

        let answer = self.link.accept_offer(sdp).await?;
        self.remote_description_set = true;
        self.drain_pending().await;

        Ok(Some(SignalMessage::Answer { sdp: answer }))
    }

    /// Remote answer to our offer arrived.
    pub async fn handle_answer(&mut self, sdp: String) -> Result<(), ClientError> {
        if self.state == NegotiationState::TornDown {
            return Ok(());
        }
        if self.remote_description_set {
            debug!("Duplicate answer ignored");
            return Ok(());
        }
        if self.role != NegotiationRole::Initiator || !self.offer_sent {
            warn!("Answer with no outstanding offer, ignored");
            return Ok(());
        }

        self.link.accept_answer(sdp).await?;
        self.remote_description_set = true;
        self.drain_pending().await;

        Ok(())
    }

    /// Apply a remote candidate now, or queue it until a remote
    /// description exists. Application failures are logged, never fatal.
    pub async fn handle_candidate(&mut self, candidate: RTCIceCandidateInit) {
        if self.state == NegotiationState::TornDown {
            return;
        }

        if self.remote_description_set {
            if let Err(e) = self.link.add_remote_candidate(candidate).await {
                warn!("Failed to apply remote candidate: {}", e);
            }
        } else {
            self.pending.push(candidate);
        }
    }

    /// Drained exactly once, in arrival order, right after the remote
    /// description is set.
    async fn drain_pending(&mut self) {
        for candidate in std::mem::take(&mut self.pending) {
            if let Err(e) = self.link.add_remote_candidate(candidate).await {
                warn!("Failed to apply queued candidate: {}", e);
            }
        }
    }

    pub fn mark_connected(&mut self) {
        if self.state == NegotiationState::Negotiating {
            self.state = NegotiationState::Connected;
            info!("Negotiation connected as {:?}", self.role);
        }
    }

    /// Release the session entirely: no partial reuse afterwards.
    pub async fn teardown(&mut self) {
        if self.state == NegotiationState::TornDown {
            return;
        }
        self.pending.clear();
        if let Err(e) = self.link.close().await {
            debug!("Peer connection close failed: {}", e);
        }
        self.state = NegotiationState::TornDown;
    }
}
