use crate::matchmaker::MatchmakerCommand;
use crate::relay::EventSink;
use dashmap::DashMap;
use std::sync::Arc;
use tandem_core::{NegotiationRole, ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Both directions of every active partnership (A→B and B→A). Written only
/// by the [`Matchmaker`] task; relay tasks read it concurrently.
pub type PartnerMap = Arc<DashMap<ParticipantId, ParticipantId>>;

/// Owns the waiting slot and the partnership map. All pairing mutations
/// funnel through its command channel, so matches are formed atomically
/// with respect to each other.
pub struct Matchmaker {
    waiting: Option<ParticipantId>,
    partners: PartnerMap,
    command_rx: mpsc::Receiver<MatchmakerCommand>,
    events: Arc<dyn EventSink>,
}

impl Matchmaker {
    pub fn new(
        command_rx: mpsc::Receiver<MatchmakerCommand>,
        partners: PartnerMap,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            waiting: None,
            partners,
            command_rx,
            events,
        }
    }

    pub async fn run(mut self) {
        info!("Matchmaker event loop started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Matchmaker event loop finished");
    }

    async fn handle_command(&mut self, cmd: MatchmakerCommand) {
        match cmd {
            MatchmakerCommand::FindPartner { id } => self.find_partner(id, false).await,
            MatchmakerCommand::Skip { id } => self.skip(id).await,
            MatchmakerCommand::Disconnect { id } => self.disconnect(id).await,
        }
    }

    /// Match `id` against the waiting slot, or park it there. The arriving
    /// side becomes the initiator, the one that was waiting the responder.
    async fn find_partner(&mut self, id: ParticipantId, announce_waiting: bool) {
        // A request from a currently paired participant ends that
        // partnership first, exactly like a skip would.
        self.end_partnership(&id).await;

        match self.waiting.take() {
            Some(other) if other != id => {
                self.partners.insert(id.clone(), other.clone());
                self.partners.insert(other.clone(), id.clone());

                info!("Paired {} (initiator) with {} (responder)", id, other);

                self.events
                    .deliver(
                        id,
                        SignalMessage::Paired {
                            role: NegotiationRole::Initiator,
                        },
                    )
                    .await;
                self.events
                    .deliver(
                        other,
                        SignalMessage::Paired {
                            role: NegotiationRole::Responder,
                        },
                    )
                    .await;
            }

            // Slot empty, or `id` is already the one waiting. A participant
            // never pairs with itself.
            prev => {
                let already_waiting = prev.is_some();
                self.waiting = Some(id.clone());

                if already_waiting {
                    debug!("{} re-requested while already waiting", id);
                } else {
                    debug!("{} is now waiting", id);
                }

                if announce_waiting && !already_waiting {
                    self.events.deliver(id, SignalMessage::Waiting).await;
                }
            }
        }
    }

    async fn skip(&mut self, id: ParticipantId) {
        if self.waiting.as_ref() == Some(&id) {
            // Already in the queue, nothing to end.
            return;
        }

        // Ends the current partnership if there is one, then immediately
        // retries the match so a waiting third party is picked up.
        self.find_partner(id, true).await;
    }

    async fn disconnect(&mut self, id: ParticipantId) {
        if self.waiting.as_ref() == Some(&id) {
            self.waiting = None;
            debug!("Waiting slot cleared for disconnected {}", id);
        }

        // The disconnecting side is gone; only the partner is told.
        self.end_partnership(&id).await;
    }

    /// Remove both directions of `id`'s partnership, if any, and notify the
    /// former partner.
    async fn end_partnership(&mut self, id: &ParticipantId) {
        let Some((_, partner)) = self.partners.remove(id) else {
            return;
        };
        self.partners.remove(&partner);

        info!("Partnership between {} and {} ended", id, partner);

        self.events
            .deliver(partner, SignalMessage::PartnerLeft)
            .await;
    }
}
