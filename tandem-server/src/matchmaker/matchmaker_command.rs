use tandem_core::ParticipantId;

/// Commands into the matchmaker from the per-connection socket tasks.
#[derive(Debug)]
pub enum MatchmakerCommand {
    /// Participant wants a partner: match against the waiting slot or park.
    FindPartner { id: ParticipantId },

    /// Participant voluntarily ends its current partnership and re-enters
    /// the queue.
    Skip { id: ParticipantId },

    /// Socket closed; the participant is already gone from the registry.
    Disconnect { id: ParticipantId },
}
