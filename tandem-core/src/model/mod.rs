mod participant;
mod signaling;

pub use participant::{NegotiationRole, ParticipantId};
pub use signaling::{IceServerConfig, SignalMessage};
