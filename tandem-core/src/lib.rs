pub mod model;

pub use model::{IceServerConfig, NegotiationRole, ParticipantId, SignalMessage};
