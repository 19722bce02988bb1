pub mod error;
pub mod media;
pub mod negotiation;
pub mod peer;
pub mod session;
pub mod signaling;

pub use error::ClientError;
pub use media::{MediaProvider, MediaReadiness, NullMedia};
pub use negotiation::{Negotiation, NegotiationState};
pub use peer::{PeerEvent, PeerEventKind, PeerLink};
pub use session::{
    Author, ChatEntry, ChatStatus, Session, SessionCommand, SessionEvent, SessionHandle,
};
pub use signaling::{SignalTransport, SignalingClient};
