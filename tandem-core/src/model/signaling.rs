use crate::model::participant::{NegotiationRole, ParticipantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Everything that crosses the signaling socket, in both directions.
/// The relay treats `Chat`, `Offer`, `Answer` and `IceCandidate` payloads as
/// opaque; only the client negotiation machine interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    Welcome {
        participant_id: ParticipantId,
    },
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    FindPartner,
    Waiting,
    Paired {
        role: NegotiationRole,
    },
    Skip,
    PartnerLeft,
    Chat {
        text: String,
    },
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}
