use tandem_core::{NegotiationRole, ParticipantId};
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_matchmaker, init_tracing};
use crate::utils::EVENT_TIMEOUT_MS;

#[tokio::test]
async fn test_two_participants_pair() {
    init_tracing();

    let (cmd_tx, partners, sink) = create_test_matchmaker();

    let a = ParticipantId::new();
    let b = ParticipantId::new();

    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: a.clone() })
        .await
        .expect("Matchmaker gone");
    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: b.clone() })
        .await
        .expect("Matchmaker gone");

    assert!(
        sink.wait_for_events(2, EVENT_TIMEOUT_MS).await,
        "Both sides should receive paired"
    );

    // The arriving side initiates, the waiting side responds.
    assert_eq!(
        sink.paired_role_of(&b).await,
        Some(NegotiationRole::Initiator)
    );
    assert_eq!(
        sink.paired_role_of(&a).await,
        Some(NegotiationRole::Responder)
    );

    // Symmetric, non-self entries from both directions.
    assert_eq!(partners.len(), 2);
    assert_eq!(partners.get(&a).map(|e| e.value().clone()), Some(b.clone()));
    assert_eq!(partners.get(&b).map(|e| e.value().clone()), Some(a.clone()));
}
