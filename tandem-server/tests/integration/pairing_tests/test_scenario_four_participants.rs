use tandem_core::{NegotiationRole, ParticipantId};
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_matchmaker, init_tracing};
use crate::utils::EVENT_TIMEOUT_MS;

/// A, B, C request in order; A and B pair while C holds the slot. A then
/// disconnects, B is told exactly once. C re-requests (no-op) and pairs
/// with the newly arrived D.
#[tokio::test]
async fn test_scenario_four_participants() {
    init_tracing();

    let (cmd_tx, partners, sink) = create_test_matchmaker();

    let a = ParticipantId::new();
    let b = ParticipantId::new();
    let c = ParticipantId::new();
    let d = ParticipantId::new();

    for id in [&a, &b, &c] {
        cmd_tx
            .send(MatchmakerCommand::FindPartner { id: id.clone() })
            .await
            .expect("Matchmaker gone");
    }

    assert!(sink.wait_for_events(2, EVENT_TIMEOUT_MS).await);
    assert!(sink.paired_role_of(&a).await.is_some());
    assert!(sink.paired_role_of(&b).await.is_some());
    assert!(
        sink.paired_role_of(&c).await.is_none(),
        "C holds the slot and receives nothing"
    );

    cmd_tx
        .send(MatchmakerCommand::Disconnect { id: a.clone() })
        .await
        .expect("Matchmaker gone");

    assert!(sink.wait_for_events(3, EVENT_TIMEOUT_MS).await);
    assert_eq!(sink.partner_left_count(&b).await, 1);
    assert!(partners.is_empty());

    // C is already waiting; the re-request must not disturb the slot.
    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: c.clone() })
        .await
        .expect("Matchmaker gone");
    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: d.clone() })
        .await
        .expect("Matchmaker gone");

    assert!(sink.wait_for_events(5, EVENT_TIMEOUT_MS).await);
    assert_eq!(
        sink.paired_role_of(&d).await,
        Some(NegotiationRole::Initiator)
    );
    assert_eq!(
        sink.paired_role_of(&c).await,
        Some(NegotiationRole::Responder)
    );
    assert_eq!(partners.get(&c).map(|e| e.value().clone()), Some(d));
}
