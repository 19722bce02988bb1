use tandem_core::ParticipantId;
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_matchmaker, init_tracing};
use crate::utils::EVENT_TIMEOUT_MS;

#[tokio::test]
async fn test_disconnect_notifies_partner_once() {
    init_tracing();

    let (cmd_tx, partners, sink) = create_test_matchmaker();

    let a = ParticipantId::new();
    let b = ParticipantId::new();

    for id in [&a, &b] {
        cmd_tx
            .send(MatchmakerCommand::FindPartner { id: id.clone() })
            .await
            .expect("Matchmaker gone");
    }
    assert!(sink.wait_for_events(2, EVENT_TIMEOUT_MS).await);

    cmd_tx
        .send(MatchmakerCommand::Disconnect { id: a.clone() })
        .await
        .expect("Matchmaker gone");

    assert!(sink.wait_for_events(3, EVENT_TIMEOUT_MS).await);

    // Exactly one partner-left, and both directions removed.
    assert_eq!(sink.partner_left_count(&b).await, 1);
    assert_eq!(sink.partner_left_count(&a).await, 0);
    assert!(partners.is_empty());

    // The disconnected side is not requeued: a new arrival just waits.
    let c = ParticipantId::new();
    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: c.clone() })
        .await
        .expect("Matchmaker gone");

    assert!(!sink.wait_for_events(4, 300).await, "C should hold the slot");
    assert!(partners.is_empty());
}
