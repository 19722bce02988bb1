use tandem_core::ParticipantId;
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_matchmaker, init_tracing};

#[tokio::test]
async fn test_first_participant_waits() {
    init_tracing();

    let (cmd_tx, partners, sink) = create_test_matchmaker();

    let a = ParticipantId::new();
    cmd_tx
        .send(MatchmakerCommand::FindPartner { id: a.clone() })
        .await
        .expect("Matchmaker gone");

    // The first arrival parks in the slot; no event is required, the
    // caller already knows it is waiting.
    let got_event = sink.wait_for_events(1, 300).await;
    assert!(!got_event, "No event expected for the first arrival");
    assert!(partners.is_empty(), "No partnership should exist yet");
}
