use tandem_core::SignalMessage;
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_relay, init_tracing, register_peer};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_signal};

/// A partner that dropped off the registry mid-flight is a routing miss,
/// not an error: the relay keeps serving.
#[tokio::test]
async fn test_forward_to_unregistered_partner_drops() {
    init_tracing();

    let (service, cmd_tx, _partners) = create_test_relay();

    let (a, mut rx_a) = register_peer(&service);
    let (b, mut rx_b) = register_peer(&service);

    for id in [&a, &b] {
        cmd_tx
            .send(MatchmakerCommand::FindPartner { id: id.clone() })
            .await
            .expect("Matchmaker gone");
    }
    for rx in [&mut rx_a, &mut rx_b] {
        assert!(
            wait_for_signal(rx, EVENT_TIMEOUT_MS, |m| matches!(
                m,
                SignalMessage::Paired { .. }
            ))
            .await
            .is_some()
        );
    }

    // B's socket is gone but the partnership teardown has not run yet.
    service.remove_peer(&b);

    service.forward(
        &a,
        SignalMessage::Chat {
            text: "late message".to_string(),
        },
    );

    // Nothing delivered, nothing broken: A can still be routed to.
    service.forward(
        &b,
        SignalMessage::Chat {
            text: "from the void".to_string(),
        },
    );
    let delivered = wait_for_signal(&mut rx_a, EVENT_TIMEOUT_MS, |m| {
        matches!(m, SignalMessage::Chat { .. })
    })
    .await;
    assert!(matches!(delivered, Some(SignalMessage::Chat { text }) if text == "from the void"));
}
