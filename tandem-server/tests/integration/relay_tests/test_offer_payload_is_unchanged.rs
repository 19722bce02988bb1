use tandem_core::SignalMessage;
use tandem_server::MatchmakerCommand;

use crate::integration::{create_test_relay, init_tracing, register_peer};
use crate::utils::{EVENT_TIMEOUT_MS, wait_for_signal};

#[tokio::test]
async fn test_offer_payload_is_unchanged() {
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

    let sdp = "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\ns=-\r\n".to_string();
    service.forward(&a, SignalMessage::Offer { sdp: sdp.clone() });

    let delivered = wait_for_signal(&mut rx_b, EVENT_TIMEOUT_MS, |m| {
        matches!(m, SignalMessage::Offer { .. })
    })
    .await;

    // The relay has no WebRTC knowledge; the body passes through intact.
    assert!(matches!(delivered, Some(SignalMessage::Offer { sdp: got }) if got == sdp));

    let candidate = SignalMessage::IceCandidate {
        candidate: "candidate:1 1 udp 2130706433 127.0.0.1 54321 typ host".to_string(),
        sdp_mid: Some("0".to_string()),
        sdp_m_line_index: Some(0),
    };
    service.forward(&b, candidate);

    let delivered = wait_for_signal(&mut rx_a, EVENT_TIMEOUT_MS, |m| {
        matches!(m, SignalMessage::IceCandidate { .. })
    })
    .await;
    assert!(matches!(
        delivered,
        Some(SignalMessage::IceCandidate { sdp_m_line_index: Some(0), .. })
    ));
}
