use crate::matchmaker::MatchmakerCommand;
use crate::relay::RelayService;
use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use tandem_core::{ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// The full signaling surface: a single upgrade endpoint with a permissive
/// CORS policy.
pub fn router(service: RelayService) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .layer(cors)
        .with_state(service)
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<RelayService>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, service))
}

async fn handle_socket(socket: WebSocket, service: RelayService) {
    let id = ParticipantId::new();
    info!("New WebSocket connection: {}", id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(id.clone(), tx);
    service.send_to(
        &id,
        &SignalMessage::Welcome {
            participant_id: id.clone(),
        },
    );
    service.send_to(
        &id,
        &SignalMessage::IceConfig {
            ice_servers: service.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();
        let id = id.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => match signal {
                            SignalMessage::FindPartner => {
                                let cmd = MatchmakerCommand::FindPartner { id: id.clone() };
                                if let Err(e) = service.matchmaker_tx.send(cmd).await {
                                    error!("Matchmaker died: {}", e);
                                    break;
                                }
                            }
                            SignalMessage::Skip => {
                                let cmd = MatchmakerCommand::Skip { id: id.clone() };
                                let _ = service.matchmaker_tx.send(cmd).await;
                            }
                            payload @ (SignalMessage::Chat { .. }
                            | SignalMessage::Offer { .. }
                            | SignalMessage::Answer { .. }
                            | SignalMessage::IceCandidate { .. }) => {
                                service.forward(&id, payload);
                            }
                            other => {
                                warn!("Unexpected client message from {}: {:?}", id, other);
                            }
                        },
                        Err(e) => warn!("Invalid SignalMessage from {}: {:?}", id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    // Registry removal first: nothing may be routed here once the
    // matchmaker starts tearing the partnership down.
    service.remove_peer(&id);
    let _ = service
        .matchmaker_tx
        .send(MatchmakerCommand::Disconnect { id: id.clone() })
        .await;

    info!("WebSocket disconnected: {}", id);
}
