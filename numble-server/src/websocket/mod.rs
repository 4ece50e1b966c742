use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tracing::{error, info, warn};
use warp::ws::{Message, WebSocket};

use crate::room_manager::RoomManager;
use numble_types::ClientMessage;

pub mod connection;
pub mod handlers;

pub use connection::ConnectionManager;
use handlers::MessageHandler;

/// Runs one client's connection: registers its presence, pumps outbound
/// events, and feeds inbound actions to the state machine. Malformed
/// messages get an error reply and the task keeps running.
pub async fn handle_connection(
    websocket: WebSocket,
    client_id: String,
    connections: Arc<ConnectionManager>,
    rooms: Arc<RoomManager>,
) {
    info!("New WebSocket connection: {}", client_id);

    let (mut ws_sender, mut ws_receiver) = websocket.split();

    // Register presence and get the receiver for outgoing events
    let message_receiver = connections.register(&client_id);

    let message_handler = MessageHandler::new(client_id.clone(), connections.clone(), rooms.clone());

    // Handle incoming messages
    let incoming_handler = {
        let message_handler = message_handler.clone();
        let client_id = client_id.clone();

        async move {
            while let Some(result) = ws_receiver.next().await {
                match result {
                    Ok(msg) => {
                        // Only text frames carry actions
                        if !msg.is_text() {
                            continue;
                        }
                        let Ok(text) = msg.to_str() else {
                            continue;
                        };

                        match serde_json::from_str::<ClientMessage>(text) {
                            Ok(client_message) => {
                                message_handler.handle_message(client_message).await;
                            }
                            Err(e) => {
                                warn!("Invalid message from {}: {}", client_id, e);
                                message_handler.send_error("Unrecognized or malformed action");
                            }
                        }
                    }
                    Err(e) => {
                        warn!("WebSocket error for {}: {}", client_id, e);
                        break;
                    }
                }
            }
        }
    };

    // Handle outgoing messages
    let outgoing_handler = {
        let client_id = client_id.clone();
        async move {
            let mut receiver = message_receiver;

            while let Some(message) = receiver.recv().await {
                let json = match serde_json::to_string(&message) {
                    Ok(json) => json,
                    Err(e) => {
                        error!("Failed to serialize event: {:?}", e);
                        continue;
                    }
                };

                if let Err(e) = ws_sender.send(Message::text(json)).await {
                    warn!("Failed to send event to {}: {:?}", client_id, e);
                    break;
                }
            }
        }
    };

    // Run both handlers concurrently
    tokio::select! {
        _ = incoming_handler => {},
        _ = outgoing_handler => {},
    }

    // Drop the live channel first, then let presence drive forfeiture
    info!("Connection {} disconnected", client_id);
    connections.unregister(&client_id);
    message_handler.handle_disconnect().await;
}
