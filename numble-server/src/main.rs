use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

use numble_persistence::{RoomRepository, connection::connect_and_migrate};
use numble_server::{
    config::Config, create_routes, registry::SessionRegistry, room_manager::RoomManager,
    websocket::ConnectionManager,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    info!("Starting Numble server...");

    let config = Config::new();
    let connections = Arc::new(ConnectionManager::new());

    // The durable store is a best-effort backstop: if it cannot be reached
    // the server still runs, with rooms held in memory only.
    let repository = match connect_and_migrate().await {
        Ok(db) => {
            info!("Connected to durable room store");
            Some(Arc::new(RoomRepository::new(db)))
        }
        Err(e) => {
            warn!("Durable room store unavailable, running in-memory only: {}", e);
            None
        }
    };

    let registry = Arc::new(SessionRegistry::new(repository));
    let rooms = Arc::new(RoomManager::new(registry, connections.clone()));

    let routes = create_routes(connections, rooms);

    info!("Server starting on {}:{}", config.host, config.port);

    let addr = (
        config.host.parse::<std::net::IpAddr>().expect("Invalid HOST"),
        config.port,
    );

    let (addr, server) = warp::serve(routes).bind_with_graceful_shutdown(addr, async {
        // Wait for SIGINT (Ctrl+C) or SIGTERM
        #[cfg(unix)]
        {
            let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
                .expect("Failed to install SIGINT handler");
            let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler");

            tokio::select! {
                _ = sigint.recv() => {
                    info!("Received SIGINT, shutting down gracefully...");
                }
                _ = sigterm.recv() => {
                    info!("Received SIGTERM, shutting down gracefully...");
                }
            }
        }

        #[cfg(not(unix))]
        {
            signal::ctrl_c().await.expect("Failed to listen for ctrl+c");
            info!("Received Ctrl+C, shutting down gracefully...");
        }
    });

    info!(
        "Server started successfully on {}. Press Ctrl+C to stop.",
        addr
    );
    server.await;
    info!("Server shutdown complete.");
}
