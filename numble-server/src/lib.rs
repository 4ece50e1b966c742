use std::sync::Arc;
use warp::Filter;

use crate::room_manager::RoomManager;
use crate::websocket::ConnectionManager;

pub mod config;
pub mod registry;
pub mod room_manager;
pub mod websocket;

pub fn create_routes(
    connections: Arc<ConnectionManager>,
    rooms: Arc<RoomManager>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    // Clone for filters
    let connections_filter = warp::any().map({
        let connections = connections.clone();
        move || connections.clone()
    });

    let rooms_filter = warp::any().map({
        let rooms = rooms.clone();
        move || rooms.clone()
    });

    // WebSocket endpoint; the path segment is the client's identity token
    let websocket = warp::path!("ws" / String)
        .and(warp::ws())
        .and(connections_filter)
        .and(rooms_filter)
        .map(
            |client_id: String, ws: warp::ws::Ws, connections, rooms| {
                ws.on_upgrade(move |socket| {
                    websocket::handle_connection(socket, client_id, connections, rooms)
                })
            },
        );

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    // Root API greeting
    let api_root = warp::path("api")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&serde_json::json!({ "message": "NUMBLE API" })));

    // CORS configuration
    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type"])
        .allow_methods(vec!["GET", "POST"]);

    websocket
        .or(health)
        .or(api_root)
        .with(cors)
        .with(warp::log("numble"))
}
