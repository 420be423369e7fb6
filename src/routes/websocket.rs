use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    response::IntoResponse,
    routing::get,
};

use crate::{services::websocket_service, state::SharedState};

#[utoipa::path(
    get,
    path = "/game",
    tag = "relay",
    responses((status = 101, description = "Switching protocols to the game relay WebSocket"))
)]
/// Upgrade the HTTP connection into a relay session for operators and TV screens.
pub async fn ws_handler(
    State(state): State<SharedState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| websocket_service::handle_socket(state, socket))
}

/// Configure the relay endpoint.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/game", get(ws_handler))
}
