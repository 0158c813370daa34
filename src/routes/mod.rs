//! Route gateway: every endpoint module exports a subrouter that is merged
//! here, so `main.rs` only ever sees [`router`].

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::AppState;

mod health;
mod node_status;
mod risk;
mod sensor_data;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(sensor_data::router())
        .merge(node_status::router())
        .merge(risk::router())
        .merge(health::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
