use axum::{extract::State, routing::get, Json, Router};
use tracing::info;

use crate::error::ApiResult;
use crate::{node_statuses, readings, AppState, NodeStatus};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/nodestatus", get(handler))
}

/// Handle `GET /api/nodestatus`: one entry per node listing sensors with no rows.
async fn handler(State(state): State<AppState>) -> ApiResult<Json<Vec<NodeStatus>>> {
    // ---
    let present = readings::present_sensor_ids(&state.pool).await?;
    info!("GET /api/nodestatus - {} sensors reporting", present.len());

    Ok(Json(node_statuses(&present)))
}
