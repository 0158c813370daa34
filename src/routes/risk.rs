use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::ApiResult;
use crate::risk::{compute_risk, NodeRisk, PreviousSnapshot, RiskReport};
use crate::{AppState, NodeId, SensorGroup};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/risk", post(score))
        .route("/api/risk/{node}", get(latest))
}

/// Body of `POST /api/risk`.
#[derive(Debug, Deserialize)]
struct RiskRequest {
    current: SensorGroup,
    /// Reference tilt per sensor; omitted means no jump contribution.
    #[serde(default)]
    previous: PreviousSnapshot,
}

/// Handle `GET /api/risk/{node}`: the monitor's cached report, refreshed on
/// demand when no poll has completed for the node yet.
async fn latest(
    Path(node): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<Json<NodeRisk>> {
    // ---
    let node: NodeId = node.parse()?;

    if let Some(cached) = state.monitor.latest(node).await {
        debug!("{}: serving cached risk from {}", node, cached.last_updated);
        return Ok(Json(cached));
    }

    info!("{}: no cached risk, computing on demand", node);
    Ok(Json(state.monitor.refresh_node(node).await?))
}

/// Handle `POST /api/risk`: run the engine on caller-supplied readings.
async fn score(
    State(state): State<AppState>,
    Json(request): Json<RiskRequest>,
) -> Json<RiskReport> {
    // ---
    debug!(
        "POST /api/risk - {} sensors, {} previous",
        request.current.len(),
        request.previous.len()
    );
    Json(compute_risk(
        &request.current,
        &request.previous,
        &state.config.model,
    ))
}
