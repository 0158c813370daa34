use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::readings::{self, ReadingFilter};
use crate::{AppState, NodeId, ReadingRow, SensorGroup};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/sensorData", post(ingest))
        .route("/api/sensorData/{node}", get(handler))
}

/// Query parameters for narrowing a node's readings.
#[derive(Debug, Default, Deserialize)]
pub struct ReadingsQuery {
    /// Inclusive lower bound, RFC 3339.
    start: Option<DateTime<Utc>>,
    /// Inclusive upper bound, RFC 3339.
    end: Option<DateTime<Utc>>,
    /// Keep only the most recent N readings of each sensor.
    limit: Option<usize>,
}

async fn handler(
    Path(node): Path<String>,
    Query(params): Query<ReadingsQuery>,
    State(state): State<AppState>,
) -> ApiResult<Json<SensorGroup>> {
    // ---
    let node: NodeId = node.parse()?;
    info!("GET /api/sensorData/{} {:?}", node.number(), params);

    if let (Some(start), Some(end)) = (params.start, params.end) {
        if start > end {
            return Err(ApiError::BadRequest(format!(
                "start {start} is after end {end}"
            )));
        }
    }

    let grouped = readings::fetch_node_readings(&state.pool, node, &params.filter()).await?;
    debug!("{}: returning {} sensors", node, grouped.len());

    Ok(Json(grouped))
}

/// Handle `POST /api/sensorData`: store a batch of readings.
async fn ingest(
    State(state): State<AppState>,
    Json(batch): Json<Vec<ReadingRow>>,
) -> ApiResult<impl IntoResponse> {
    // ---
    if let Some(stray) = batch.iter().find(|r| NodeId::owning(&r.sensor_id).is_none()) {
        return Err(ApiError::BadRequest(format!(
            "sensor {} does not belong to any node",
            stray.sensor_id
        )));
    }

    let inserted = readings::insert_readings(&state.pool, &batch).await?;
    info!("POST /api/sensorData - stored {} readings", inserted);

    Ok((StatusCode::CREATED, Json(json!({ "inserted": inserted }))))
}

impl ReadingsQuery {
    /// The query-side filter for these parameters. Limits beyond `i64::MAX`
    /// mean "no limit".
    fn filter(&self) -> ReadingFilter {
        ReadingFilter {
            start: self.start,
            end: self.end,
            per_sensor: self.limit.and_then(|n| i64::try_from(n).ok()),
        }
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::TimeZone;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 26, 18, minute, 0).unwrap()
    }

    fn parse(query: &str) -> ReadingsQuery {
        let uri: axum::http::Uri = format!("/api/sensorData/1?{query}").parse().unwrap();
        Query::<ReadingsQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_no_filters_reads_everything() {
        // ---
        assert_eq!(ReadingsQuery::default().filter(), ReadingFilter::default());
    }

    #[test]
    fn test_time_window_is_passed_to_the_query() {
        // ---
        let params = parse("start=2025-03-26T18:10:00Z&end=2025-03-26T18:20:00Z");
        let filter = params.filter();

        assert_eq!(filter.start, Some(at(10)));
        assert_eq!(filter.end, Some(at(20)));
        assert_eq!(filter.per_sensor, None);
    }

    #[test]
    fn test_limit_becomes_per_sensor_count() {
        // ---
        assert_eq!(parse("limit=2").filter(), ReadingFilter::latest(2));
        assert_eq!(parse("limit=0").filter().per_sensor, Some(0));
    }

    #[test]
    fn test_oversized_limit_is_unbounded() {
        // ---
        let params = ReadingsQuery {
            limit: Some(usize::MAX),
            ..ReadingsQuery::default()
        };
        assert_eq!(params.filter().per_sensor, None);
    }

    #[test]
    fn test_malformed_limit_is_rejected() {
        // ---
        let uri: axum::http::Uri = "/api/sensorData/1?limit=-3".parse().unwrap();
        assert!(Query::<ReadingsQuery>::try_from_uri(&uri).is_err());
    }
}
