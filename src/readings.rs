//! Reading store queries.
//!
//! Thin wrappers over the `accelerometer_data` table. Callers get rows back
//! already grouped per sensor and ordered oldest first, which is the shape
//! both the dashboard and the risk engine consume.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::debug;

use crate::models::{group_by_sensor, NodeId, ReadingRow, SensorGroup};

// ---

/// Narrowing applied inside the query, so unrequested history never leaves
/// the database.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReadingFilter {
    /// Inclusive lower bound on `timestamp`.
    pub start: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `timestamp`.
    pub end: Option<DateTime<Utc>>,
    /// Keep only this many of each sensor's most recent readings in the window.
    pub per_sensor: Option<i64>,
}

impl ReadingFilter {
    /// The `count` newest readings of every sensor, with no time window.
    pub fn latest(count: i64) -> Self {
        Self {
            per_sensor: Some(count),
            ..Self::default()
        }
    }
}

/// Readings of one node grouped by sensor id, ascending by timestamp.
///
/// Sensors with nothing left after `filter` are absent from the result.
/// Equal timestamps are ordered by insertion, so the newest row stays last.
pub async fn fetch_node_readings(
    pool: &PgPool,
    node: NodeId,
    filter: &ReadingFilter,
) -> Result<SensorGroup, sqlx::Error> {
    // ---
    let rows: Vec<ReadingRow> = sqlx::query_as(
        r#"
        WITH ranked AS (
            SELECT id, sensor_id, timestamp, magnitude, pitch, roll,
                   ROW_NUMBER() OVER (
                       PARTITION BY sensor_id ORDER BY timestamp DESC, id DESC
                   ) AS recency
            FROM accelerometer_data
            WHERE sensor_id = ANY($1)
              AND ($2::timestamptz IS NULL OR timestamp >= $2)
              AND ($3::timestamptz IS NULL OR timestamp <= $3)
        )
        SELECT sensor_id, timestamp, magnitude, pitch, roll
        FROM ranked
        WHERE $4::bigint IS NULL OR recency <= $4
        ORDER BY timestamp ASC, id ASC
        "#,
    )
    .bind(node.sensor_ids())
    .bind(filter.start)
    .bind(filter.end)
    .bind(filter.per_sensor)
    .fetch_all(pool)
    .await?;

    debug!("{}: fetched {} readings with {:?}", node, rows.len(), filter);
    Ok(group_by_sensor(&rows))
}

/// The `per_sensor` newest readings of every sensor on `node`.
pub async fn fetch_latest_readings(
    pool: &PgPool,
    node: NodeId,
    per_sensor: i64,
) -> Result<SensorGroup, sqlx::Error> {
    fetch_node_readings(pool, node, &ReadingFilter::latest(per_sensor)).await
}

/// Sensor ids that have at least one stored reading.
pub async fn present_sensor_ids(pool: &PgPool) -> Result<BTreeSet<String>, sqlx::Error> {
    // ---
    let ids: Vec<String> = sqlx::query_scalar("SELECT DISTINCT sensor_id FROM accelerometer_data")
        .fetch_all(pool)
        .await?;

    Ok(ids.into_iter().collect())
}

/// Store a batch of readings atomically, returning the number inserted.
pub async fn insert_readings(pool: &PgPool, rows: &[ReadingRow]) -> Result<u64, sqlx::Error> {
    // ---
    let mut tx = pool.begin().await?;
    let mut inserted = 0;

    for row in rows {
        inserted += sqlx::query(
            r#"
            INSERT INTO accelerometer_data (sensor_id, timestamp, magnitude, pitch, roll)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&row.sensor_id)
        .bind(row.timestamp)
        .bind(row.magnitude)
        .bind(row.pitch)
        .bind(row.roll)
        .execute(&mut *tx)
        .await?
        .rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}
