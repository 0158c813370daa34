//! Database schema management for `slopewatch`.
//!
//! Ensures required tables and indexes exist before serving requests.
//! Applied once on startup from `main.rs`.

use anyhow::Result;
use sqlx::PgPool;

// ---

/// Create or update the database schema (idempotent).
///
/// Creates the `accelerometer_data` table holding one row per sensor
/// reading. Safe to call on every startup; no-op if objects already exist.
///
/// Errors are propagated if any SQL execution fails.
pub async fn create_schema(pool: &PgPool) -> Result<()> {
    // ---
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS accelerometer_data (
            id         BIGSERIAL PRIMARY KEY,
            sensor_id  TEXT             NOT NULL,
            timestamp  TIMESTAMPTZ      NOT NULL,
            magnitude  DOUBLE PRECISION NOT NULL,
            pitch      DOUBLE PRECISION NOT NULL,
            roll       DOUBLE PRECISION NOT NULL
        );
        "#,
    )
    .execute(&mut *tx)
    .await?;

    // Per-node fetches filter by sensor and sort by time
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_accelerometer_data_sensor_time
            ON accelerometer_data (sensor_id, timestamp);
        "#,
    )
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(())
}
