//! `slopewatch`: backend for a landslide monitoring dashboard.
//!
//! Serves accelerometer telemetry from up to three monitoring nodes, reports
//! which sensors are silent, and scores each node's landslide risk. The
//! binary in `main.rs` wires these modules together; integration tests use
//! the same [`routes::router`].

pub mod config;
pub mod error;
pub mod models;
pub mod readings;
pub mod risk;
pub mod routes;
pub mod schema;
pub mod state;

pub use config::Config;
pub use state::AppState;

// Routes import these from the crate root rather than from `models`, so the
// endpoint modules only know about their gateway.
pub use models::{node_statuses, NodeId, NodeStatus, Reading, ReadingRow, SensorGroup};
