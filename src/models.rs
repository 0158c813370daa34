//! Data models shared by the telemetry endpoints and the risk engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Number of accelerometers mounted on every node.
pub const SENSORS_PER_NODE: usize = 4;

/// One accelerometer observation as served to the dashboard.
///
/// The sensor id is not repeated here; it is the key of the enclosing
/// [`SensorGroup`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub timestamp: DateTime<Utc>,
    /// Acceleration magnitude in g.
    pub magnitude: f64,
    /// Signed tilt in degrees.
    pub pitch: f64,
    /// Signed tilt in degrees.
    pub roll: f64,
}

/// Readings for one node keyed by sensor id, each sequence oldest first.
pub type SensorGroup = BTreeMap<String, Vec<Reading>>;

/// Stored reading row, also the ingest payload.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRow {
    // ---
    pub sensor_id: String,
    pub timestamp: DateTime<Utc>,
    pub magnitude: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl ReadingRow {
    // ---
    pub fn to_reading(&self) -> Reading {
        Reading {
            timestamp: self.timestamp,
            magnitude: self.magnitude,
            pitch: self.pitch,
            roll: self.roll,
        }
    }
}

/// Group rows by sensor id, keeping the incoming order within each sensor.
pub fn group_by_sensor(rows: &[ReadingRow]) -> SensorGroup {
    // ---
    let mut grouped = SensorGroup::new();
    for row in rows {
        grouped
            .entry(row.sensor_id.clone())
            .or_default()
            .push(row.to_reading());
    }
    grouped
}

/// A physical monitoring unit carrying four accelerometers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NodeId {
    Node1,
    Node2,
    Node3,
}

impl NodeId {
    pub const ALL: [NodeId; 3] = [NodeId::Node1, NodeId::Node2, NodeId::Node3];

    /// 1-based node number.
    pub fn number(self) -> usize {
        match self {
            NodeId::Node1 => 1,
            NodeId::Node2 => 2,
            NodeId::Node3 => 3,
        }
    }

    /// Sensor ids owned by this node: node n owns `sensor_{4n-3}..=sensor_{4n}`.
    pub fn sensor_ids(self) -> Vec<String> {
        let first = (self.number() - 1) * SENSORS_PER_NODE + 1;
        (first..first + SENSORS_PER_NODE)
            .map(|n| format!("sensor_{n}"))
            .collect()
    }

    /// The node that owns `sensor_id`, if any.
    pub fn owning(sensor_id: &str) -> Option<NodeId> {
        Self::ALL
            .into_iter()
            .find(|node| node.sensor_ids().iter().any(|s| s == sensor_id))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node {}", self.number())
    }
}

/// Error returned when a string does not name a known node.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown node: {0}")]
pub struct UnknownNode(pub String);

impl FromStr for NodeId {
    type Err = UnknownNode;

    /// Accepts `"1"`, `"node1"`, `"Node 1"` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_ascii_lowercase();
        let digits = lowered
            .strip_prefix("node")
            .unwrap_or(&lowered)
            .trim_start_matches(['_', '-', ' ']);
        match digits {
            "1" => Ok(NodeId::Node1),
            "2" => Ok(NodeId::Node2),
            "3" => Ok(NodeId::Node3),
            _ => Err(UnknownNode(s.to_string())),
        }
    }
}

/// Presence summary for one node, as rendered in the node status table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    // ---
    pub node_id: String,
    pub status: String,
    pub location: String,
    pub slope_status: String,
}

const NORMAL_STATUS: &str = "Normal Status";
const UNAVAILABLE: &str = "Unavailable";

/// Build one status entry per known node given the sensor ids that have rows.
pub fn node_statuses(present: &BTreeSet<String>) -> Vec<NodeStatus> {
    // ---
    NodeId::ALL
        .into_iter()
        .map(|node| {
            let missing: Vec<String> = node
                .sensor_ids()
                .into_iter()
                .filter(|s| !present.contains(s))
                .collect();

            let status = match missing.len() {
                0 => NORMAL_STATUS.to_string(),
                1 => format!("Missing 1 sensor: {}", missing[0]),
                n => format!("Missing {} sensors: {}", n, missing.join(", ")),
            };

            NodeStatus {
                node_id: node.to_string(),
                status,
                location: UNAVAILABLE.to_string(),
                slope_status: UNAVAILABLE.to_string(),
            }
        })
        .collect()
}
