//! Background polling loop that keeps one risk report per node up to date.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::engine::{compute_risk, PreviousSnapshot, RiskReport};
use super::model::PhysicalModel;
use crate::models::{NodeId, SensorGroup};
use crate::readings;

// ---

/// Readings per sensor a poll needs: the latest and its predecessor.
const READINGS_PER_SENSOR: i64 = 2;

/// A node's report together with when it was computed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRisk {
    pub node_id: String,
    pub last_updated: DateTime<Utc>,
    pub report: RiskReport,
}

/// Owns the last successfully computed report of every node.
///
/// Cloning is cheap and clones share the same cache.
#[derive(Debug, Clone)]
pub struct RiskMonitor {
    // ---
    pool: PgPool,
    model: PhysicalModel,
    reports: Arc<RwLock<BTreeMap<NodeId, NodeRisk>>>,
}

impl RiskMonitor {
    pub fn new(pool: PgPool, model: PhysicalModel) -> Self {
        Self {
            pool,
            model,
            reports: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Last cached report for `node`, if any poll has succeeded yet.
    pub async fn latest(&self, node: NodeId) -> Option<NodeRisk> {
        self.reports.read().await.get(&node).cloned()
    }

    /// Fetch, score and cache one node.
    ///
    /// Only the newest two readings per sensor are read, whatever the size
    /// of the stored history. On a fetch error the cached report is left untouched.
    pub async fn refresh_node(&self, node: NodeId) -> Result<NodeRisk, sqlx::Error> {
        // ---
        let groups = readings::fetch_latest_readings(&self.pool, node, READINGS_PER_SENSOR).await?;
        Ok(self.record(node, &groups).await)
    }

    /// Score `groups` for `node` and replace the cached entry.
    ///
    /// Jumps are measured against the second-to-latest reading of the same
    /// fetch.
    pub async fn record(&self, node: NodeId, groups: &SensorGroup) -> NodeRisk {
        // ---
        let previous = PreviousSnapshot::from_groups(groups);
        let report = compute_risk(groups, &previous, &self.model);
        let entry = NodeRisk {
            node_id: node.to_string(),
            last_updated: Utc::now(),
            report,
        };

        self.reports.write().await.insert(node, entry.clone());
        entry
    }

    /// Refresh every node once. Nodes are independent; one failing does not
    /// stop the others.
    pub async fn poll_all(&self) {
        // ---
        for node in NodeId::ALL {
            match self.refresh_node(node).await {
                Ok(entry) => debug!(
                    "{}: risk {} ({:?})",
                    node, entry.report.overall_risk, entry.report.risk_level
                ),
                Err(e) => warn!("{}: risk refresh failed, keeping previous report: {}", node, e),
            }
        }
    }

    /// Run [`poll_all`](Self::poll_all) every `period` until the task is aborted.
    ///
    /// Overrunning polls are not queued up; the next tick is simply skipped.
    pub fn spawn(self, period: Duration) -> JoinHandle<()> {
        // ---
        info!("Risk monitor polling every {:?}", period);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                self.poll_all().await;
            }
        })
    }
}
