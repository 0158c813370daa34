use std::sync::Arc;

use sqlx::PgPool;

use crate::risk::RiskMonitor;
use crate::Config;

/// Shared state handed to every handler via `State<AppState>`.
///
/// Cheap to clone: the pool and monitor are handles, the config is behind `Arc`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub monitor: RiskMonitor,
}

impl AppState {
    /// Build state whose monitor scores with the configured physical model.
    pub fn new(pool: PgPool, config: Config) -> Self {
        let monitor = RiskMonitor::new(pool.clone(), config.model);
        Self {
            pool,
            config: Arc::new(config),
            monitor,
        }
    }
}
