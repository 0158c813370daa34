//! Landslide risk scoring.
//!
//! - `engine`: the pure scoring function and its report types
//! - `factors`: severity bands and recommendation text per factor
//! - `model`: physical rig calibration constants
//! - `monitor`: periodic per-node refresh and report cache

mod engine;
mod factors;
mod model;
mod monitor;

pub use engine::{compute_risk, risk_level, PreviousSnapshot, RiskLevel, RiskReport, Tilt};
pub use factors::{RiskFactor, RiskFactorId, Severity};
pub use model::PhysicalModel;
pub use monitor::{NodeRisk, RiskMonitor};
