//! The risk scoring engine.
//!
//! [`compute_risk`] folds the latest reading of every sensor on a node into a
//! single 0–100 score, a risk level and five per-factor assessments. It is a
//! pure function: no I/O, no clock, no state. The only memory it needs from
//! earlier readings is the [`PreviousSnapshot`] passed in by the caller.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::factors::{classify, rule, RiskFactor, RiskFactorId};
use super::model::PhysicalModel;
use crate::models::{Reading, SensorGroup};

// ---

/// Average magnitude (g) that saturates the magnitude term.
const MAGNITUDE_FULL_SCALE: f64 = 5.0;
const MAGNITUDE_WEIGHT: f64 = 40.0;

/// Average absolute angle (degrees) that saturates a tilt term.
const ANGLE_FULL_SCALE: f64 = 30.0;
const ANGLE_WEIGHT: f64 = 30.0;

/// Score bonus by largest scaled jump, first strictly exceeded threshold wins.
const JUMP_BONUS: [(f64, f64); 3] = [(15.0, 20.0), (7.0, 10.0), (3.0, 5.0)];

/// Overall score breakpoints. 67 itself is still `Medium`.
const RISK_LEVELS: [(f64, RiskLevel); 2] = [(67.0, RiskLevel::High), (33.0, RiskLevel::Medium)];

const MAX_RISK: f64 = 100.0;

/// Overall band of a node's score, serialized as `low`/`medium`/`high`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Pitch and roll of a single reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tilt {
    pub pitch: f64,
    pub roll: f64,
}

impl From<&Reading> for Tilt {
    fn from(reading: &Reading) -> Self {
        Tilt {
            pitch: reading.pitch,
            roll: reading.roll,
        }
    }
}

/// Reference tilt per sensor that the latest reading is compared against to
/// measure a jump.
///
/// Sensors absent from the snapshot contribute nothing to the jump average.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviousSnapshot(BTreeMap<String, Tilt>);

impl PreviousSnapshot {
    /// Empty snapshot; no sensor contributes a jump.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the second-to-latest reading of every sensor in `groups`.
    ///
    /// This measures change within one fetch, not change since the previous
    /// poll. Sensors with fewer than two readings are left out.
    pub fn from_groups(groups: &SensorGroup) -> Self {
        let snapshot = groups
            .iter()
            .filter_map(|(sensor_id, readings)| {
                let ordered = in_time_order(readings);
                let previous = ordered.len().checked_sub(2).map(|i| ordered[i])?;
                Some((sensor_id.clone(), Tilt::from(previous)))
            })
            .collect();
        PreviousSnapshot(snapshot)
    }

    /// Set the reference tilt of one sensor, replacing any earlier entry.
    pub fn insert(&mut self, sensor_id: impl Into<String>, tilt: Tilt) {
        self.0.insert(sensor_id.into(), tilt);
    }

    /// Reference tilt of `sensor_id`, if it has one.
    pub fn get(&self, sensor_id: &str) -> Option<&Tilt> {
        self.0.get(sensor_id)
    }

    /// Number of sensors with a reference tilt.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in sensor id order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Tilt)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Tilt)> for PreviousSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, Tilt)>>(iter: I) -> Self {
        PreviousSnapshot(iter.into_iter().collect())
    }
}

/// Output of the engine. Recomputed from scratch on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskReport {
    pub overall_risk: u8,
    pub risk_level: RiskLevel,
    pub factors: Vec<RiskFactor>,
    pub avg_magnitude: String,
    pub avg_pitch: String,
    pub avg_roll: String,
    pub avg_pitch_jump: String,
    pub avg_roll_jump: String,
    pub max_magnitude: String,
}

impl RiskReport {
    /// Report for a node with no readings at all.
    pub fn empty() -> Self {
        build_report(&Metrics::default(), 0)
    }
}

/// Unformatted aggregates the report is built from.
#[derive(Debug, Default)]
struct Metrics {
    avg_magnitude: f64,
    avg_pitch: f64,
    avg_roll: f64,
    max_magnitude: f64,
    avg_pitch_jump: f64,
    avg_roll_jump: f64,
    scaled_pitch_jump: f64,
    scaled_roll_jump: f64,
}

/// Score the latest readings of one node.
///
/// `previous` supplies the reference tilt per sensor for the jump metric;
/// build it with [`PreviousSnapshot::from_groups`] for the usual
/// "latest vs second-to-latest" behavior.
pub fn compute_risk(
    current: &SensorGroup,
    previous: &PreviousSnapshot,
    model: &PhysicalModel,
) -> RiskReport {
    // ---
    let latest: BTreeMap<&str, &Reading> = current
        .iter()
        .filter_map(|(sensor_id, readings)| {
            latest_reading(readings).map(|r| (sensor_id.as_str(), r))
        })
        .collect();

    if latest.is_empty() {
        return RiskReport::empty();
    }

    let mut total_magnitude = 0.0;
    let mut total_pitch = 0.0;
    let mut total_roll = 0.0;
    let mut max_magnitude: f64 = 0.0;
    for reading in latest.values() {
        total_magnitude += reading.magnitude;
        total_pitch += reading.pitch.abs();
        total_roll += reading.roll.abs();
        max_magnitude = max_magnitude.max(reading.magnitude);
    }

    let data_points = latest.len() as f64;
    let avg_magnitude = total_magnitude / data_points;
    let avg_pitch = total_pitch / data_points;
    let avg_roll = total_roll / data_points;

    let mut risk_score =
        cap(avg_magnitude / MAGNITUDE_FULL_SCALE * MAGNITUDE_WEIGHT, MAGNITUDE_WEIGHT)
            + cap(avg_pitch / ANGLE_FULL_SCALE * ANGLE_WEIGHT, ANGLE_WEIGHT)
            + cap(avg_roll / ANGLE_FULL_SCALE * ANGLE_WEIGHT, ANGLE_WEIGHT);

    let mut pitch_jump_total = 0.0;
    let mut roll_jump_total = 0.0;
    let mut jump_count = 0usize;
    for (sensor_id, before) in previous.iter() {
        if let Some(now) = latest.get(sensor_id.as_str()) {
            pitch_jump_total += (now.pitch - before.pitch).abs();
            roll_jump_total += (now.roll - before.roll).abs();
            jump_count += 1;
        }
    }

    let (avg_pitch_jump, avg_roll_jump) = if jump_count > 0 {
        (
            pitch_jump_total / jump_count as f64,
            roll_jump_total / jump_count as f64,
        )
    } else {
        (0.0, 0.0)
    };
    let scaled_pitch_jump = avg_pitch_jump * model.scale_sensitivity;
    let scaled_roll_jump = avg_roll_jump * model.scale_sensitivity;

    risk_score += classify(scaled_pitch_jump.max(scaled_roll_jump), &JUMP_BONUS, 0.0);
    risk_score *= model.mass_factor();

    // NaN saturates to 0 on the cast
    let overall_risk = risk_score.round().clamp(0.0, MAX_RISK) as u8;

    let metrics = Metrics {
        avg_magnitude,
        avg_pitch,
        avg_roll,
        max_magnitude,
        avg_pitch_jump,
        avg_roll_jump,
        scaled_pitch_jump,
        scaled_roll_jump,
    };
    build_report(&metrics, overall_risk)
}

/// Map an overall score onto its level.
pub fn risk_level(overall_risk: u8) -> RiskLevel {
    classify(f64::from(overall_risk), &RISK_LEVELS, RiskLevel::Low)
}

fn build_report(metrics: &Metrics, overall_risk: u8) -> RiskReport {
    // ---
    let jump_display = format!(
        "P: {}, R: {}",
        fixed2(metrics.scaled_pitch_jump),
        fixed2(metrics.scaled_roll_jump)
    );

    let factors = vec![
        rule(RiskFactorId::GroundAcceleration)
            .evaluate(metrics.avg_magnitude, fixed2(metrics.avg_magnitude)),
        rule(RiskFactorId::PitchAngle).evaluate(metrics.avg_pitch, fixed2(metrics.avg_pitch)),
        rule(RiskFactorId::RollAngle).evaluate(metrics.avg_roll, fixed2(metrics.avg_roll)),
        rule(RiskFactorId::PitchRollJumps).evaluate(
            metrics.scaled_pitch_jump.max(metrics.scaled_roll_jump),
            jump_display,
        ),
        rule(RiskFactorId::PeakAcceleration)
            .evaluate(metrics.max_magnitude, fixed2(metrics.max_magnitude)),
    ];

    RiskReport {
        overall_risk,
        risk_level: risk_level(overall_risk),
        factors,
        avg_magnitude: fixed2(metrics.avg_magnitude),
        avg_pitch: fixed2(metrics.avg_pitch),
        avg_roll: fixed2(metrics.avg_roll),
        avg_pitch_jump: fixed2(metrics.avg_pitch_jump),
        avg_roll_jump: fixed2(metrics.avg_roll_jump),
        max_magnitude: fixed2(metrics.max_magnitude),
    }
}

/// `value.min(max)` except that NaN stays NaN.
fn cap(value: f64, max: f64) -> f64 {
    if value > max {
        max
    } else {
        value
    }
}

/// Two-decimal rendering that rounds ties away from zero, like JavaScript's
/// `toFixed(2)`.
///
/// The tie test runs on the exact binary value, so `0.125` becomes `"0.13"`
/// while `1.005` (stored as 1.00499...) stays `"1.00"`.
fn fixed2(value: f64) -> String {
    // ---
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        return format!("{sign}Infinity");
    }

    // no f64 lies within 10^-40 of a tie without being the tie itself
    let exact = format!("{:.40}", value.abs());
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), "000"));
    let mut digits: Vec<u8> = whole.bytes().chain(fraction.bytes().take(2)).collect();

    if fraction.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - 2;
    let sign = if value < 0.0 { "-" } else { "" };
    format!(
        "{sign}{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    )
}

/// Readings sorted by timestamp; equal timestamps keep their supplied order.
fn in_time_order(readings: &[Reading]) -> Vec<&Reading> {
    let mut ordered: Vec<&Reading> = readings.iter().collect();
    ordered.sort_by_key(|r| r.timestamp);
    ordered
}

/// Latest reading by timestamp, the last supplied one on ties.
fn latest_reading(readings: &[Reading]) -> Option<&Reading> {
    readings.iter().max_by_key(|r| r.timestamp)
}
