//! Per-factor severity bands and the text shown with each band.
//!
//! Every factor is one row of [`FACTOR_RULES`]: a list of `(threshold,
//! severity)` bands checked top-down with a strict `>` comparison, plus one
//! recommendation per severity. A value that clears no band is `Low`.

use serde::{Deserialize, Serialize};

// ---

/// How alarming a single factor is, independent of the overall level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Stable identifier of a factor, serialized in camelCase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RiskFactorId {
    GroundAcceleration,
    PitchAngle,
    RollAngle,
    PitchRollJumps,
    PeakAcceleration,
}

/// One scored dimension of a [`RiskReport`](super::RiskReport).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactor {
    pub id: RiskFactorId,
    pub name: String,
    pub value: String,
    pub unit: String,
    pub threshold: String,
    pub severity: Severity,
    pub trend: String,
    pub description: String,
    pub recommendation: String,
}

/// Advice shown with a factor, one text per severity.
#[derive(Debug)]
pub struct Recommendations {
    pub low: &'static str,
    pub medium: &'static str,
    pub high: &'static str,
}

impl Recommendations {
    /// Text for `severity`.
    pub fn for_severity(&self, severity: Severity) -> &'static str {
        match severity {
            Severity::Low => self.low,
            Severity::Medium => self.medium,
            Severity::High => self.high,
        }
    }
}

/// Static description of one factor: display text, severity bands and
/// recommendations.
#[derive(Debug)]
pub struct FactorRule {
    pub id: RiskFactorId,
    pub name: &'static str,
    pub unit: &'static str,
    pub threshold: &'static str,
    pub trend: &'static str,
    pub description: &'static str,
    /// Checked in order; the first band whose threshold the value exceeds wins.
    pub bands: &'static [(f64, Severity)],
    pub recommendations: Recommendations,
}

impl FactorRule {
    /// Severity of `value` under this rule's bands.
    pub fn classify(&self, value: f64) -> Severity {
        classify(value, self.bands, Severity::Low)
    }

    /// Build the reported factor for an already-formatted value.
    pub fn evaluate(&self, value: f64, display: String) -> RiskFactor {
        let severity = self.classify(value);
        RiskFactor {
            id: self.id,
            name: self.name.to_string(),
            value: display,
            unit: self.unit.to_string(),
            threshold: self.threshold.to_string(),
            severity,
            trend: self.trend.to_string(),
            description: self.description.to_string(),
            recommendation: self.recommendations.for_severity(severity).to_string(),
        }
    }
}

/// First band whose threshold `value` strictly exceeds, else `fallback`.
///
/// NaN exceeds nothing and falls through.
pub fn classify<T: Copy>(value: f64, bands: &[(f64, T)], fallback: T) -> T {
    bands
        .iter()
        .find(|(threshold, _)| value > *threshold)
        .map_or(fallback, |(_, result)| *result)
}

/// One rule per factor, in report order.
pub static FACTOR_RULES: [FactorRule; 5] = [
    FactorRule {
        id: RiskFactorId::GroundAcceleration,
        name: "Ground Acceleration",
        unit: "g",
        threshold: "> 0.5 g",
        trend: "Averaged across sensors",
        description: "Mean acceleration magnitude of the latest reading from each sensor.",
        bands: &[(1.0, Severity::High), (0.5, Severity::Medium)],
        recommendations: Recommendations {
            low: "Ground motion is within normal range. Continue routine monitoring.",
            medium: "Elevated ground motion detected. Increase inspection frequency and check sensor mounts.",
            high: "Strong ground motion detected. Restrict access to the slope and prepare evacuation procedures.",
        },
    },
    FactorRule {
        id: RiskFactorId::PitchAngle,
        name: "Pitch Angle",
        unit: "°",
        threshold: "> 7°",
        trend: "Averaged across sensors",
        description: "Mean absolute forward/backward tilt of the latest reading from each sensor.",
        bands: &[(12.0, Severity::High), (7.0, Severity::Medium)],
        recommendations: Recommendations {
            low: "Pitch is stable. No action required.",
            medium: "Noticeable pitch tilt. Inspect the slope face for cracks or bulging.",
            high: "Severe pitch tilt indicates possible slope movement. Alert the response team immediately.",
        },
    },
    FactorRule {
        id: RiskFactorId::RollAngle,
        name: "Roll Angle",
        unit: "°",
        threshold: "> 7°",
        trend: "Averaged across sensors",
        description: "Mean absolute sideways tilt of the latest reading from each sensor.",
        bands: &[(12.0, Severity::High), (7.0, Severity::Medium)],
        recommendations: Recommendations {
            low: "Roll is stable. No action required.",
            medium: "Noticeable roll tilt. Check for lateral soil displacement.",
            high: "Severe roll tilt indicates lateral slope failure risk. Alert the response team immediately.",
        },
    },
    FactorRule {
        id: RiskFactorId::PitchRollJumps,
        name: "Pitch/Roll Jumps",
        unit: "°",
        threshold: "> 3°",
        trend: "Change between the two most recent readings",
        description: "Average sudden change in pitch and roll, scaled for rig sensitivity.",
        bands: &[
            (15.0, Severity::High),
            (7.0, Severity::Medium),
            (3.0, Severity::Low),
        ],
        recommendations: Recommendations {
            low: "Tilt changes are gradual. Continue routine monitoring.",
            medium: "Rapid tilt changes detected. Verify readings and watch for progressive movement.",
            high: "Sudden large tilt changes detected. Treat as an active slide and clear the area.",
        },
    },
    FactorRule {
        id: RiskFactorId::PeakAcceleration,
        name: "Peak Acceleration",
        unit: "g",
        threshold: "> 0.5 g",
        trend: "Maximum across sensors",
        description: "Highest acceleration magnitude among the latest sensor readings.",
        bands: &[(1.0, Severity::High), (0.5, Severity::Medium)],
        recommendations: Recommendations {
            low: "No acceleration spikes detected.",
            medium: "A sensor reported an acceleration spike. Check that sensor and its surroundings.",
            high: "A sensor reported a severe acceleration spike. Inspect the affected area before re-entry.",
        },
    },
];

/// Look up the rule for a factor.
pub fn rule(id: RiskFactorId) -> &'static FactorRule {
    match id {
        RiskFactorId::GroundAcceleration => &FACTOR_RULES[0],
        RiskFactorId::PitchAngle => &FACTOR_RULES[1],
        RiskFactorId::RollAngle => &FACTOR_RULES[2],
        RiskFactorId::PitchRollJumps => &FACTOR_RULES[3],
        RiskFactorId::PeakAcceleration => &FACTOR_RULES[4],
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn rules_are_indexed_by_id() {
        // ---
        for rule_row in &FACTOR_RULES {
            assert_eq!(rule(rule_row.id).id, rule_row.id);
        }
    }

    #[test]
    fn ground_acceleration_bands() {
        // ---
        let ground = rule(RiskFactorId::GroundAcceleration);
        assert_eq!(ground.classify(0.5), Severity::Low);
        assert_eq!(ground.classify(0.51), Severity::Medium);
        assert_eq!(ground.classify(1.0), Severity::Medium);
        assert_eq!(ground.classify(1.01), Severity::High);
    }

    #[test]
    fn angle_bands() {
        // ---
        for id in [RiskFactorId::PitchAngle, RiskFactorId::RollAngle] {
            let angle = rule(id);
            assert_eq!(angle.classify(7.0), Severity::Low);
            assert_eq!(angle.classify(7.5), Severity::Medium);
            assert_eq!(angle.classify(12.0), Severity::Medium);
            assert_eq!(angle.classify(12.5), Severity::High);
        }
    }

    #[test]
    fn jump_bands() {
        // ---
        let jumps = rule(RiskFactorId::PitchRollJumps);
        assert_eq!(jumps.classify(0.0), Severity::Low);
        assert_eq!(jumps.classify(3.5), Severity::Low);
        assert_eq!(jumps.classify(7.5), Severity::Medium);
        assert_eq!(jumps.classify(17.5), Severity::High);
    }

    #[test]
    fn nan_falls_through_to_low() {
        // ---
        assert_eq!(rule(RiskFactorId::PeakAcceleration).classify(f64::NAN), Severity::Low);
    }

    #[test]
    fn recommendation_follows_severity() {
        // ---
        let peak = rule(RiskFactorId::PeakAcceleration);
        let factor = peak.evaluate(1.4, "1.40".to_string());
        assert_eq!(factor.severity, Severity::High);
        assert_eq!(factor.recommendation, peak.recommendations.high);
        assert_eq!(factor.value, "1.40");
        assert_eq!(factor.unit, "g");
    }

    #[test]
    fn factor_wire_format() {
        // ---
        let factor = rule(RiskFactorId::PitchRollJumps).evaluate(0.0, "P: 0.00, R: 0.00".into());
        let json = serde_json::to_value(&factor).unwrap();
        assert_eq!(json["id"], "pitchRollJumps");
        assert_eq!(json["severity"], "low");
    }
}
