//! Calibration constants for the miniature slope rig the scores are tuned on.

use serde::Serialize;

/// Physical description of the test rig.
///
/// Fixed at startup and shared read-only. `Default` reproduces the rig the
/// scoring thresholds were calibrated against: an 8×4×4 ft box holding
/// 1.5 m³ of sand at 1600 kg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalModel {
    /// Box length, width, height in feet. Informational only.
    pub box_dimensions_ft: [f64; 3],
    pub sand_volume_m3: f64,
    pub sand_density_kg_m3: f64,
    /// Multiplier applied to pitch/roll jumps before banding.
    pub scale_sensitivity: f64,
    /// Mass that maps to a mass factor of 1.0.
    pub reference_mass_kg: f64,
    pub max_mass_factor: f64,
}

impl Default for PhysicalModel {
    fn default() -> Self {
        Self {
            box_dimensions_ft: [8.0, 4.0, 4.0],
            sand_volume_m3: 1.5,
            sand_density_kg_m3: 1600.0,
            scale_sensitivity: 1.75,
            reference_mass_kg: 2500.0,
            max_mass_factor: 1.2,
        }
    }
}

impl PhysicalModel {
    /// Sand mass in kilograms.
    pub fn total_mass_kg(&self) -> f64 {
        self.sand_volume_m3 * self.sand_density_kg_m3
    }

    /// Score multiplier derived from the sand mass, capped at `max_mass_factor`.
    pub fn mass_factor(&self) -> f64 {
        (self.total_mass_kg() / self.reference_mass_kg).min(self.max_mass_factor)
    }
}
