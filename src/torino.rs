//! # Torino scale classification
//!
//! Deterministic mapping from an impact probability and a megaton-equivalent
//! yield to the public-communication Torino scale (integer levels 0 to 10).
//!
//! The classification is an **ordered rule table** evaluated top to bottom:
//! the first predicate that matches wins. This keeps every threshold visible
//! in one place and lets the tests enumerate the ladder directly, instead of
//! tracing nested conditionals.
//!
//! ## Example
//!
//! ```rust
//! use spaceguard::torino::torino_scale;
//!
//! # fn main() -> Result<(), spaceguard::spaceguard_errors::SpaceguardError> {
//! let level = torino_scale(0.02, 500.0)?;
//! assert_eq!(level.value(), 5);
//! println!("{level}: {}", level.recommendation());
//! # Ok(())
//! # }
//! ```

use std::fmt;

use crate::constants::{Kilometer, KmPerSecond};
use crate::energy::estimate_impact_energy;
use crate::spaceguard_errors::{Result, SpaceguardError};

/// Yields below this many megatons never leave level 0, whatever the
/// probability: the body burns up or does negligible damage.
pub const MIN_CONSEQUENTIAL_ENERGY_MT: f64 = 0.001;

/// A Torino scale level, guaranteed to be in `0..=10`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct TorinoLevel(u8);

impl TorinoLevel {
    /// The integer level, `0..=10`.
    pub fn value(&self) -> u8 {
        self.0
    }

    /// Advisory text for the level, one of five fixed strings banded as
    /// 0 / 1 / 2-4 / 5-7 / 8-10.
    pub fn recommendation(&self) -> &'static str {
        match self.0 {
            0 => "No hazard: the likelihood of collision is zero, or well below the chance of a random object striking Earth",
            1 => "Normal: a routine discovery with no unusual level of danger; new observations will very likely reassign level 0",
            2..=4 => "Meriting attention by astronomers: the orbit should be monitored and refined with follow-up observations",
            5..=7 => "Threatening: a close encounter posing a serious threat; governmental contingency planning may be warranted",
            _ => "Certain collision: capable of causing localized destruction up to a global climatic catastrophe",
        }
    }
}

impl fmt::Display for TorinoLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Torino {}", self.0)
    }
}

type TorinoRule = fn(f64, f64) -> bool;

/// The classification ladder, first match wins. `p` is the impact
/// probability, `e` the yield in megatons.
const TORINO_RULES: [(TorinoRule, u8); 15] = [
    // Harmless regardless of probability.
    (|_p, e| e < MIN_CONSEQUENTIAL_ENERGY_MT, 0),
    // Near-certain collisions, graded by consequence.
    (|p, e| p >= 0.99 && e >= 1_000.0, 10),
    (|p, e| p >= 0.99 && e >= 1.0, 9),
    (|p, _e| p >= 0.99, 8),
    // Likely close encounters.
    (|p, e| p >= 0.5 && e >= 1_000.0, 7),
    (|p, e| p >= 0.5 && e >= 100.0, 6),
    (|p, _e| p >= 0.5, 5),
    (|p, e| p >= 0.01 && e >= 100.0, 5),
    (|p, _e| p >= 0.01, 4),
    // Encounters meriting attention.
    (|p, e| p >= 0.001 && e >= 100.0, 4),
    (|p, _e| p >= 0.001, 3),
    (|p, e| p >= 0.0001 && e >= 1_000.0, 3),
    (|p, e| p >= 0.0001 && e >= 10.0, 2),
    (|p, _e| p >= 0.0001, 1),
    // Residual: a large body with any non-zero probability stays visible.
    (|p, e| p > 0.0 && e >= 100.0, 1),
];

/// Classify a (probability, yield) pair on the Torino scale.
///
/// Arguments
/// ---------
/// * `probability`: impact probability in `[0, 1]`.
/// * `energy_mt`: yield in megatons of TNT, non-negative.
///
/// Return
/// ------
/// * The [`TorinoLevel`], or a validation error for out-of-range inputs.
///
/// See also
/// --------
/// * [`torino_scale_from_parameters`] – Derives the yield from physical
///   parameters first.
pub fn torino_scale(probability: f64, energy_mt: f64) -> Result<TorinoLevel> {
    if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
        return Err(SpaceguardError::InvalidProbability(probability));
    }
    if !energy_mt.is_finite() || energy_mt < 0.0 {
        return Err(SpaceguardError::InvalidEnergy(energy_mt));
    }

    let level = TORINO_RULES
        .iter()
        .find(|(rule, _)| rule(probability, energy_mt))
        .map_or(0, |(_, level)| *level);
    Ok(TorinoLevel(level))
}

/// Classify from physical parameters, deriving the yield with
/// [`estimate_impact_energy`] first.
///
/// Arguments
/// ---------
/// * `probability`: impact probability in `[0, 1]`.
/// * `diameter_km`: impactor diameter, km.
/// * `velocity_km_s`: entry speed, km/s.
/// * `density`: bulk density in kg/m³, `None` for the stony default.
pub fn torino_scale_from_parameters(
    probability: f64,
    diameter_km: Kilometer,
    velocity_km_s: KmPerSecond,
    density: Option<f64>,
) -> Result<TorinoLevel> {
    let energy = estimate_impact_energy(diameter_km, velocity_km_s, density)?;
    torino_scale(probability, energy.energy_megatons)
}
