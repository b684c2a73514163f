//! # Approximate perturbation annotations
//!
//! First-order gravitational acceleration contributions from Jupiter (the
//! dominant perturber of near-Earth orbits) and the Moon. These values are
//! **annotations only**: the trajectory sampler attaches them as metadata so
//! a caller can judge how far the two-body assumption is being stretched,
//! but they are never integrated into the propagated positions.
//!
//! Planet positions come from a planar first-order model (one
//! eccentric-anomaly correction term, no inclination), which is accurate to
//! a few percent — more than enough for an order-of-magnitude acceleration
//! estimate.
//!
//! ## Units
//!
//! Positions in AU, epochs in Julian Date, accelerations in AU/day².

use nalgebra::Vector3;

use crate::constants::{AstronomicalUnit, Degree, JulianDate, AU, DPI, GAUSS_GRAV_SQUARED, J2000};

/// Jupiter semi-major axis, AU.
pub const JUPITER_SEMI_MAJOR_AU: AstronomicalUnit = 5.2044;

/// Jupiter orbital eccentricity.
pub const JUPITER_ECCENTRICITY: f64 = 0.0489;

/// Jupiter orbital period, days.
pub const JUPITER_PERIOD_DAYS: f64 = 4_332.59;

/// Jupiter mean anomaly at J2000, degrees.
pub const JUPITER_MEAN_ANOMALY_J2000: Degree = 19.6759;

/// Jupiter longitude of perihelion at J2000, degrees.
pub const JUPITER_PERIHELION_LONGITUDE: Degree = 14.72848;

/// Sun/Jupiter mass ratio (IAU).
pub const SUN_JUPITER_MASS_RATIO: f64 = 1_047.348625;

/// Sun/Moon mass ratio, from M☉/M⊕ = 332,946.05 and M⊕/M☾ = 81.30056.
pub const SUN_MOON_MASS_RATIO: f64 = 27_068_703.0;

/// Mean Earth-Moon distance, AU.
pub const MOON_DISTANCE_AU: AstronomicalUnit = 384_400.0 / AU;

/// Sidereal lunar period, days.
pub const MOON_PERIOD_DAYS: f64 = 27.3;

/// Bodies closer than this are treated as coincident and contribute no
/// acceleration, keeping the 1/r² term finite.
const MIN_SEPARATION_AU: f64 = 1.0e-6;

/// Acceleration contributions attached to a trajectory sample.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PerturbationEstimate {
    /// Acceleration toward Jupiter, AU/day².
    pub jupiter_accel: Vector3<f64>,
    /// Acceleration toward the Moon, AU/day².
    pub lunar_accel: Vector3<f64>,
}

impl PerturbationEstimate {
    /// Sum of the annotated contributions.
    pub fn total(&self) -> Vector3<f64> {
        self.jupiter_accel + self.lunar_accel
    }
}

/// Jupiter's heliocentric position from the planar first-order model, AU.
///
/// The eccentric anomaly is approximated by a single correction term
/// `E ≈ M + e·sin M`, then the true anomaly and orbital radius follow the
/// exact conic relations and the position is rotated to the longitude of
/// perihelion.
pub fn jupiter_position(jd: JulianDate) -> Vector3<f64> {
    let mean_anomaly =
        JUPITER_MEAN_ANOMALY_J2000.to_radians() + DPI * (jd - J2000) / JUPITER_PERIOD_DAYS;
    let ecc_anomaly = mean_anomaly + JUPITER_ECCENTRICITY * mean_anomaly.sin();

    let true_anomaly = 2.0
        * ((1.0 + JUPITER_ECCENTRICITY).sqrt() * (ecc_anomaly / 2.0).sin())
            .atan2((1.0 - JUPITER_ECCENTRICITY).sqrt() * (ecc_anomaly / 2.0).cos());

    let radius = JUPITER_SEMI_MAJOR_AU * (1.0 - JUPITER_ECCENTRICITY * JUPITER_ECCENTRICITY)
        / (1.0 + JUPITER_ECCENTRICITY * true_anomaly.cos());

    let longitude = true_anomaly + JUPITER_PERIHELION_LONGITUDE.to_radians();
    Vector3::new(radius * longitude.cos(), radius * longitude.sin(), 0.0)
}

/// The Moon's heliocentric position: Earth plus a circular 384,400 km
/// offset with a 27.3-day period.
///
/// Arguments
/// ---------
/// * `jd`: epoch of evaluation.
/// * `earth_position`: Earth's heliocentric position at `jd`, AU.
pub fn moon_position(jd: JulianDate, earth_position: &Vector3<f64>) -> Vector3<f64> {
    let angle = DPI * (jd - J2000) / MOON_PERIOD_DAYS;
    earth_position + Vector3::new(MOON_DISTANCE_AU * angle.cos(), MOON_DISTANCE_AU * angle.sin(), 0.0)
}

/// Point-mass acceleration of `body` toward `attractor`, AU/day².
fn acceleration_toward(
    body: &Vector3<f64>,
    attractor: &Vector3<f64>,
    mu: f64,
) -> Vector3<f64> {
    let separation = attractor - body;
    let distance = separation.norm();
    if distance < MIN_SEPARATION_AU {
        return Vector3::zeros();
    }
    separation * (mu / (distance * distance) / distance)
}

/// Estimate the perturbing accelerations acting on a body.
///
/// Arguments
/// ---------
/// * `jd`: epoch of evaluation.
/// * `body_position`: heliocentric position of the body, AU.
/// * `earth_position`: heliocentric position of Earth at `jd`, AU (the
///   caller already has it when assembling a trajectory sample).
///
/// Return
/// ------
/// * A [`PerturbationEstimate`] with the Jupiter and lunar contributions.
pub fn estimate_perturbations(
    jd: JulianDate,
    body_position: &Vector3<f64>,
    earth_position: &Vector3<f64>,
) -> PerturbationEstimate {
    let mu_jupiter = GAUSS_GRAV_SQUARED / SUN_JUPITER_MASS_RATIO;
    let mu_moon = GAUSS_GRAV_SQUARED / SUN_MOON_MASS_RATIO;

    let jupiter = jupiter_position(jd);
    let moon = moon_position(jd, earth_position);

    PerturbationEstimate {
        jupiter_accel: acceleration_toward(body_position, &jupiter, mu_jupiter),
        lunar_accel: acceleration_toward(body_position, &moon, mu_moon),
    }
}
