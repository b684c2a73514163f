//! # Kepler equation solver
//!
//! Newton–Raphson solution of the elliptic Kepler equation
//! `E − e·sin E = M`, the numerical core of every propagation in this crate.
//!
//! ## Overview
//!
//! * [`solve_kepler_equation`] – iterate to the eccentric anomaly, returning
//!   the best estimate together with a convergence flag instead of failing
//!   when the iteration cap is reached,
//! * [`eccentric_to_true_anomaly`] – half-angle conversion to the true
//!   anomaly,
//! * [`PropagationParams`] – solver tolerances with a validated builder.
//!
//! Hyperbolic and parabolic orbits (`e ≥ 1`) are rejected as invalid input.

use std::f64::consts::PI;

use crate::constants::{Radian, DPI};
use crate::spaceguard_errors::{Result, SpaceguardError};

/// Principal value of an angle in radians, in [0, 2π).
pub(crate) fn principal_angle(a: f64) -> f64 {
    a.rem_euclid(DPI)
}

/// Numerical parameters of the Kepler solver.
///
/// Defaults match the classical choice for near-Earth work: a tolerance of
/// `1e-10` on the Newton step and at most 50 iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropagationParams {
    /// Convergence tolerance on the Newton correction (radians).
    pub kepler_tol: f64,
    /// Maximum number of Newton iterations before giving up.
    pub kepler_max_iter: usize,
}

impl Default for PropagationParams {
    fn default() -> Self {
        Self {
            kepler_tol: 1.0e-10,
            kepler_max_iter: 50,
        }
    }
}

impl PropagationParams {
    /// Create a builder initialized with default values.
    pub fn builder() -> PropagationParamsBuilder {
        PropagationParamsBuilder::new()
    }
}

/// Builder for [`PropagationParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct PropagationParamsBuilder {
    params: PropagationParams,
}

impl PropagationParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: PropagationParams::default(),
        }
    }

    pub fn kepler_tol(mut self, v: f64) -> Self {
        self.params.kepler_tol = v;
        self
    }

    pub fn kepler_max_iter(mut self, v: usize) -> Self {
        self.params.kepler_max_iter = v;
        self
    }

    /// Finalize the builder and produce a [`PropagationParams`] instance.
    ///
    /// Validation rules
    /// -----------------
    /// * `kepler_tol` must be finite and strictly positive,
    /// * `kepler_max_iter` must be at least 1.
    ///
    /// Return
    /// ------
    /// * `Ok(PropagationParams)` when all values are valid,
    /// * `Err(SpaceguardError::InvalidSimulationParameter)` otherwise.
    pub fn build(self) -> Result<PropagationParams> {
        let p = &self.params;
        if !(p.kepler_tol.is_finite() && p.kepler_tol > 0.0) {
            return Err(SpaceguardError::InvalidSimulationParameter(
                "kepler_tol must be finite and > 0".into(),
            ));
        }
        if p.kepler_max_iter == 0 {
            return Err(SpaceguardError::InvalidSimulationParameter(
                "kepler_max_iter must be >= 1".into(),
            ));
        }
        Ok(self.params)
    }
}

/// Outcome of a Kepler solve: the eccentric anomaly, whether the iteration
/// converged within the configured tolerance, and how many iterations were
/// spent.
///
/// Non-convergence is deliberately not an error: the best estimate is still
/// usable and the caller decides how much to trust it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerSolution {
    /// Eccentric anomaly in radians.
    pub eccentric_anomaly: Radian,
    /// True when the last Newton correction fell below the tolerance.
    pub converged: bool,
    /// Number of Newton iterations performed.
    pub iterations: usize,
}

/// Solve the elliptic Kepler equation `E − e·sin E = M` by Newton–Raphson.
///
/// The initial guess is `M` for `e < 0.8` and `π` for highly eccentric
/// orbits, where the near-aphelion geometry makes `M` a poor start.
///
/// Arguments
/// ---------
/// * `mean_anomaly`: mean anomaly `M` in radians (any value, not required to
///   be normalized).
/// * `eccentricity`: orbital eccentricity, must lie in `[0, 1)`.
/// * `params`: solver tolerances, see [`PropagationParams`].
///
/// Return
/// ------
/// * `Ok(KeplerSolution)` carrying the eccentric anomaly. When the solver
///   exhausts its iteration budget the solution has `converged = false`, a
///   `tracing` warning is emitted and the best estimate is returned; the call
///   never fails for this reason.
/// * `Err(SpaceguardError::InvalidOrbitalElements)` when `e` is outside
///   `[0, 1)`.
///
/// See also
/// --------
/// * [`eccentric_to_true_anomaly`] – next step of the anomaly chain.
pub fn solve_kepler_equation(
    mean_anomaly: Radian,
    eccentricity: f64,
    params: &PropagationParams,
) -> Result<KeplerSolution> {
    if !(0.0..1.0).contains(&eccentricity) || !eccentricity.is_finite() {
        return Err(SpaceguardError::InvalidOrbitalElements(format!(
            "eccentricity {eccentricity} outside [0, 1): orbit is not elliptic"
        )));
    }

    let mut ecc_anomaly = if eccentricity < 0.8 { mean_anomaly } else { PI };

    for iteration in 1..=params.kepler_max_iter {
        let f = ecc_anomaly - eccentricity * ecc_anomaly.sin() - mean_anomaly;
        let fp = 1.0 - eccentricity * ecc_anomaly.cos();
        let delta = f / fp;
        ecc_anomaly -= delta;

        if delta.abs() < params.kepler_tol {
            return Ok(KeplerSolution {
                eccentric_anomaly: ecc_anomaly,
                converged: true,
                iterations: iteration,
            });
        }
    }

    tracing::warn!(
        mean_anomaly,
        eccentricity,
        max_iter = params.kepler_max_iter,
        "Kepler solver did not converge, returning best estimate"
    );

    Ok(KeplerSolution {
        eccentric_anomaly: ecc_anomaly,
        converged: false,
        iterations: params.kepler_max_iter,
    })
}

/// Convert an eccentric anomaly to the true anomaly through the half-angle
/// identity `tan(ν/2) = sqrt((1+e)/(1−e))·tan(E/2)`.
///
/// Arguments
/// ---------
/// * `ecc_anomaly`: eccentric anomaly `E` in radians.
/// * `eccentricity`: orbital eccentricity in `[0, 1)`.
///
/// Return
/// ------
/// * The true anomaly ν in radians, same branch as `E`.
pub fn eccentric_to_true_anomaly(ecc_anomaly: Radian, eccentricity: f64) -> Radian {
    let half = ecc_anomaly / 2.0;
    2.0 * ((1.0 + eccentricity).sqrt() * half.sin()).atan2((1.0 - eccentricity).sqrt() * half.cos())
}
