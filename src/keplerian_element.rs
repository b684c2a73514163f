//! # Keplerian orbital elements and state vectors
//!
//! This module defines the [`KeplerianElements`] struct and the two-body
//! propagation routines that turn an element set into a heliocentric
//! Cartesian state at an arbitrary epoch.
//!
//! ## What are Keplerian elements?
//!
//! The six Keplerian elements are:
//!
//! 1. **a** – Semi-major axis (AU)
//! 2. **e** – Eccentricity (unitless)
//! 3. **i** – Inclination (degrees)
//! 4. **Ω** – Longitude of ascending node (degrees)
//! 5. **ω** – Argument of perihelion (degrees)
//! 6. **M₀** – Mean anomaly at epoch (degrees)
//!
//! Together with the reference epoch (Julian Date) these parameters fully
//! describe an orbit under the two-body approximation. Element sets are
//! supplied by an external source (ephemeris service, database) in degrees,
//! the convention of the common NEO catalogues; all internal math is done in
//! radians.
//!
//! ## Provided functionality
//!
//! - **Validation** of an element set ([`KeplerianElements::new`],
//!   [`KeplerianElements::validate`]).
//! - **Propagation** to a target epoch: mean-anomaly advance, Kepler solve,
//!   true-anomaly recovery and rotation into the heliocentric ecliptic frame
//!   ([`KeplerianElements::state_vector_at`]).
//! - **Derived quantities**: orbital period, perihelion and aphelion
//!   distances.
//!
//! ## Units
//!
//! - Lengths: **AU**
//! - Angles: **degrees** in the struct, **radians** internally
//! - Time: **days** (epochs in **Julian Date**)
//! - Velocities: **AU/day**
//!
//! ## Example
//!
//! ```rust
//! use spaceguard::kepler::PropagationParams;
//! use spaceguard::KeplerianElements;
//!
//! // Elements close to (99942) Apophis.
//! let elements = KeplerianElements::new(0.9224, 0.1911, 3.331, 204.45, 126.39, 245.9, 2459000.5)
//!     .expect("valid elements");
//!
//! let params = PropagationParams::default();
//! let state = elements.state_vector_at(2459600.5, &params, true).unwrap();
//! assert!(state.position.norm() > elements.perihelion_distance());
//! assert!(state.velocity.is_some());
//! ```
//!
//! ## See also
//!
//! - [`crate::kepler`] – the Kepler equation solver used during propagation.
//! - [`crate::earth`] – Earth models built on the same propagation.

use nalgebra::{Rotation3, Vector3};
use std::fmt;

use crate::constants::{
    AstronomicalUnit, Degree, JulianDate, Radian, DPI, GAUSS_GRAV, GAUSS_GRAV_SQUARED,
};
use crate::kepler::{
    eccentric_to_true_anomaly, principal_angle, solve_kepler_equation, PropagationParams,
};
use crate::spaceguard_errors::{Result, SpaceguardError};

/// Heliocentric ecliptic state at some epoch.
///
/// Units
/// -----
/// * `position`: AU.
/// * `velocity`: AU/day, present only when requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateVector {
    pub position: Vector3<f64>,
    pub velocity: Option<Vector3<f64>>,
}

/// Keplerian orbital elements (osculating, two-body).
///
/// Units
/// -----
/// * `reference_epoch`: Julian Date.
/// * `semi_major_axis`: Astronomical Units (AU).
/// * `eccentricity`: unitless, `[0, 1)`.
/// * `inclination`: degrees.
/// * `ascending_node_longitude`: degrees (Ω).
/// * `periapsis_argument`: degrees (ω).
/// * `mean_anomaly`: degrees (M₀ at `reference_epoch`).
///
/// Notes
/// -----
/// Instances are plain data supplied by the external element source; the
/// engine never mutates them. Construct through [`KeplerianElements::new`] to
/// get validation, or fill the fields directly when the data is already
/// trusted.
#[derive(Debug, PartialEq, Clone, serde::Serialize, serde::Deserialize)]
pub struct KeplerianElements {
    pub reference_epoch: JulianDate,
    pub semi_major_axis: AstronomicalUnit,
    pub eccentricity: f64,
    pub inclination: Degree,
    pub ascending_node_longitude: Degree,
    pub periapsis_argument: Degree,
    pub mean_anomaly: Degree,
}

impl KeplerianElements {
    /// Build a validated element set.
    ///
    /// Arguments
    /// ---------
    /// * `semi_major_axis`: AU, must be strictly positive.
    /// * `eccentricity`: must lie in `[0, 1)` (elliptic orbits only).
    /// * `inclination`, `ascending_node_longitude`, `periapsis_argument`,
    ///   `mean_anomaly`: degrees, must be finite.
    /// * `reference_epoch`: Julian Date of validity.
    ///
    /// Return
    /// ------
    /// * `Ok(KeplerianElements)` or
    ///   [`SpaceguardError::InvalidOrbitalElements`] naming the offending
    ///   field.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        semi_major_axis: AstronomicalUnit,
        eccentricity: f64,
        inclination: Degree,
        ascending_node_longitude: Degree,
        periapsis_argument: Degree,
        mean_anomaly: Degree,
        reference_epoch: JulianDate,
    ) -> Result<Self> {
        let elements = Self {
            reference_epoch,
            semi_major_axis,
            eccentricity,
            inclination,
            ascending_node_longitude,
            periapsis_argument,
            mean_anomaly,
        };
        elements.validate()?;
        Ok(elements)
    }

    /// Check the element set against the validity domain of the propagator.
    pub fn validate(&self) -> Result<()> {
        if !(self.semi_major_axis.is_finite() && self.semi_major_axis > 0.0) {
            return Err(SpaceguardError::InvalidOrbitalElements(format!(
                "semi-major axis {} AU must be > 0",
                self.semi_major_axis
            )));
        }
        if !(0.0..1.0).contains(&self.eccentricity) || !self.eccentricity.is_finite() {
            return Err(SpaceguardError::InvalidOrbitalElements(format!(
                "eccentricity {} outside [0, 1)",
                self.eccentricity
            )));
        }
        for (name, value) in [
            ("inclination", self.inclination),
            ("ascending node", self.ascending_node_longitude),
            ("periapsis argument", self.periapsis_argument),
            ("mean anomaly", self.mean_anomaly),
            ("reference epoch", self.reference_epoch),
        ] {
            if !value.is_finite() {
                return Err(SpaceguardError::InvalidOrbitalElements(format!(
                    "{name} is not finite"
                )));
            }
        }
        Ok(())
    }

    /// Mean motion n in radians per day, from Kepler's third law with the
    /// Gaussian gravitational constant (n² a³ = k²).
    pub fn mean_motion(&self) -> Radian {
        (GAUSS_GRAV_SQUARED / self.semi_major_axis.powi(3)).sqrt()
    }

    /// Sidereal orbital period in days.
    pub fn orbital_period_days(&self) -> f64 {
        DPI / self.mean_motion()
    }

    /// Perihelion distance `a(1−e)` in AU.
    pub fn perihelion_distance(&self) -> AstronomicalUnit {
        self.semi_major_axis * (1.0 - self.eccentricity)
    }

    /// Aphelion distance `a(1+e)` in AU.
    pub fn aphelion_distance(&self) -> AstronomicalUnit {
        self.semi_major_axis * (1.0 + self.eccentricity)
    }

    /// Mean anomaly advanced to `target_jd`, normalized to [0, 2π).
    ///
    /// This is the value handed to the Kepler solver during propagation,
    /// exposed on its own because mission tests pin it directly.
    pub fn propagated_mean_anomaly(&self, target_jd: JulianDate) -> Radian {
        let dt = target_jd - self.reference_epoch;
        principal_angle(self.mean_anomaly.to_radians() + self.mean_motion() * dt)
    }

    /// Propagate the elements to `target_jd` and return the heliocentric
    /// ecliptic state.
    ///
    /// The chain is the classical one: advance the mean anomaly, solve the
    /// Kepler equation, recover the true anomaly and orbital radius, then
    /// rotate the orbital-plane coordinates through `Rz(Ω)·Rx(i)·Rz(ω)`.
    ///
    /// Arguments
    /// ---------
    /// * `target_jd`: epoch of evaluation (Julian Date).
    /// * `params`: Kepler solver tolerances.
    /// * `with_velocity`: when true, the returned state carries the AU/day
    ///   velocity obtained by differentiating the same geometry.
    ///
    /// Return
    /// ------
    /// * `Ok(StateVector)`; solver non-convergence degrades to a warning and
    ///   a best-estimate state, it never fails the call.
    /// * `Err(SpaceguardError::InvalidOrbitalElements)` when the element set
    ///   is outside the validity domain.
    ///
    /// See also
    /// --------
    /// * [`KeplerianElements::position_at`] – position-only shorthand.
    /// * [`KeplerianElements::velocity_at`] – velocity-only shorthand.
    pub fn state_vector_at(
        &self,
        target_jd: JulianDate,
        params: &PropagationParams,
        with_velocity: bool,
    ) -> Result<StateVector> {
        self.validate()?;

        let mean_anomaly = self.propagated_mean_anomaly(target_jd);
        let solution = solve_kepler_equation(mean_anomaly, self.eccentricity, params)?;
        let ecc_anomaly = solution.eccentric_anomaly;

        let true_anomaly = eccentric_to_true_anomaly(ecc_anomaly, self.eccentricity);
        let radius = self.semi_major_axis * (1.0 - self.eccentricity * ecc_anomaly.cos());

        // Orbital-plane coordinates, perihelion on the +x axis.
        let perifocal = Vector3::new(
            radius * true_anomaly.cos(),
            radius * true_anomaly.sin(),
            0.0,
        );

        let rotation = self.perifocal_to_ecliptic();
        let position = rotation * perifocal;

        let velocity = with_velocity.then(|| {
            // v = sqrt(mu / (a(1-e^2))) * (-sin nu, e + cos nu, 0) in the
            // orbital plane, with mu = k^2 in AU^3/day^2.
            let v_factor =
                GAUSS_GRAV / (self.semi_major_axis * (1.0 - self.eccentricity.powi(2))).sqrt();
            let perifocal_velocity = Vector3::new(
                -v_factor * true_anomaly.sin(),
                v_factor * (self.eccentricity + true_anomaly.cos()),
                0.0,
            );
            rotation * perifocal_velocity
        });

        Ok(StateVector { position, velocity })
    }

    /// Heliocentric ecliptic position at `target_jd`, in AU.
    pub fn position_at(
        &self,
        target_jd: JulianDate,
        params: &PropagationParams,
    ) -> Result<Vector3<f64>> {
        Ok(self.state_vector_at(target_jd, params, false)?.position)
    }

    /// Heliocentric ecliptic velocity at `target_jd`, in AU/day.
    pub fn velocity_at(
        &self,
        target_jd: JulianDate,
        params: &PropagationParams,
    ) -> Result<Vector3<f64>> {
        let state = self.state_vector_at(target_jd, params, true)?;
        state.velocity.ok_or_else(|| {
            SpaceguardError::InvalidOrbitalElements("velocity computation failed".into())
        })
    }

    /// Rotation from the orbital (perifocal) frame to the heliocentric
    /// ecliptic frame.
    fn perifocal_to_ecliptic(&self) -> Rotation3<f64> {
        Rotation3::from_axis_angle(
            &Vector3::z_axis(),
            self.ascending_node_longitude.to_radians(),
        ) * Rotation3::from_axis_angle(&Vector3::x_axis(), self.inclination.to_radians())
            * Rotation3::from_axis_angle(&Vector3::z_axis(), self.periapsis_argument.to_radians())
    }
}

impl fmt::Display for KeplerianElements {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Keplerian Elements @ epoch (JD): {:.6}",
            self.reference_epoch
        )?;
        writeln!(f, "-------------------------------------------")?;
        writeln!(
            f,
            "  a   (semi-major axis)        = {:.6} AU",
            self.semi_major_axis
        )?;
        writeln!(
            f,
            "  e   (eccentricity)           = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)            = {:.6}°",
            self.inclination
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)      = {:.6}°",
            self.ascending_node_longitude
        )?;
        writeln!(
            f,
            "  ω   (argument of perihelion) = {:.6}°",
            self.periapsis_argument
        )?;
        write!(
            f,
            "  M₀  (mean anomaly)           = {:.6}°",
            self.mean_anomaly
        )
    }
}
