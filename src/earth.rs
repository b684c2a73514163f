//! # Earth position models
//!
//! Two Earth models coexist in this crate, and they are kept separate on
//! purpose:
//!
//! * [`earth_elements`] – a full Keplerian element set (J2000 mean elements).
//!   Used by the trajectory sampler and the closest-approach search, where
//!   the per-call cost is amortized over hundreds of epochs and geocentric
//!   distances feed user-facing output.
//! * [`earth_position_circular`] – a circular orbit of radius 1 AU with a
//!   fixed 365.25-day period, phased to Earth's J2000 mean longitude. Used by
//!   the Monte Carlo sampler, where Earth is evaluated once per sample and
//!   the ≲ 0.02 AU model error is small against the sampled element
//!   uncertainty.
//!
//! Swapping one model for the other changes simulated impact probabilities;
//! callers must not mix them within a single analysis.
//!
//! ## Units
//!
//! Positions are heliocentric ecliptic, in AU; epochs are Julian Dates.

use nalgebra::Vector3;

use crate::constants::{AstronomicalUnit, Degree, JulianDate, DPI, J2000};
use crate::kepler::PropagationParams;
use crate::keplerian_element::KeplerianElements;
use crate::spaceguard_errors::Result;

/// Earth mean ecliptic longitude at J2000.0, degrees.
pub const EARTH_MEAN_LONGITUDE_J2000: Degree = 100.46435;

/// Orbital period of the circular Earth model, days.
pub const EARTH_CIRCULAR_PERIOD_DAYS: f64 = 365.25;

/// Orbital radius of the circular Earth model, AU.
pub const EARTH_CIRCULAR_RADIUS_AU: AstronomicalUnit = 1.0;

/// Earth's J2000 mean Keplerian elements (Standish table).
///
/// The longitude of perihelion ϖ = 102.94719° and mean longitude
/// L = 100.46435° are decomposed into ω = ϖ − Ω and M₀ = L − ϖ, so the
/// element set reproduces Earth's perihelion passage in early January.
///
/// Return
/// ------
/// * A validated [`KeplerianElements`] set referenced to J2000.
///
/// See also
/// --------
/// * [`earth_position`] – shorthand to propagate these elements.
/// * [`earth_position_circular`] – the cheap model used by the simulator.
pub fn earth_elements() -> KeplerianElements {
    KeplerianElements {
        reference_epoch: J2000,
        semi_major_axis: 1.00000011,
        eccentricity: 0.01671022,
        inclination: 0.00005,
        ascending_node_longitude: -11.26064,
        periapsis_argument: 114.20783,
        mean_anomaly: -2.48284,
    }
}

/// Earth's heliocentric position from the full Keplerian model, in AU.
///
/// Arguments
/// ---------
/// * `jd`: epoch of evaluation (Julian Date).
/// * `params`: Kepler solver tolerances.
///
/// Return
/// ------
/// * The heliocentric ecliptic position vector.
pub fn earth_position(jd: JulianDate, params: &PropagationParams) -> Result<Vector3<f64>> {
    earth_elements().position_at(jd, params)
}

/// Earth's heliocentric position from the circular-orbit model, in AU.
///
/// Radius 1 AU, period 365.25 days, phased to the J2000 mean longitude:
/// two trig calls per evaluation, no Kepler solve. The eccentricity and
/// period differences against [`earth_elements`] bound the error at about
/// 0.02 AU.
pub fn earth_position_circular(jd: JulianDate) -> Vector3<f64> {
    let angle =
        EARTH_MEAN_LONGITUDE_J2000.to_radians() + DPI * (jd - J2000) / EARTH_CIRCULAR_PERIOD_DAYS;
    Vector3::new(
        EARTH_CIRCULAR_RADIUS_AU * angle.cos(),
        EARTH_CIRCULAR_RADIUS_AU * angle.sin(),
        0.0,
    )
}

#[cfg(test)]
mod earth_test {
    use super::*;
    use crate::constants::GAUSS_GRAV;
    use approx::assert_relative_eq;

    #[test]
    fn test_earth_elements_are_valid() {
        assert!(earth_elements().validate().is_ok());
    }

    #[test]
    fn test_earth_radius_stays_between_apsides() {
        let params = PropagationParams::default();
        let elements = earth_elements();
        for offset in [0.0, 50.0, 123.4, 200.0, 300.0, 365.0] {
            let r = earth_position(J2000 + offset, &params).unwrap().norm();
            assert!(r >= elements.perihelion_distance() - 1e-12);
            assert!(r <= elements.aphelion_distance() + 1e-12);
        }
    }

    #[test]
    fn test_earth_stays_close_to_ecliptic() {
        let params = PropagationParams::default();
        for offset in [0.0, 91.0, 182.0, 273.0] {
            let z = earth_position(J2000 + offset, &params).unwrap().z;
            // i = 0.00005 degrees keeps |z| below a millionth of an AU.
            assert!(z.abs() < 1e-6);
        }
    }

    #[test]
    fn test_earth_perihelion_in_early_january() {
        // M₀ = −2.48284° and n ≈ 0.9856°/day put the perihelion passage
        // about 2.52 days after J2000, at the minimum radius a(1−e).
        let params = PropagationParams::default();
        let elements = earth_elements();
        let days_to_perihelion =
            -elements.mean_anomaly.to_radians() / elements.mean_motion();
        assert!((2.0..3.0).contains(&days_to_perihelion));

        let r = earth_position(J2000 + days_to_perihelion, &params)
            .unwrap()
            .norm();
        assert_relative_eq!(r, elements.perihelion_distance(), epsilon = 1e-9);
    }

    #[test]
    fn test_circular_model_radius_and_phase() {
        // Radius is exactly 1 AU at every epoch.
        for offset in [0.0, 10.0, 100.0, 400.0] {
            assert_relative_eq!(
                earth_position_circular(J2000 + offset).norm(),
                1.0,
                epsilon = 1e-12
            );
        }
        // At J2000 the model sits at the mean longitude.
        let position = earth_position_circular(J2000);
        let expected = EARTH_MEAN_LONGITUDE_J2000.to_radians();
        assert_relative_eq!(position.y.atan2(position.x), expected, epsilon = 1e-12);
    }

    #[test]
    fn test_circular_model_period() {
        let start = earth_position_circular(J2000);
        let one_period = earth_position_circular(J2000 + EARTH_CIRCULAR_PERIOD_DAYS);
        assert_relative_eq!(start.x, one_period.x, epsilon = 1e-9);
        assert_relative_eq!(start.y, one_period.y, epsilon = 1e-9);
    }

    #[test]
    fn test_models_agree_to_two_percent() {
        // The two models share the phase convention; the residual gap is the
        // eccentricity (up to ~2e AU) plus a slow period drift.
        let params = PropagationParams::default();
        for offset in [0.0, 60.0, 120.0, 180.0, 240.0, 300.0, 730.0, 1826.0] {
            let full = earth_position(J2000 + offset, &params).unwrap();
            let circular = earth_position_circular(J2000 + offset);
            let gap = (full - circular).norm();
            assert!(gap < 0.05, "models diverged by {gap} AU at offset {offset}");
        }
    }

    #[test]
    fn test_full_model_period_close_to_sidereal_year() {
        let elements = earth_elements();
        let period = elements.orbital_period_days();
        // Kepler's third law with a = 1.00000011 AU: the 2π/k base period
        // stretched by a^(3/2), about 6e-5 days above 365.2569.
        let expected = DPI / GAUSS_GRAV * elements.semi_major_axis.powf(1.5);
        assert_relative_eq!(period, expected, epsilon = 1e-9);
        assert_relative_eq!(period, DPI / GAUSS_GRAV, epsilon = 1e-4);
    }
}
