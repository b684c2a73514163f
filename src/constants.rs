//! # Constants and type definitions for Spaceguard
//!
//! This module centralizes the **physical constants**, **conversion factors**, and **common type
//! definitions** used throughout the `spaceguard` library, together with the identifier type for
//! near-Earth objects.
//!
//! ## Overview
//!
//! - Astronomical constants (AU, Gaussian gravitational constant, J2000 epoch)
//! - Encounter-distance thresholds shared by the Monte Carlo simulator and the risk engine
//! - Impact-energy conversion factors
//! - Core type aliases used across the crate
//! - Identifiers for near-Earth objects
//!
//! These definitions are used by all main modules, including propagation, trajectory search,
//! simulation and risk assessment.

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Number of seconds in a Julian day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Astronomical Unit in kilometers (IAU 2012)
pub const AU: f64 = 149_597_870.7;

/// Julian Date of the J2000.0 epoch (2000-01-01 12:00:00)
pub const J2000: f64 = 2_451_545.0;

/// Conversion factor between Julian Date and Modified Julian Date
pub const JDTOMJD: f64 = 2_400_000.5;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Gaussian gravitational constant k (rad/day for distances in AU)
pub const GAUSS_GRAV: f64 = 0.01720209895;

/// k², often used in Kepler's third law
pub const GAUSS_GRAV_SQUARED: f64 = GAUSS_GRAV * GAUSS_GRAV;

// -------------------------------------------------------------------------------------------------
// Encounter-distance thresholds
// -------------------------------------------------------------------------------------------------

/// Effective Earth capture radius in kilometers (geometric radius plus a
/// gravitational-focusing margin). A sampled miss distance below this value
/// counts as an impact.
pub const EARTH_CAPTURE_RADIUS_KM: f64 = 6_500.0;

/// Mean Earth-Moon distance in kilometers; the "close approach" threshold.
pub const LUNAR_DISTANCE_KM: f64 = 384_400.0;

/// "Very close" passage threshold in kilometers.
pub const VERY_CLOSE_DISTANCE_KM: f64 = 50_000.0;

/// Upper edge of the "close" proximity band in kilometers; the proximity
/// score drops from 100 to 50 between the lunar distance and this value.
pub const MODERATE_DISTANCE_KM: f64 = 1_500_000.0;

/// Distance beyond which an encounter contributes nothing to the proximity
/// score.
pub const SAFE_DISTANCE_KM: f64 = 7_500_000.0;

// -------------------------------------------------------------------------------------------------
// Impact-energy factors
// -------------------------------------------------------------------------------------------------

/// Joules per megaton of TNT
pub const JOULES_PER_MEGATON: f64 = 4.184e15;

/// Hiroshima bomb yield in megatons of TNT
pub const HIROSHIMA_MEGATONS: f64 = 0.015;

/// Default bulk density of a stony asteroid in kg/m³
pub const DEFAULT_DENSITY: f64 = 2_500.0;

/// Default geometric albedo assumed when estimating a diameter from the
/// absolute magnitude H
pub const DEFAULT_ALBEDO: f64 = 0.14;

// -------------------------------------------------------------------------------------------------
// Workload bounds
// -------------------------------------------------------------------------------------------------

/// Hard cap on the number of Monte Carlo samples for a single simulation run.
pub const MAX_SIMULATIONS: usize = 10_000;

/// Default number of Monte Carlo samples.
pub const DEFAULT_SIMULATIONS: usize = 1_000;

/// Hard cap on the number of asteroids accepted by a single batch risk
/// assessment.
pub const MAX_BATCH_SIZE: usize = 100;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Distance in astronomical units
pub type AstronomicalUnit = f64;
/// Speed in kilometers per second
pub type KmPerSecond = f64;
/// Julian Date (days)
pub type JulianDate = f64;
/// Modified Julian Date (days)
pub type MJD = f64;

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a near-Earth object.
///
/// This can be:
/// - A numbered asteroid (e.g. `Numbered(99942)`)
/// - A provisional designation (e.g. `"2004 MN4"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum Designation {
    /// Permanent asteroid number (e.g. 433, 99942…)
    Numbered(u32),
    /// Provisional or packed designation
    Provisional(String),
}

impl std::fmt::Display for Designation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Designation::Numbered(n) => write!(f, "{n}"),
            Designation::Provisional(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for Designation {
    fn from(n: u32) -> Self {
        Designation::Numbered(n)
    }
}

impl From<String> for Designation {
    fn from(s: String) -> Self {
        Designation::Provisional(s)
    }
}

impl From<&str> for Designation {
    fn from(s: &str) -> Self {
        Designation::Provisional(s.to_string())
    }
}

impl std::str::FromStr for Designation {
    type Err = std::num::ParseIntError;

    /// Try to parse a `Designation` from a string.
    /// - Pure digits → `Numbered(u32)`
    /// - Otherwise  → `Provisional(String)`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<u32>() {
            Ok(n) => Ok(Designation::Numbered(n)),
            Err(e) => {
                // If parse as int failed but it's a legit designation, fallback to Provisional
                if s.chars().any(|c| !c.is_ascii_digit()) {
                    Ok(Designation::Provisional(s.to_string()))
                } else {
                    Err(e)
                }
            }
        }
    }
}
