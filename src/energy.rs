//! # Impact energy estimation
//!
//! Kinetic energy of an impactor from its size and entry speed: a spherical
//! volume gives the mass, the mass and speed give joules, and the megaton
//! equivalent is banded into one of six qualitative severity classes.
//!
//! ## Units
//!
//! Diameter in km, velocity in km/s, density in kg/m³, energy in joules and
//! megatons of TNT.

use std::fmt;

use crate::constants::{
    Kilometer, KmPerSecond, DEFAULT_DENSITY, HIROSHIMA_MEGATONS, JOULES_PER_MEGATON,
};
use crate::spaceguard_errors::{Result, SpaceguardError};

/// Qualitative consequence band for a megaton-equivalent yield.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Severity {
    /// Below 1 MT: damage confined to the impact area.
    Local,
    /// 1 to 100 MT: enough to level a large city.
    CityDestroyer,
    /// 100 to 10,000 MT: devastation across hundreds of kilometers.
    Regional,
    /// 10,000 to 1 million MT: continent-scale destruction.
    Continental,
    /// 1 million to 100 million MT: global climate disruption.
    MassExtinction,
    /// Above 100 million MT.
    PlanetSterilizing,
}

impl Severity {
    /// Band a megaton-equivalent yield.
    pub fn from_megatons(megatons: f64) -> Self {
        if megatons < 1.0 {
            Severity::Local
        } else if megatons < 100.0 {
            Severity::CityDestroyer
        } else if megatons < 10_000.0 {
            Severity::Regional
        } else if megatons < 1.0e6 {
            Severity::Continental
        } else if megatons < 1.0e8 {
            Severity::MassExtinction
        } else {
            Severity::PlanetSterilizing
        }
    }

    /// One-sentence description of the expected consequences.
    pub fn description(&self) -> &'static str {
        match self {
            Severity::Local => "Localized damage near the impact site",
            Severity::CityDestroyer => "Capable of destroying a large city",
            Severity::Regional => "Regional devastation across hundreds of kilometers",
            Severity::Continental => "Continent-scale destruction with climate effects",
            Severity::MassExtinction => "Global catastrophe, mass extinction likely",
            Severity::PlanetSterilizing => "Planet-sterilizing event",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Local => "local",
            Severity::CityDestroyer => "city destroyer",
            Severity::Regional => "regional",
            Severity::Continental => "continental",
            Severity::MassExtinction => "mass extinction",
            Severity::PlanetSterilizing => "planet sterilizing",
        };
        write!(f, "{label}")
    }
}

/// Kinetic energy estimate for an impactor.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImpactEnergy {
    /// Impactor mass, kg.
    pub mass_kg: f64,
    /// Kinetic energy, joules.
    pub energy_joules: f64,
    /// TNT equivalent, megatons.
    pub energy_megatons: f64,
    /// Energy as a multiple of the Hiroshima bomb.
    pub hiroshima_multiple: f64,
    /// Consequence band of the megaton value.
    pub severity: Severity,
}

/// Estimate the impact energy of a spherical body.
///
/// Arguments
/// ---------
/// * `diameter_km`: impactor diameter, km, non-negative.
/// * `velocity_km_s`: entry speed, km/s, non-negative.
/// * `density`: bulk density in kg/m³; `None` uses [`DEFAULT_DENSITY`]
///   (2,500 kg/m³, a typical stony asteroid).
///
/// Return
/// ------
/// * An [`ImpactEnergy`] with mass, joules, megatons, the Hiroshima
///   multiple and the [`Severity`] band.
pub fn estimate_impact_energy(
    diameter_km: Kilometer,
    velocity_km_s: KmPerSecond,
    density: Option<f64>,
) -> Result<ImpactEnergy> {
    if !diameter_km.is_finite() || diameter_km < 0.0 {
        return Err(SpaceguardError::InvalidImpactParameter(format!(
            "diameter must be finite and non-negative, got {diameter_km} km"
        )));
    }
    if !velocity_km_s.is_finite() || velocity_km_s < 0.0 {
        return Err(SpaceguardError::InvalidImpactParameter(format!(
            "velocity must be finite and non-negative, got {velocity_km_s} km/s"
        )));
    }
    let density = density.unwrap_or(DEFAULT_DENSITY);
    if !density.is_finite() || density <= 0.0 {
        return Err(SpaceguardError::InvalidImpactParameter(format!(
            "density must be finite and positive, got {density} kg/m^3"
        )));
    }

    let radius_m = diameter_km * 1_000.0 / 2.0;
    let volume_m3 = 4.0 / 3.0 * std::f64::consts::PI * radius_m.powi(3);
    let mass_kg = density * volume_m3;

    let velocity_m_s = velocity_km_s * 1_000.0;
    let energy_joules = 0.5 * mass_kg * velocity_m_s * velocity_m_s;
    let energy_megatons = energy_joules / JOULES_PER_MEGATON;

    Ok(ImpactEnergy {
        mass_kg,
        energy_joules,
        energy_megatons,
        hiroshima_multiple: energy_megatons / HIROSHIMA_MEGATONS,
        severity: Severity::from_megatons(energy_megatons),
    })
}
