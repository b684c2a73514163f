//! # Composite risk assessment
//!
//! Orchestrates the other modules into a single verdict per object: a cheap
//! heuristic score for listing and sorting, a comprehensive weighted score,
//! the Torino classification, an optional Monte Carlo summary, an impact
//! energy estimate, and a final qualitative label.
//!
//! ## Scoring model
//! -----------------
//! Two scores coexist on purpose:
//!
//! * [`basic_risk_score`] – three additive contributions (hazard flag, size,
//!   proximity), no propagation, microseconds per object. Used wherever a
//!   full simulation is too expensive.
//! * [`comprehensive_score`] – five weighted factors with the weights
//!   published as module constants ([`W_PHA`], [`W_PROXIMITY`], [`W_SIZE`],
//!   [`W_VELOCITY`], [`W_PROBABILITY`], summing to 100). Factors with
//!   missing inputs contribute zero rather than failing.
//!
//! Both scores are clamped into `[0, 100]`.
//!
//! ## Error semantics
//! -----------------
//! [`assess_risk`] surfaces validation errors (negative sizes or distances,
//! invalid elements). [`batch_assess_risk`] isolates them: a failing item
//! degrades to a basic-score-only assessment with a [`tracing`] warning,
//! and the batch completes.
//!
//! ## Example
//! -----------------
//! ```rust
//! use rand::SeedableRng;
//! use spaceguard::constants::Designation;
//! use spaceguard::risk::{assess_risk, Asteroid, RiskParams};
//!
//! # fn main() -> Result<(), spaceguard::spaceguard_errors::SpaceguardError> {
//! let asteroid = Asteroid {
//!     designation: Designation::Numbered(99942),
//!     absolute_magnitude: Some(19.7),
//!     diameter_km: Some(0.37),
//!     is_potentially_hazardous: true,
//!     approach_velocity_km_s: Some(7.42),
//!     miss_distance_km: Some(38_000.0),
//!     orbital_elements: None,
//! };
//!
//! let params = RiskParams::default();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let assessment = assess_risk(&asteroid, None, &params, &mut rng)?;
//! println!("{assessment:#}");
//! # Ok(())
//! # }
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::monte_carlo::run_simulation`] – The probability estimate the
//!   comprehensive score and Torino classification consume.
//! * [`crate::torino`] – The discrete hazard ladder behind the label.

use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use rand::Rng;

use crate::constants::{
    Designation, JulianDate, Kilometer, KmPerSecond, Meter, DEFAULT_ALBEDO,
    DEFAULT_SIMULATIONS, LUNAR_DISTANCE_KM, MAX_BATCH_SIZE, MAX_SIMULATIONS, MODERATE_DISTANCE_KM,
    SAFE_DISTANCE_KM,
};
use crate::energy::{estimate_impact_energy, ImpactEnergy};
use crate::kepler::PropagationParams;
use crate::keplerian_element::KeplerianElements;
use crate::monte_carlo::{
    run_simulation, ElementUncertainties, SimulationParams, SimulationResult,
};
use crate::spaceguard_errors::{Result, SpaceguardError};
use crate::torino::{torino_scale, TorinoLevel};

/// Comprehensive-score weights; they sum to 100.
pub const W_PHA: f64 = 25.0;
pub const W_PROXIMITY: f64 = 30.0;
pub const W_SIZE: f64 = 25.0;
pub const W_VELOCITY: f64 = 10.0;
pub const W_PROBABILITY: f64 = 10.0;

/// Basic-score contribution of the PHA flag.
pub const HAZARDOUS_FLAG_SCORE: f64 = 30.0;

/// Basic-score size contribution: `diameter_m / 10`, capped here.
pub const SIZE_SCORE_CAP: f64 = 40.0;

/// Diameter at which the comprehensive size factor saturates, km.
const FULL_SIZE_DIAMETER_KM: f64 = 1.0;

/// Speed at which the comprehensive velocity factor saturates, km/s.
const FULL_VELOCITY_KM_S: f64 = 30.0;

/// Impact probability at which the comprehensive probability factor
/// saturates (the Torino ladder already treats 1% as serious).
const FULL_PROBABILITY: f64 = 0.01;

/// Assumed entry speed when an object has no recorded approach velocity,
/// km/s (a typical NEO impact speed).
const DEFAULT_IMPACT_VELOCITY_KM_S: f64 = 20.0;

/// Constant of the H-to-diameter relation, km.
const DIAMETER_CONSTANT_KM: f64 = 1_329.0;

/// A near-Earth object as supplied by the external element source.
///
/// Plain data; the engine never mutates it. Optional fields reflect real
/// catalogs: small bodies often lack a measured diameter or a computed
/// orbit.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Asteroid {
    /// Catalog identifier.
    pub designation: Designation,
    /// Absolute magnitude H, if measured.
    pub absolute_magnitude: Option<f64>,
    /// Measured diameter, km, if known.
    pub diameter_km: Option<Kilometer>,
    /// Catalog PHA flag.
    pub is_potentially_hazardous: bool,
    /// Relative speed at the recorded close approach, km/s.
    pub approach_velocity_km_s: Option<KmPerSecond>,
    /// Miss distance of the recorded close approach, km.
    pub miss_distance_km: Option<Kilometer>,
    /// Orbital elements, if an orbit has been computed.
    pub orbital_elements: Option<KeplerianElements>,
}

impl Asteroid {
    /// The computed orbit, or
    /// [`SpaceguardError::MissingOrbitalElements`] naming the object when
    /// the catalog has none.
    pub fn require_elements(&self) -> Result<&KeplerianElements> {
        self.orbital_elements
            .as_ref()
            .ok_or_else(|| SpaceguardError::MissingOrbitalElements(self.designation.clone()))
    }
}

/// Diameter from the absolute magnitude: `D = 1329/√albedo · 10^(−H/5)` km.
///
/// The caller is responsible for a sane albedo; [`RiskParams`] validates
/// its own.
pub fn estimated_diameter_km(absolute_magnitude: f64, albedo: f64) -> Kilometer {
    DIAMETER_CONSTANT_KM / albedo.sqrt() * 10.0_f64.powf(-absolute_magnitude / 5.0)
}

/// Proximity score of a miss distance, in `[0, 100]`.
///
/// Piecewise linear and non-increasing: 100 inside the lunar distance,
/// falling to 50 at [`MODERATE_DISTANCE_KM`], to 0 at [`SAFE_DISTANCE_KM`],
/// and 0 beyond.
pub fn proximity_score(distance_km: Kilometer) -> Result<f64> {
    if !distance_km.is_finite() || distance_km < 0.0 {
        return Err(SpaceguardError::InvalidImpactParameter(format!(
            "miss distance must be finite and non-negative, got {distance_km} km"
        )));
    }
    let score = if distance_km <= LUNAR_DISTANCE_KM {
        100.0
    } else if distance_km <= MODERATE_DISTANCE_KM {
        100.0
            - 50.0 * (distance_km - LUNAR_DISTANCE_KM) / (MODERATE_DISTANCE_KM - LUNAR_DISTANCE_KM)
    } else if distance_km <= SAFE_DISTANCE_KM {
        50.0 * (SAFE_DISTANCE_KM - distance_km) / (SAFE_DISTANCE_KM - MODERATE_DISTANCE_KM)
    } else {
        0.0
    };
    Ok(score)
}

/// Cheap heuristic risk score, in `[0, 100]`.
///
/// Three additive contributions: [`HAZARDOUS_FLAG_SCORE`] when the PHA flag
/// is set, `diameter_m / 10` capped at [`SIZE_SCORE_CAP`], and the
/// proximity score scaled to a maximum of 30. No propagation is involved,
/// which is the point: listings sort thousands of objects with this.
///
/// Arguments
/// ---------
/// * `is_hazardous`: catalog PHA flag.
/// * `diameter_m`: diameter in meters, non-negative.
/// * `miss_distance_km`: miss distance in km, non-negative.
pub fn basic_risk_score(
    is_hazardous: bool,
    diameter_m: Meter,
    miss_distance_km: Kilometer,
) -> Result<f64> {
    if !diameter_m.is_finite() || diameter_m < 0.0 {
        return Err(SpaceguardError::InvalidImpactParameter(format!(
            "diameter must be finite and non-negative, got {diameter_m} m"
        )));
    }
    let hazard_part = if is_hazardous { HAZARDOUS_FLAG_SCORE } else { 0.0 };
    let size_part = (diameter_m / 10.0).min(SIZE_SCORE_CAP);
    let proximity_part = proximity_score(miss_distance_km)? / 100.0 * 30.0;
    Ok((hazard_part + size_part + proximity_part).clamp(0.0, 100.0))
}

/// Comprehensive weighted risk score, in `[0, 100]`.
///
/// Five factors, each normalized into `[0, 1]` and scaled by its module
/// weight: the PHA flag, the proximity score, the diameter (saturating at
/// 1 km), the approach velocity (saturating at 30 km/s) and the simulated
/// impact probability (saturating at 1%). Missing factors contribute zero.
pub fn comprehensive_score(
    is_hazardous: bool,
    proximity: f64,
    diameter_km: Option<Kilometer>,
    velocity_km_s: Option<KmPerSecond>,
    impact_probability: f64,
) -> f64 {
    let pha_part = if is_hazardous { W_PHA } else { 0.0 };
    let proximity_part = (proximity / 100.0).clamp(0.0, 1.0) * W_PROXIMITY;
    let size_part =
        diameter_km.map_or(0.0, |d| (d / FULL_SIZE_DIAMETER_KM).clamp(0.0, 1.0) * W_SIZE);
    let velocity_part =
        velocity_km_s.map_or(0.0, |v| (v / FULL_VELOCITY_KM_S).clamp(0.0, 1.0) * W_VELOCITY);
    let probability_part = (impact_probability / FULL_PROBABILITY).clamp(0.0, 1.0) * W_PROBABILITY;

    (pha_part + proximity_part + size_part + velocity_part + probability_part).clamp(0.0, 100.0)
}

/// Qualitative verdict, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum RiskLabel {
    Minimal,
    Low,
    Moderate,
    Elevated,
    High,
    Severe,
    Critical,
}

impl RiskLabel {
    /// Derive the label, primarily from the Torino level; a level of 0
    /// falls back to score bands (70 / 50 / 25).
    pub fn from_torino_and_score(torino_level: u8, score: f64) -> Self {
        match torino_level {
            0 => {
                if score >= 70.0 {
                    RiskLabel::Elevated
                } else if score >= 50.0 {
                    RiskLabel::Moderate
                } else if score >= 25.0 {
                    RiskLabel::Low
                } else {
                    RiskLabel::Minimal
                }
            }
            1 => RiskLabel::Moderate,
            2 => RiskLabel::Elevated,
            3 | 4 => RiskLabel::High,
            5..=7 => RiskLabel::Severe,
            _ => RiskLabel::Critical,
        }
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLabel::Minimal => "MINIMAL",
            RiskLabel::Low => "LOW",
            RiskLabel::Moderate => "MODERATE",
            RiskLabel::Elevated => "ELEVATED",
            RiskLabel::High => "HIGH",
            RiskLabel::Severe => "SEVERE",
            RiskLabel::Critical => "CRITICAL",
        };
        write!(f, "{label}")
    }
}

/// Tuning for [`assess_risk`] and [`batch_assess_risk`].
///
/// [`RiskParams::default`] is ready to use; the builder validates overrides.
#[derive(Debug, Clone)]
pub struct RiskParams {
    /// Monte Carlo samples per object when a simulation runs.
    pub num_simulations: usize,
    /// Per-element standard deviations for the simulation.
    pub uncertainties: ElementUncertainties,
    /// Kepler solver tolerances.
    pub propagation: PropagationParams,
    /// Geometric albedo assumed when estimating a diameter from H.
    pub albedo: f64,
    /// Bulk density for the energy estimate, kg/m³; `None` for the stony
    /// default.
    pub density: Option<f64>,
}

impl Default for RiskParams {
    fn default() -> Self {
        Self {
            num_simulations: DEFAULT_SIMULATIONS,
            uncertainties: ElementUncertainties::default(),
            propagation: PropagationParams::default(),
            albedo: DEFAULT_ALBEDO,
            density: None,
        }
    }
}

impl RiskParams {
    /// Create a builder initialized with default values.
    pub fn builder() -> RiskParamsBuilder {
        RiskParamsBuilder::new()
    }
}

/// Builder for [`RiskParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct RiskParamsBuilder {
    params: RiskParams,
}

impl RiskParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: RiskParams::default(),
        }
    }

    pub fn num_simulations(mut self, n: usize) -> Self {
        self.params.num_simulations = n;
        self
    }

    pub fn uncertainties(mut self, uncertainties: ElementUncertainties) -> Self {
        self.params.uncertainties = uncertainties;
        self
    }

    pub fn propagation(mut self, propagation: PropagationParams) -> Self {
        self.params.propagation = propagation;
        self
    }

    pub fn albedo(mut self, albedo: f64) -> Self {
        self.params.albedo = albedo;
        self
    }

    pub fn density(mut self, density: f64) -> Self {
        self.params.density = Some(density);
        self
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `num_simulations` in `[1, MAX_SIMULATIONS]`,
    /// * `albedo` finite, in `(0, 1]`,
    /// * `density` (when set) finite and positive.
    pub fn build(self) -> Result<RiskParams> {
        let p = &self.params;
        if p.num_simulations == 0 || p.num_simulations > MAX_SIMULATIONS {
            return Err(SpaceguardError::InvalidSimulationParameter(format!(
                "num_simulations must be in [1, {MAX_SIMULATIONS}], got {}",
                p.num_simulations
            )));
        }
        if !p.albedo.is_finite() || p.albedo <= 0.0 || p.albedo > 1.0 {
            return Err(SpaceguardError::InvalidImpactParameter(format!(
                "albedo must be in (0, 1], got {}",
                p.albedo
            )));
        }
        if let Some(density) = p.density {
            if !density.is_finite() || density <= 0.0 {
                return Err(SpaceguardError::InvalidImpactParameter(format!(
                    "density must be finite and positive, got {density} kg/m^3"
                )));
            }
        }
        Ok(self.params)
    }
}

/// Everything the engine can say about one object.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskAssessment {
    /// Catalog identifier of the assessed object.
    pub designation: Designation,
    /// Diameter used for the size-dependent parts, km; measured when the
    /// catalog has one, otherwise estimated from H, otherwise absent.
    pub estimated_diameter_km: Option<Kilometer>,
    /// Cheap heuristic score, `[0, 100]`.
    pub basic_score: f64,
    /// Weighted five-factor score; `None` when the item degraded to a
    /// basic-only assessment.
    pub comprehensive_score: Option<f64>,
    /// Torino classification; `None` on a degraded item.
    pub torino: Option<TorinoLevel>,
    /// Monte Carlo summary; present only when elements and an encounter
    /// date were available.
    pub simulation: Option<SimulationResult>,
    /// Impact energy estimate; absent when no diameter could be derived.
    pub energy: Option<ImpactEnergy>,
    /// Final qualitative label.
    pub label: RiskLabel,
}

impl fmt::Display for RiskAssessment {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Risk assessment for {}", self.designation)?;
            writeln!(f, "--------------------------------")?;
            writeln!(f, "label          : {}", self.label)?;
            writeln!(f, "basic score    : {:.1}", self.basic_score)?;
            match self.comprehensive_score {
                Some(score) => writeln!(f, "comprehensive  : {score:.1}")?,
                None => writeln!(f, "comprehensive  : n/a (degraded)")?,
            }
            match &self.torino {
                Some(level) => writeln!(f, "torino         : {level}")?,
                None => writeln!(f, "torino         : n/a")?,
            }
            match self.estimated_diameter_km {
                Some(d) => writeln!(f, "diameter       : {d:.3} km")?,
                None => writeln!(f, "diameter       : unknown")?,
            }
            match &self.energy {
                Some(e) => writeln!(
                    f,
                    "energy         : {:.3e} MT ({})",
                    e.energy_megatons, e.severity
                )?,
                None => writeln!(f, "energy         : n/a")?,
            }
            match &self.simulation {
                Some(s) => write!(f, "simulation     : {s}"),
                None => write!(f, "simulation     : none"),
            }
        } else {
            write!(
                f,
                "{}: label={}, basic={:.1}, comprehensive={}",
                self.designation,
                self.label,
                self.basic_score,
                self.comprehensive_score
                    .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}"))
            )
        }
    }
}

/// Resolve the diameter to use: measured, else estimated from H.
fn resolve_diameter(asteroid: &Asteroid, albedo: f64) -> Result<Option<Kilometer>> {
    match asteroid.diameter_km {
        Some(d) if !d.is_finite() || d < 0.0 => Err(SpaceguardError::InvalidImpactParameter(
            format!("diameter must be finite and non-negative, got {d} km"),
        )),
        Some(d) => Ok(Some(d)),
        None => Ok(asteroid
            .absolute_magnitude
            .filter(|h| h.is_finite())
            .map(|h| estimated_diameter_km(h, albedo))),
    }
}

/// Full assessment of one object.
///
/// Pipeline: resolve the diameter (measured or H-derived) → basic score →
/// Monte Carlo simulation when both elements and an encounter date are
/// present → energy estimate (assuming a 20 km/s entry when the approach
/// velocity is unknown) → Torino classification → comprehensive score →
/// final label. The label follows the Torino level, falling back to the
/// comprehensive score at level 0.
///
/// Arguments
/// ---------
/// * `asteroid`: the object under assessment.
/// * `encounter_date`: epoch for the Monte Carlo run; `None` skips the
///   simulation.
/// * `params`: tuning from [`RiskParams::builder`].
/// * `rng`: caller-owned random number generator.
///
/// Return
/// ------
/// * The full [`RiskAssessment`], or the first validation error.
///
/// See also
/// --------
/// * [`batch_assess_risk`] – Per-item isolation and sorting.
pub fn assess_risk(
    asteroid: &Asteroid,
    encounter_date: Option<JulianDate>,
    params: &RiskParams,
    rng: &mut impl Rng,
) -> Result<RiskAssessment> {
    let diameter_km = resolve_diameter(asteroid, params.albedo)?;
    let diameter_m = diameter_km.map_or(0.0, |d| d * 1_000.0);
    let miss_km = asteroid.miss_distance_km.unwrap_or(SAFE_DISTANCE_KM);

    let basic_score = basic_risk_score(asteroid.is_potentially_hazardous, diameter_m, miss_km)?;
    let proximity = proximity_score(miss_km)?;

    let simulation = match encounter_date {
        Some(date) => match asteroid.require_elements() {
            Ok(elements) => {
                let sim_params = SimulationParams::builder()
                    .elements(elements.clone())
                    .encounter_date(date)
                    .num_simulations(params.num_simulations)
                    .uncertainties(params.uncertainties)
                    .propagation(params.propagation)
                    .build()?;
                Some(run_simulation(&sim_params, rng)?)
            }
            // An orbitless object is still assessable; the simulation is
            // simply skipped.
            Err(error) => {
                tracing::debug!(%error, "skipping the Monte Carlo step");
                None
            }
        },
        None => None,
    };
    let impact_probability = simulation.as_ref().map_or(0.0, |s| s.impact_probability);

    let velocity = asteroid
        .approach_velocity_km_s
        .unwrap_or(DEFAULT_IMPACT_VELOCITY_KM_S);
    let energy = diameter_km
        .map(|d| estimate_impact_energy(d, velocity, params.density))
        .transpose()?;

    let torino = torino_scale(
        impact_probability,
        energy.as_ref().map_or(0.0, |e| e.energy_megatons),
    )?;

    let score = comprehensive_score(
        asteroid.is_potentially_hazardous,
        proximity,
        diameter_km,
        asteroid.approach_velocity_km_s,
        impact_probability,
    );

    Ok(RiskAssessment {
        designation: asteroid.designation.clone(),
        estimated_diameter_km: diameter_km,
        basic_score,
        comprehensive_score: Some(score),
        torino: Some(torino),
        simulation,
        energy,
        label: RiskLabel::from_torino_and_score(torino.value(), score),
    })
}

/// Best-effort assessment when the full pipeline failed: sanitize the
/// inputs, keep only the basic score.
fn basic_only_assessment(asteroid: &Asteroid, albedo: f64) -> RiskAssessment {
    let diameter_km = asteroid
        .diameter_km
        .filter(|d| d.is_finite() && *d >= 0.0)
        .or_else(|| {
            asteroid
                .absolute_magnitude
                .filter(|h| h.is_finite())
                .map(|h| estimated_diameter_km(h, albedo))
        });
    let miss_km = asteroid
        .miss_distance_km
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(SAFE_DISTANCE_KM);
    let diameter_m = diameter_km.map_or(0.0, |d| d * 1_000.0);
    let basic_score = basic_risk_score(asteroid.is_potentially_hazardous, diameter_m, miss_km)
        .unwrap_or(0.0);

    RiskAssessment {
        designation: asteroid.designation.clone(),
        estimated_diameter_km: diameter_km,
        basic_score,
        comprehensive_score: None,
        torino: None,
        simulation: None,
        energy: None,
        label: RiskLabel::from_torino_and_score(0, basic_score),
    }
}

/// Assess a list of objects with per-item failure isolation.
///
/// A failing item degrades to a basic-score-only assessment (with a
/// [`tracing`] warning carrying the original error) instead of aborting
/// the batch. Results come back sorted by descending comprehensive score,
/// degraded items ranked by their basic score.
///
/// Arguments
/// ---------
/// * `asteroids`: at most [`MAX_BATCH_SIZE`] objects.
/// * `encounter_date`: shared encounter epoch for the simulations.
/// * `params`: shared tuning.
/// * `rng`: caller-owned random number generator.
pub fn batch_assess_risk(
    asteroids: &[Asteroid],
    encounter_date: Option<JulianDate>,
    params: &RiskParams,
    rng: &mut impl Rng,
) -> Result<Vec<RiskAssessment>> {
    if asteroids.len() > MAX_BATCH_SIZE {
        return Err(SpaceguardError::BatchTooLarge(
            asteroids.len(),
            MAX_BATCH_SIZE,
        ));
    }

    let ranking = |a: &RiskAssessment| a.comprehensive_score.unwrap_or(a.basic_score);
    let assessments = asteroids
        .iter()
        .map(|asteroid| match assess_risk(asteroid, encounter_date, params, rng) {
            Ok(assessment) => assessment,
            Err(error) => {
                tracing::warn!(
                    designation = %asteroid.designation,
                    %error,
                    "assessment failed, degrading to basic score"
                );
                basic_only_assessment(asteroid, params.albedo)
            }
        })
        .sorted_by(|a, b| {
            ranking(b)
                .partial_cmp(&ranking(a))
                .unwrap_or(Ordering::Equal)
        })
        .collect();
    Ok(assessments)
}
