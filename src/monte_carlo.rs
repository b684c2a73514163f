//! # Monte Carlo impact-probability simulation
//!
//! Estimate the probability of an Earth encounter by repeatedly perturbing a
//! body's orbital elements with Gaussian noise and re-evaluating the miss
//! distance at the encounter epoch.
//!
//! ## Overview
//! -----------------
//! * [`sample_orbital_elements`] – one Gaussian draw per element, with the
//!   documented eccentricity clamp into `[0, 0.999]`,
//! * [`run_simulation`] – fixed-epoch simulation aggregating hazard counters,
//!   distance statistics and an optional Palermo value,
//! * [`run_simulation_with_cancel`] – same loop with a cooperative
//!   cancellation check polled on wall-clock intervals,
//! * [`run_extended_simulation`] – scans a window of candidate encounter
//!   dates and keeps the worst one.
//!
//! Every sample is classified against **three independent thresholds**
//! (Earth capture radius, "very close", lunar distance); a single sample can
//! increment all three counters, so the buckets are not nested subsets.
//!
//! Earth is evaluated with the cheap circular model
//! ([`crate::earth::earth_position_circular`]), not the full ephemeris used
//! by the trajectory path; the [`crate::earth`] module documents the split.
//!
//! ## Reproducibility
//! -----------------
//! The caller owns the random number generator, so two runs with the same
//! seeded [`StdRng`](rand::rngs::StdRng) produce identical results. No
//! hidden randomness source participates.
//!
//! ## Execution Modes
//! -----------------
//! ### Progress UI (feature: `progress`)
//! With the `progress` feature, [`run_extended_simulation`] renders a live
//! per-date progress bar (via `indicatif`).
//!
//! ### Cooperative cancellation
//! [`run_simulation_with_cancel`] calls a user closure `should_cancel()` on
//! **wall-clock intervals** (not iteration counts). A cancelled run returns
//! the statistics of the samples completed so far, recognizable by
//! `num_samples` falling short of the request.
//!
//! ## Example
//! -----------------
//! ```rust
//! use rand::SeedableRng;
//! use spaceguard::keplerian_element::KeplerianElements;
//! use spaceguard::monte_carlo::{run_simulation, SimulationParams};
//!
//! # fn main() -> Result<(), spaceguard::spaceguard_errors::SpaceguardError> {
//! let elements = KeplerianElements::new(1.2, 0.3, 5.0, 50.0, 80.0, 10.0, 2451545.0)?;
//! let params = SimulationParams::builder()
//!     .elements(elements)
//!     .encounter_date(2451910.25)
//!     .num_simulations(500)
//!     .build()?;
//!
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let result = run_simulation(&params, &mut rng)?;
//! println!("{:#}", result);
//! # Ok(())
//! # }
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::trajectory::find_closest_approach`] – Deterministic geometry
//!   over a range, no uncertainty model.
//! * [`crate::risk`] – Folds a simulation into a composite assessment.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use rand_distr::StandardNormal;

use crate::constants::{
    Degree, JulianDate, Kilometer, AU, DEFAULT_SIMULATIONS, EARTH_CAPTURE_RADIUS_KM,
    LUNAR_DISTANCE_KM, MAX_SIMULATIONS, VERY_CLOSE_DISTANCE_KM,
};
use crate::earth::earth_position_circular;
use crate::kepler::PropagationParams;
use crate::keplerian_element::KeplerianElements;
use crate::spaceguard_errors::{Result, SpaceguardError};

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};

/// Sampled eccentricities are clamped below this bound to keep every draw
/// on a closed orbit.
pub const MAX_SAMPLED_ECCENTRICITY: f64 = 0.999;

/// Annual background impact frequency used by the Palermo scale, per year.
const BACKGROUND_IMPACT_RATE: f64 = 1.0e-8;

/// Days in a Julian year.
const DAYS_PER_JULIAN_YEAR: f64 = 365.25;

/// Minimal wall-clock interval between two cancellation polls.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Upper bound on the extended-search half window, days.
const MAX_WINDOW_DAYS: u32 = 30;

/// One standard deviation per orbital element, in the element's own unit.
///
/// The defaults are deliberately small (a well-observed object); callers
/// with real covariance data should override every field.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ElementUncertainties {
    /// σ of the semi-major axis, AU.
    pub semi_major_axis: f64,
    /// σ of the eccentricity.
    pub eccentricity: f64,
    /// σ of the inclination, degrees.
    pub inclination: Degree,
    /// σ of the ascending node longitude, degrees.
    pub ascending_node_longitude: Degree,
    /// σ of the argument of periapsis, degrees.
    pub periapsis_argument: Degree,
    /// σ of the mean anomaly, degrees.
    pub mean_anomaly: Degree,
}

impl Default for ElementUncertainties {
    fn default() -> Self {
        Self {
            semi_major_axis: 1.0e-5,
            eccentricity: 1.0e-5,
            inclination: 1.0e-3,
            ascending_node_longitude: 1.0e-3,
            periapsis_argument: 1.0e-3,
            mean_anomaly: 5.0e-3,
        }
    }
}

impl ElementUncertainties {
    fn validate(&self) -> Result<()> {
        let sigmas = [
            self.semi_major_axis,
            self.eccentricity,
            self.inclination,
            self.ascending_node_longitude,
            self.periapsis_argument,
            self.mean_anomaly,
        ];
        if sigmas.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(SpaceguardError::InvalidSimulationParameter(
                "element uncertainties must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}

/// Draw one perturbed element set.
///
/// Each element receives an independent Gaussian perturbation with its own
/// standard deviation; the eccentricity is then clamped into
/// `[0, `[`MAX_SAMPLED_ECCENTRICITY`]`]`. This clamp is the only silent
/// correction in the whole engine.
pub fn sample_orbital_elements(
    elements: &KeplerianElements,
    uncertainties: &ElementUncertainties,
    rng: &mut impl Rng,
) -> KeplerianElements {
    let mut noisy = |value: f64, sigma: f64| -> f64 {
        let draw: f64 = rng.sample(StandardNormal);
        value + sigma * draw
    };

    KeplerianElements {
        reference_epoch: elements.reference_epoch,
        semi_major_axis: noisy(elements.semi_major_axis, uncertainties.semi_major_axis),
        eccentricity: noisy(elements.eccentricity, uncertainties.eccentricity)
            .clamp(0.0, MAX_SAMPLED_ECCENTRICITY),
        inclination: noisy(elements.inclination, uncertainties.inclination),
        ascending_node_longitude: noisy(
            elements.ascending_node_longitude,
            uncertainties.ascending_node_longitude,
        ),
        periapsis_argument: noisy(elements.periapsis_argument, uncertainties.periapsis_argument),
        mean_anomaly: noisy(elements.mean_anomaly, uncertainties.mean_anomaly),
    }
}

/// Configuration for a fixed-epoch simulation.
///
/// Build through [`SimulationParams::builder`]; `build()` rejects missing
/// elements, out-of-range sample counts and invalid uncertainties, so a
/// constructed value is always runnable.
#[derive(Debug, Clone)]
pub struct SimulationParams {
    /// Nominal orbital elements of the body.
    pub elements: KeplerianElements,
    /// Epoch of the encounter under study.
    pub encounter_date: JulianDate,
    /// Number of Monte Carlo draws.
    pub num_simulations: usize,
    /// Per-element standard deviations.
    pub uncertainties: ElementUncertainties,
    /// Kepler solver tolerances.
    pub propagation: PropagationParams,
}

impl SimulationParams {
    /// Start building a parameter set.
    pub fn builder() -> SimulationParamsBuilder {
        SimulationParamsBuilder::default()
    }
}

/// Fluent builder for [`SimulationParams`].
#[derive(Debug, Clone, Default)]
pub struct SimulationParamsBuilder {
    elements: Option<KeplerianElements>,
    encounter_date: Option<JulianDate>,
    num_simulations: Option<usize>,
    uncertainties: Option<ElementUncertainties>,
    propagation: Option<PropagationParams>,
}

impl SimulationParamsBuilder {
    /// Nominal orbital elements (required).
    pub fn elements(mut self, elements: KeplerianElements) -> Self {
        self.elements = Some(elements);
        self
    }

    /// Encounter epoch, Julian Date (required).
    pub fn encounter_date(mut self, jd: JulianDate) -> Self {
        self.encounter_date = Some(jd);
        self
    }

    /// Number of draws (default [`DEFAULT_SIMULATIONS`], capped at
    /// [`MAX_SIMULATIONS`]).
    pub fn num_simulations(mut self, n: usize) -> Self {
        self.num_simulations = Some(n);
        self
    }

    /// Per-element standard deviations (default
    /// [`ElementUncertainties::default`]).
    pub fn uncertainties(mut self, uncertainties: ElementUncertainties) -> Self {
        self.uncertainties = Some(uncertainties);
        self
    }

    /// Kepler solver tolerances (default [`PropagationParams::default`]).
    pub fn propagation(mut self, params: PropagationParams) -> Self {
        self.propagation = Some(params);
        self
    }

    /// Validate and assemble the parameter set.
    pub fn build(self) -> Result<SimulationParams> {
        let elements = self.elements.ok_or_else(|| {
            SpaceguardError::InvalidSimulationParameter("orbital elements are required".into())
        })?;
        elements.validate()?;

        let encounter_date = self.encounter_date.ok_or_else(|| {
            SpaceguardError::InvalidSimulationParameter("an encounter date is required".into())
        })?;
        if !encounter_date.is_finite() {
            return Err(SpaceguardError::InvalidSimulationParameter(
                "the encounter date must be finite".into(),
            ));
        }

        let num_simulations = self.num_simulations.unwrap_or(DEFAULT_SIMULATIONS);
        if num_simulations == 0 || num_simulations > MAX_SIMULATIONS {
            return Err(SpaceguardError::InvalidSimulationParameter(format!(
                "num_simulations must be in [1, {MAX_SIMULATIONS}], got {num_simulations}"
            )));
        }

        let uncertainties = self.uncertainties.unwrap_or_default();
        uncertainties.validate()?;

        Ok(SimulationParams {
            elements,
            encounter_date,
            num_simulations,
            uncertainties,
            propagation: self.propagation.unwrap_or_default(),
        })
    }
}

/// Distribution statistics over the sampled miss distances, km.
///
/// Percentiles use the *nearest-rank* method: the index is
/// `round(q × (N-1))` for quantile `q ∈ [0,1]`, clamped to the valid range,
/// which stays stable for small sample counts.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DistanceStats {
    pub min: Kilometer,
    pub max: Kilometer,
    pub mean: Kilometer,
    pub median: Kilometer,
    pub std_dev: Kilometer,
    pub p5: Kilometer,
    pub p95: Kilometer,
}

impl DistanceStats {
    /// Build from raw samples; `None` when no sample completed.
    fn from_samples(mut samples: Vec<f64>) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        samples.sort_unstable_by(f64::total_cmp);

        #[inline]
        fn q_index(n: usize, q: f64) -> usize {
            let pos = q * (n as f64 - 1.0);
            let idx = pos.round() as isize;
            idx.clamp(0, (n as isize) - 1) as usize
        }

        let n = samples.len();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = samples.iter().map(|d| (d - mean) * (d - mean)).sum::<f64>() / n as f64;

        Some(Self {
            min: samples[0],
            max: samples[n - 1],
            mean,
            median: samples[q_index(n, 0.50)],
            std_dev: variance.sqrt(),
            p5: samples[q_index(n, 0.05)],
            p95: samples[q_index(n, 0.95)],
        })
    }
}

impl fmt::Display for DistanceStats {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "min    : {:.1} km", self.min)?;
            writeln!(f, "p5     : {:.1} km", self.p5)?;
            writeln!(f, "median : {:.1} km", self.median)?;
            writeln!(f, "mean   : {:.1} km", self.mean)?;
            writeln!(f, "p95    : {:.1} km", self.p95)?;
            writeln!(f, "max    : {:.1} km", self.max)?;
            write!(f, "stddev : {:.1} km", self.std_dev)
        } else {
            write!(
                f,
                "min={:.1} km, median={:.1} km, max={:.1} km",
                self.min, self.median, self.max
            )
        }
    }
}

/// Aggregated outcome of one simulation run.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationResult {
    /// Encounter epoch the samples were evaluated at.
    pub encounter_date: JulianDate,
    /// Samples actually completed (short of the request when cancelled).
    pub num_samples: usize,
    /// Samples inside the Earth capture radius.
    pub impact_count: usize,
    /// Samples inside the lunar distance.
    pub close_approach_count: usize,
    /// Samples inside the "very close" threshold.
    pub very_close_count: usize,
    /// `impact_count / num_samples`.
    pub impact_probability: f64,
    /// `close_approach_count / num_samples`.
    pub close_approach_probability: f64,
    /// `very_close_count / num_samples`.
    pub very_close_probability: f64,
    /// Miss-distance statistics; `None` only when a cancellation stopped
    /// the run before the first sample.
    pub distance_stats: Option<DistanceStats>,
    /// Palermo scale of the estimated probability; `None` when no sampled
    /// impact occurred or the encounter does not lie after the element
    /// epoch.
    pub palermo_scale: Option<f64>,
    /// Wall-clock cost of the run.
    pub elapsed: Duration,
}

impl fmt::Display for SimulationResult {
    /// Compact by default; pretty multi-line when using the alternate flag (`{:#}`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Monte Carlo encounter summary")?;
            writeln!(f, "-----------------------------")?;
            writeln!(f, "encounter JD   : {:.4}", self.encounter_date)?;
            writeln!(f, "samples        : {}", self.num_samples)?;
            writeln!(
                f,
                "impacts        : {} (p = {:.3e})",
                self.impact_count, self.impact_probability
            )?;
            writeln!(
                f,
                "very close     : {} (p = {:.3e})",
                self.very_close_count, self.very_close_probability
            )?;
            writeln!(
                f,
                "within Moon    : {} (p = {:.3e})",
                self.close_approach_count, self.close_approach_probability
            )?;
            match &self.distance_stats {
                Some(stats) => writeln!(f, "{stats:#}")?,
                None => writeln!(f, "no completed samples")?,
            }
            match self.palermo_scale {
                Some(ps) => write!(f, "palermo        : {ps:.2}"),
                None => write!(f, "palermo        : n/a"),
            }
        } else {
            write!(
                f,
                "samples={}, impacts={} (p={:.3e}), very_close={}, within_moon={}",
                self.num_samples,
                self.impact_count,
                self.impact_probability,
                self.very_close_count,
                self.close_approach_count
            )
        }
    }
}

/// Palermo scale for an impact probability over a lead time.
///
/// `PS = log10(p / (fB · Δt))` with a background impact frequency
/// `fB = 1e-8` per year. Returns `None` when the probability is zero or the
/// lead time is not positive, rather than a sentinel value.
pub fn palermo_scale(impact_probability: f64, years_until_encounter: f64) -> Option<f64> {
    if impact_probability <= 0.0 || years_until_encounter <= 0.0 {
        return None;
    }
    Some((impact_probability / (BACKGROUND_IMPACT_RATE * years_until_encounter)).log10())
}

/// Run a fixed-epoch Monte Carlo simulation.
///
/// For each draw, [`sample_orbital_elements`] perturbs the nominal elements,
/// the sampled orbit is propagated to the encounter epoch, and the distance
/// to the circular-model Earth is classified against the three hazard
/// thresholds.
///
/// Arguments
/// ---------
/// * `params`: validated configuration from [`SimulationParams::builder`].
/// * `rng`: caller-owned random number generator (seed it for
///   reproducibility).
///
/// Return
/// ------
/// * The aggregated [`SimulationResult`].
///
/// See also
/// --------
/// * [`run_simulation_with_cancel`] – Same loop, cooperatively cancellable.
/// * [`run_extended_simulation`] – Scans a window of encounter dates.
pub fn run_simulation(params: &SimulationParams, rng: &mut impl Rng) -> Result<SimulationResult> {
    run_simulation_with_cancel(params, rng, || false)
}

/// [`run_simulation`] with a cooperative cancellation check.
///
/// The loop polls `should_cancel()` on wall-clock intervals (roughly every
/// 10 ms) so the cancellation latency stays stable regardless of per-sample
/// cost. A cancelled run returns the statistics of the samples completed so
/// far; `num_samples` then falls short of `params.num_simulations`.
pub fn run_simulation_with_cancel<F>(
    params: &SimulationParams,
    rng: &mut impl Rng,
    mut should_cancel: F,
) -> Result<SimulationResult>
where
    F: FnMut() -> bool,
{
    let started = Instant::now();
    let earth = earth_position_circular(params.encounter_date);

    let mut distances_km = Vec::with_capacity(params.num_simulations);
    let mut impact_count = 0_usize;
    let mut close_approach_count = 0_usize;
    let mut very_close_count = 0_usize;

    let mut last_poll = Instant::now();
    for _ in 0..params.num_simulations {
        if last_poll.elapsed() >= CANCEL_POLL_INTERVAL {
            if should_cancel() {
                tracing::warn!(
                    completed = distances_km.len(),
                    requested = params.num_simulations,
                    "simulation cancelled, returning partial result"
                );
                break;
            }
            last_poll = Instant::now();
        }

        let sampled = sample_orbital_elements(&params.elements, &params.uncertainties, rng);
        let position = sampled.position_at(params.encounter_date, &params.propagation)?;
        let distance_km = (position - earth).norm() * AU;

        if distance_km < EARTH_CAPTURE_RADIUS_KM {
            impact_count += 1;
        }
        if distance_km < LUNAR_DISTANCE_KM {
            close_approach_count += 1;
        }
        if distance_km < VERY_CLOSE_DISTANCE_KM {
            very_close_count += 1;
        }
        distances_km.push(distance_km);
    }

    let num_samples = distances_km.len();
    let ratio = |count: usize| {
        if num_samples == 0 {
            0.0
        } else {
            count as f64 / num_samples as f64
        }
    };
    let impact_probability = ratio(impact_count);
    let years = (params.encounter_date - params.elements.reference_epoch) / DAYS_PER_JULIAN_YEAR;

    Ok(SimulationResult {
        encounter_date: params.encounter_date,
        num_samples,
        impact_count,
        close_approach_count,
        very_close_count,
        impact_probability,
        close_approach_probability: ratio(close_approach_count),
        very_close_probability: ratio(very_close_count),
        distance_stats: DistanceStats::from_samples(distances_km),
        palermo_scale: palermo_scale(impact_probability, years),
        elapsed: started.elapsed(),
    })
}

/// Configuration for the windowed encounter search.
///
/// Build through [`ExtendedSimulationParams::builder`].
#[derive(Debug, Clone)]
pub struct ExtendedSimulationParams {
    /// Nominal orbital elements of the body.
    pub elements: KeplerianElements,
    /// Center of the scanned window.
    pub center_date: JulianDate,
    /// Half-width of the window, days; dates `center ± window` inclusive.
    pub window_days: u32,
    /// Total sample budget the per-date runs are derived from.
    pub num_simulations: usize,
    /// Per-element standard deviations.
    pub uncertainties: ElementUncertainties,
    /// Kepler solver tolerances.
    pub propagation: PropagationParams,
}

impl ExtendedSimulationParams {
    /// Start building a parameter set.
    pub fn builder() -> ExtendedSimulationParamsBuilder {
        ExtendedSimulationParamsBuilder::default()
    }

    /// Samples per candidate date: a fifth of the budget, at least 100,
    /// never more than the budget itself.
    pub fn samples_per_date(&self) -> usize {
        std::cmp::min(self.num_simulations, (self.num_simulations / 5).max(100))
    }
}

/// Fluent builder for [`ExtendedSimulationParams`].
#[derive(Debug, Clone, Default)]
pub struct ExtendedSimulationParamsBuilder {
    elements: Option<KeplerianElements>,
    center_date: Option<JulianDate>,
    window_days: Option<u32>,
    num_simulations: Option<usize>,
    uncertainties: Option<ElementUncertainties>,
    propagation: Option<PropagationParams>,
}

impl ExtendedSimulationParamsBuilder {
    /// Nominal orbital elements (required).
    pub fn elements(mut self, elements: KeplerianElements) -> Self {
        self.elements = Some(elements);
        self
    }

    /// Center of the scanned window, Julian Date (required).
    pub fn center_date(mut self, jd: JulianDate) -> Self {
        self.center_date = Some(jd);
        self
    }

    /// Half-width of the window in days (default 7, capped at 30).
    pub fn window_days(mut self, days: u32) -> Self {
        self.window_days = Some(days);
        self
    }

    /// Total sample budget (default [`DEFAULT_SIMULATIONS`], capped at
    /// [`MAX_SIMULATIONS`]).
    pub fn num_simulations(mut self, n: usize) -> Self {
        self.num_simulations = Some(n);
        self
    }

    /// Per-element standard deviations (default
    /// [`ElementUncertainties::default`]).
    pub fn uncertainties(mut self, uncertainties: ElementUncertainties) -> Self {
        self.uncertainties = Some(uncertainties);
        self
    }

    /// Kepler solver tolerances (default [`PropagationParams::default`]).
    pub fn propagation(mut self, params: PropagationParams) -> Self {
        self.propagation = Some(params);
        self
    }

    /// Validate and assemble the parameter set.
    pub fn build(self) -> Result<ExtendedSimulationParams> {
        let elements = self.elements.ok_or_else(|| {
            SpaceguardError::InvalidSimulationParameter("orbital elements are required".into())
        })?;
        elements.validate()?;

        let center_date = self.center_date.ok_or_else(|| {
            SpaceguardError::InvalidSimulationParameter("a center date is required".into())
        })?;
        if !center_date.is_finite() {
            return Err(SpaceguardError::InvalidSimulationParameter(
                "the center date must be finite".into(),
            ));
        }

        let window_days = self.window_days.unwrap_or(7);
        if window_days > MAX_WINDOW_DAYS {
            return Err(SpaceguardError::InvalidSimulationParameter(format!(
                "window_days must be at most {MAX_WINDOW_DAYS}, got {window_days}"
            )));
        }

        let num_simulations = self.num_simulations.unwrap_or(DEFAULT_SIMULATIONS);
        if num_simulations == 0 || num_simulations > MAX_SIMULATIONS {
            return Err(SpaceguardError::InvalidSimulationParameter(format!(
                "num_simulations must be in [1, {MAX_SIMULATIONS}], got {num_simulations}"
            )));
        }

        let uncertainties = self.uncertainties.unwrap_or_default();
        uncertainties.validate()?;

        Ok(ExtendedSimulationParams {
            elements,
            center_date,
            window_days,
            num_simulations,
            uncertainties,
            propagation: self.propagation.unwrap_or_default(),
        })
    }
}

/// `true` when `candidate` describes a worse (more hazardous) encounter.
fn worse_encounter(candidate: &SimulationResult, best: &SimulationResult) -> bool {
    if candidate.impact_probability != best.impact_probability {
        return candidate.impact_probability > best.impact_probability;
    }
    let min_of = |r: &SimulationResult| r.distance_stats.map_or(f64::MAX, |s| s.min);
    min_of(candidate) < min_of(best)
}

fn extended_date_params(
    params: &ExtendedSimulationParams,
    offset: i64,
) -> Result<SimulationParams> {
    SimulationParams::builder()
        .elements(params.elements.clone())
        .encounter_date(params.center_date + offset as f64)
        .num_simulations(params.samples_per_date())
        .uncertainties(params.uncertainties)
        .propagation(params.propagation)
        .build()
}

/// Scan candidate encounter dates in `center ± window_days` and keep the
/// worst one.
///
/// Each candidate date gets a reduced run of
/// [`samples_per_date`](ExtendedSimulationParams::samples_per_date) draws;
/// the retained result is the one with the highest impact probability,
/// ties broken by the smaller minimum distance. This approximates a
/// continuous-time search over the encounter window without an optimizer.
///
/// Return
/// ------
/// * The winning [`SimulationResult`]; its `encounter_date` identifies the
///   retained date.
#[cfg(not(feature = "progress"))]
pub fn run_extended_simulation(
    params: &ExtendedSimulationParams,
    rng: &mut impl Rng,
) -> Result<SimulationResult> {
    let window = params.window_days as i64;
    let mut best: Option<SimulationResult> = None;

    for offset in -window..=window {
        let date_params = extended_date_params(params, offset)?;
        let candidate = run_simulation(&date_params, rng)?;
        if best.as_ref().map_or(true, |b| worse_encounter(&candidate, b)) {
            best = Some(candidate);
        }
    }

    // The window always contains at least the center date.
    best.ok_or_else(|| {
        SpaceguardError::InvalidSimulationParameter("empty encounter window".into())
    })
}

/// Scan candidate encounter dates in `center ± window_days` and keep the
/// worst one, with a live per-date progress bar.
#[cfg(feature = "progress")]
pub fn run_extended_simulation(
    params: &ExtendedSimulationParams,
    rng: &mut impl Rng,
) -> Result<SimulationResult> {
    let window = params.window_days as i64;
    let total = (2 * window + 1) as u64;

    let pb = ProgressBar::new(total.max(1));
    pb.set_style(
        ProgressStyle::with_template(
            "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise}",
        )
        .expect("indicatif template"),
    );
    pb.enable_steady_tick(Duration::from_millis(200));

    let mut best: Option<SimulationResult> = None;
    for offset in -window..=window {
        let date_params = extended_date_params(params, offset)?;
        let candidate = run_simulation(&date_params, rng)?;
        if best.as_ref().map_or(true, |b| worse_encounter(&candidate, b)) {
            best = Some(candidate);
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    best.ok_or_else(|| {
        SpaceguardError::InvalidSimulationParameter("empty encounter window".into())
    })
}

#[cfg(test)]
mod monte_carlo_test {
    use super::*;
    use crate::constants::J2000;
    use crate::keplerian_element::keplerian_element_test::sample_elements;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn simulation_params(num_simulations: usize) -> SimulationParams {
        SimulationParams::builder()
            .elements(sample_elements())
            .encounter_date(J2000 + 365.25)
            .num_simulations(num_simulations)
            .build()
            .unwrap()
    }

    #[test]
    fn test_counters_stay_within_sample_count() {
        let params = simulation_params(200);
        let mut rng = StdRng::seed_from_u64(7);
        let result = run_simulation(&params, &mut rng).unwrap();

        assert_eq!(result.num_samples, 200);
        for count in [
            result.impact_count,
            result.close_approach_count,
            result.very_close_count,
        ] {
            assert!(count <= result.num_samples);
        }
        for p in [
            result.impact_probability,
            result.close_approach_probability,
            result.very_close_probability,
        ] {
            assert!((0.0..=1.0).contains(&p));
        }

        let stats = result.distance_stats.expect("completed samples");
        assert!(stats.min <= stats.median && stats.median <= stats.max);
        assert!(stats.p5 <= stats.p95);
        assert!(stats.std_dev >= 0.0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let params = simulation_params(100);
        let mut rng_a = StdRng::seed_from_u64(99);
        let mut rng_b = StdRng::seed_from_u64(99);

        let a = run_simulation(&params, &mut rng_a).unwrap();
        let b = run_simulation(&params, &mut rng_b).unwrap();
        assert_eq!(a.impact_count, b.impact_count);
        assert_eq!(a.distance_stats.unwrap().min, b.distance_stats.unwrap().min);
    }

    #[test]
    fn test_zero_uncertainty_collapses_the_distribution() {
        let uncertainties = ElementUncertainties {
            semi_major_axis: 0.0,
            eccentricity: 0.0,
            inclination: 0.0,
            ascending_node_longitude: 0.0,
            periapsis_argument: 0.0,
            mean_anomaly: 0.0,
        };
        let params = SimulationParams::builder()
            .elements(sample_elements())
            .encounter_date(J2000 + 100.0)
            .num_simulations(50)
            .uncertainties(uncertainties)
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(3);
        let stats = run_simulation(&params, &mut rng)
            .unwrap()
            .distance_stats
            .unwrap();
        // Every draw is bit-identical, so min and max coincide exactly; the
        // mean still accumulates rounding at the ~1e-8 km scale over ~1e7 km
        // distances, which keeps the variance slightly above zero.
        assert_eq!(stats.min, stats.max);
        assert_relative_eq!(stats.std_dev, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_sampled_eccentricity_is_clamped() {
        let elements = KeplerianElements::new(1.2, 0.95, 5.0, 50.0, 80.0, 10.0, J2000).unwrap();
        let uncertainties = ElementUncertainties {
            eccentricity: 0.5,
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);

        let mut clamped = 0;
        for _ in 0..100 {
            let sampled = sample_orbital_elements(&elements, &uncertainties, &mut rng);
            assert!((0.0..=MAX_SAMPLED_ECCENTRICITY).contains(&sampled.eccentricity));
            if sampled.eccentricity == MAX_SAMPLED_ECCENTRICITY {
                clamped += 1;
            }
        }
        assert!(clamped > 0, "a σ of 0.5 around e=0.95 must hit the clamp");
    }

    #[test]
    fn test_builder_rejects_oversized_request() {
        let err = SimulationParams::builder()
            .elements(sample_elements())
            .encounter_date(J2000)
            .num_simulations(MAX_SIMULATIONS + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, SpaceguardError::InvalidSimulationParameter(_)));
    }

    #[test]
    fn test_builder_requires_elements() {
        let err = SimulationParams::builder()
            .encounter_date(J2000)
            .build()
            .unwrap_err();
        assert!(matches!(err, SpaceguardError::InvalidSimulationParameter(_)));
    }

    #[test]
    fn test_builder_rejects_negative_uncertainty() {
        let err = SimulationParams::builder()
            .elements(sample_elements())
            .encounter_date(J2000)
            .uncertainties(ElementUncertainties {
                mean_anomaly: -1.0,
                ..Default::default()
            })
            .build()
            .unwrap_err();
        assert!(matches!(err, SpaceguardError::InvalidSimulationParameter(_)));
    }

    #[test]
    fn test_cancelled_run_reports_a_consistent_partial_result() {
        let params = simulation_params(MAX_SIMULATIONS);
        let mut rng = StdRng::seed_from_u64(5);
        let result = run_simulation_with_cancel(&params, &mut rng, || true).unwrap();

        // The poll interval guarantees at least the first sample completes;
        // whether the run is cut short depends on wall-clock speed.
        assert!(result.num_samples >= 1);
        assert!(result.num_samples <= MAX_SIMULATIONS);
        assert!(result.impact_count <= result.num_samples);
        assert!(result.distance_stats.is_some());
    }

    #[test]
    fn test_palermo_scale_values() {
        assert_relative_eq!(palermo_scale(1.0, 1.0).unwrap(), 8.0, epsilon = 1e-12);
        assert_relative_eq!(palermo_scale(1.0e-8, 1.0).unwrap(), 0.0, epsilon = 1e-12);
        assert!(palermo_scale(0.0, 1.0).is_none());
        assert!(palermo_scale(0.5, 0.0).is_none());
        assert!(palermo_scale(0.5, -2.0).is_none());
    }

    #[test]
    fn test_earth_crossing_orbit_registers_impacts() {
        // A circular 1 AU orbit phased to the circular Earth model drifts
        // apart only through the tiny mean-motion mismatch: a few days
        // after the epoch the separation is a couple hundred km, well
        // inside all three thresholds.
        let grazer = KeplerianElements::new(
            1.0,
            0.0,
            0.0,
            0.0,
            0.0,
            crate::earth::EARTH_MEAN_LONGITUDE_J2000,
            J2000,
        )
        .unwrap();
        let no_noise = ElementUncertainties {
            semi_major_axis: 0.0,
            eccentricity: 0.0,
            inclination: 0.0,
            ascending_node_longitude: 0.0,
            periapsis_argument: 0.0,
            mean_anomaly: 0.0,
        };
        let params = SimulationParams::builder()
            .elements(grazer)
            .encounter_date(J2000 + 3.6525)
            .num_simulations(100)
            .uncertainties(no_noise)
            .build()
            .unwrap();

        let mut rng = StdRng::seed_from_u64(1);
        let result = run_simulation(&params, &mut rng).unwrap();

        assert_eq!(result.impact_count, 100);
        assert_eq!(result.very_close_count, 100);
        assert_eq!(result.close_approach_count, 100);
        assert_relative_eq!(result.impact_probability, 1.0, epsilon = 1e-12);

        // p = 1 over 0.01 years: PS = log10(1 / (1e-8 * 0.01)) = 10.
        assert_relative_eq!(result.palermo_scale.unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_no_impacts_means_no_palermo_value() {
        // The sample orbit misses Earth by far, so no draw can impact.
        let params = simulation_params(100);
        let mut rng = StdRng::seed_from_u64(21);
        let result = run_simulation(&params, &mut rng).unwrap();
        assert_eq!(result.impact_count, 0);
        assert!(result.palermo_scale.is_none());
    }

    #[test]
    fn test_extended_search_stays_inside_the_window() {
        let params = ExtendedSimulationParams::builder()
            .elements(sample_elements())
            .center_date(J2000 + 200.0)
            .window_days(2)
            .num_simulations(500)
            .build()
            .unwrap();
        assert_eq!(params.samples_per_date(), 100);

        let mut rng = StdRng::seed_from_u64(13);
        let result = run_extended_simulation(&params, &mut rng).unwrap();
        assert!(result.encounter_date >= J2000 + 198.0);
        assert!(result.encounter_date <= J2000 + 202.0);
        assert_eq!(result.num_samples, 100);
    }

    #[test]
    fn test_small_budget_is_never_exceeded_per_date() {
        let params = ExtendedSimulationParams::builder()
            .elements(sample_elements())
            .center_date(J2000)
            .window_days(1)
            .num_simulations(40)
            .build()
            .unwrap();
        assert_eq!(params.samples_per_date(), 40);
    }

    #[test]
    fn test_extended_builder_rejects_wide_window() {
        let err = ExtendedSimulationParams::builder()
            .elements(sample_elements())
            .center_date(J2000)
            .window_days(MAX_WINDOW_DAYS + 1)
            .build()
            .unwrap_err();
        assert!(matches!(err, SpaceguardError::InvalidSimulationParameter(_)));
    }

    #[test]
    fn test_display_formats() {
        let params = simulation_params(50);
        let mut rng = StdRng::seed_from_u64(17);
        let result = run_simulation(&params, &mut rng).unwrap();

        let compact = format!("{result}");
        assert!(compact.contains("samples=50"));

        let pretty = format!("{result:#}");
        assert!(pretty.contains("Monte Carlo encounter summary"));
        assert!(pretty.contains("palermo"));
    }
}
