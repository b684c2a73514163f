//! # Spaceguard
//!
//! An orbital-mechanics and impact-risk engine for near-Earth objects:
//! Keplerian elements to Cartesian states at arbitrary epochs, trajectory
//! sampling, closest-approach search, Monte Carlo impact probabilities and
//! the Torino/Palermo hazard scales.
//!
//! The crate exposes pure computation only — no network, disk or socket
//! I/O. Element sets come from an external source, results go back to the
//! caller, and the only non-determinism is the random number generator the
//! caller injects into the simulator.

pub mod batch;
pub mod constants;
pub mod earth;
pub mod energy;
pub mod kepler;
pub mod keplerian_element;
pub mod monte_carlo;
pub mod perturbation;
pub mod risk;
pub mod spaceguard_errors;
pub mod time;
pub mod torino;
pub mod trajectory;

pub use constants::Designation;
pub use energy::{ImpactEnergy, Severity};
pub use keplerian_element::{KeplerianElements, StateVector};
pub use monte_carlo::{DistanceStats, SimulationParams, SimulationResult};
pub use risk::{Asteroid, RiskAssessment, RiskLabel};
pub use spaceguard_errors::{Result, SpaceguardError};
pub use torino::TorinoLevel;
pub use trajectory::{CloseApproach, TrajectoryPoint};
