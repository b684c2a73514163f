use thiserror::Error;

use crate::constants::Designation;

/// Convenient alias for results carrying a [`SpaceguardError`].
pub type Result<T> = std::result::Result<T, SpaceguardError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpaceguardError {
    #[error("Invalid orbital elements: {0}")]
    InvalidOrbitalElements(String),

    #[error("Probability must lie in [0, 1], got {0}")]
    InvalidProbability(f64),

    #[error("Impact energy must be non-negative, got {0} MT")]
    InvalidEnergy(f64),

    #[error("Invalid impact parameter: {0}")]
    InvalidImpactParameter(String),

    #[error("Invalid simulation parameter: {0}")]
    InvalidSimulationParameter(String),

    #[error("Invalid time range: start JD {start} must precede end JD {end}")]
    InvalidTimeRange { start: f64, end: f64 },

    #[error("Invalid calendar date: {0}")]
    InvalidDate(String),

    #[error("No orbital elements available for {0}")]
    MissingOrbitalElements(Designation),

    #[error("Batch size {0} exceeds the maximum of {1}")]
    BatchTooLarge(usize, usize),
}
