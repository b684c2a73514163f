//! # Batch Earth-relative positions
//!
//! Evaluate many bodies at one epoch into a single packed buffer of 32-bit
//! floats (interleaved `x, y, z` triplets). The flat layout is the wire
//! contract: callers hand it straight to a transport or GPU upload path
//! without restructuring, which is why this module returns a `Vec<f32>`
//! rather than a structured object.
//!
//! Failures are **per-item**: a missing or invalid element set contributes
//! an origin triplet and a [`tracing`] warning, and the rest of the batch
//! proceeds. Earth is evaluated once per call with the full Keplerian
//! ephemeris, so the output is consistent with [`crate::trajectory`].
//!
//! ## Units
//! -----------------
//! Earth-relative ecliptic coordinates, AU, truncated to `f32`.

use nalgebra::Vector3;

use crate::constants::JulianDate;
use crate::earth::earth_position;
use crate::kepler::PropagationParams;
use crate::keplerian_element::KeplerianElements;
use crate::spaceguard_errors::Result;

/// Earth-relative positions for a list of bodies at one epoch.
///
/// The output holds exactly `3 * elements.len()` floats: entry `i` occupies
/// `[3i, 3i + 2]` as `x, y, z` in AU. Entries without elements, and entries
/// whose propagation fails validation, stay at the origin.
///
/// Arguments
/// ---------
/// * `elements`: one optional element set per body, order preserved.
/// * `jd`: common epoch of evaluation.
/// * `params`: Kepler solver tolerances.
///
/// Return
/// ------
/// * The packed buffer. An error is only possible for the shared Earth
///   evaluation; per-item failures never abort the batch.
///
/// See also
/// --------
/// * [`crate::trajectory::geocentric_position`] – One body, full annotations.
pub fn batch_geocentric_positions(
    elements: &[Option<KeplerianElements>],
    jd: JulianDate,
    params: &PropagationParams,
) -> Result<Vec<f32>> {
    let earth = earth_position(jd, params)?;
    let mut buffer = vec![0.0_f32; elements.len() * 3];

    for (index, entry) in elements.iter().enumerate() {
        let Some(body) = entry else {
            tracing::warn!(index, "no orbital elements, defaulting to origin");
            continue;
        };
        match body.position_at(jd, params) {
            Ok(position) => {
                let geocentric: Vector3<f64> = position - earth;
                buffer[index * 3] = geocentric.x as f32;
                buffer[index * 3 + 1] = geocentric.y as f32;
                buffer[index * 3 + 2] = geocentric.z as f32;
            }
            Err(error) => {
                tracing::warn!(index, %error, "propagation failed, defaulting to origin");
            }
        }
    }
    Ok(buffer)
}
