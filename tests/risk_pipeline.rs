mod common;

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use spaceguard::constants::{Designation, J2000, SAFE_DISTANCE_KM};
use spaceguard::monte_carlo::{run_simulation, ElementUncertainties, SimulationParams};
use spaceguard::risk::{
    assess_risk, basic_risk_score, batch_assess_risk, proximity_score, Asteroid, RiskParams,
    HAZARDOUS_FLAG_SCORE,
};
use spaceguard::torino::torino_scale;

use crate::common::{earth_grazer, neo_elements};

fn apophis_like(elements: Option<spaceguard::KeplerianElements>) -> Asteroid {
    Asteroid {
        designation: Designation::Numbered(99942),
        absolute_magnitude: Some(19.7),
        diameter_km: Some(0.37),
        is_potentially_hazardous: true,
        approach_velocity_km_s: Some(7.42),
        miss_distance_km: Some(38_000.0),
        orbital_elements: elements,
    }
}

#[test]
fn torino_scale_corners() {
    assert_eq!(torino_scale(0.0, 0.0).unwrap().value(), 0);
    assert_eq!(torino_scale(1.0, 2_000.0).unwrap().value(), 10);
}

#[test]
fn proximity_score_spans_its_bands() {
    assert_relative_eq!(proximity_score(0.0).unwrap(), 100.0, epsilon = 1e-12);
    assert_relative_eq!(
        proximity_score(SAFE_DISTANCE_KM).unwrap(),
        0.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(proximity_score(1.0e9).unwrap(), 0.0, epsilon = 1e-12);

    let grid = [0.0, 2.0e5, 3.844e5, 8.0e5, 1.5e6, 4.0e6, 7.5e6, 2.0e7];
    let scores: Vec<f64> = grid.iter().map(|&d| proximity_score(d).unwrap()).collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]), "{scores:?}");
}

#[test]
fn basic_score_reduces_to_the_hazard_floor() {
    let score = basic_risk_score(true, 0.0, 1.0e9).unwrap();
    assert_relative_eq!(score, HAZARDOUS_FLAG_SCORE, epsilon = 1e-12);
}

#[test]
fn simulation_counters_and_probabilities_stay_bounded() {
    let n = 300;
    let params = SimulationParams::builder()
        .elements(neo_elements())
        .encounter_date(J2000 + 365.25)
        .num_simulations(n)
        .build()
        .unwrap();

    let mut rng = StdRng::seed_from_u64(2024);
    let result = run_simulation(&params, &mut rng).unwrap();

    assert_eq!(result.num_samples, n);
    assert!(result.impact_count <= n);
    assert!(result.close_approach_count <= n);
    assert!(result.very_close_count <= n);
    assert!((0.0..=1.0).contains(&result.impact_probability));
}

#[test]
fn earth_crossing_orbit_saturates_the_hazard_counters() {
    let no_noise = ElementUncertainties {
        semi_major_axis: 0.0,
        eccentricity: 0.0,
        inclination: 0.0,
        ascending_node_longitude: 0.0,
        periapsis_argument: 0.0,
        mean_anomaly: 0.0,
    };
    let params = SimulationParams::builder()
        .elements(earth_grazer())
        .encounter_date(J2000 + 3.6525)
        .num_simulations(50)
        .uncertainties(no_noise)
        .build()
        .unwrap();

    let mut rng = StdRng::seed_from_u64(9);
    let result = run_simulation(&params, &mut rng).unwrap();
    assert_eq!(result.impact_count, 50);
    assert_relative_eq!(result.impact_probability, 1.0, epsilon = 1e-12);
    assert!(result.palermo_scale.is_some());
}

#[test]
fn assessment_pipeline_runs_end_to_end() {
    let asteroid = apophis_like(Some(neo_elements()));
    let params = RiskParams::builder().num_simulations(200).build().unwrap();
    let mut rng = StdRng::seed_from_u64(7);

    let assessment = assess_risk(&asteroid, Some(J2000 + 365.25), &params, &mut rng).unwrap();
    assert_eq!(assessment.simulation.as_ref().unwrap().num_samples, 200);
    assert!(assessment.energy.is_some());
    assert!(assessment.torino.is_some());
    assert!(assessment.comprehensive_score.is_some());
    assert!((0.0..=100.0).contains(&assessment.basic_score));
}

#[test]
fn batch_survives_an_item_without_elements() {
    let with_orbit = apophis_like(Some(neo_elements()));
    let mut without_orbit = apophis_like(None);
    without_orbit.designation = Designation::Numbered(433);

    let params = RiskParams::builder().num_simulations(50).build().unwrap();
    let mut rng = StdRng::seed_from_u64(11);
    let results = batch_assess_risk(
        &[with_orbit, without_orbit],
        Some(J2000 + 100.0),
        &params,
        &mut rng,
    )
    .unwrap();

    assert_eq!(results.len(), 2);
    let orbitless = results
        .iter()
        .find(|a| a.designation == Designation::Numbered(433))
        .expect("orbitless item still assessed");
    assert!(orbitless.simulation.is_none());
    assert!(orbitless.basic_score > 0.0);

    let simulated = results
        .iter()
        .find(|a| a.designation == Designation::Numbered(99942))
        .unwrap();
    assert!(simulated.simulation.is_some());
}
