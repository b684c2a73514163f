use spaceguard::keplerian_element::KeplerianElements;

/// Element set shared by the end-to-end tests: a moderately eccentric,
/// slightly inclined NEO-like orbit referenced to J2000.
pub fn neo_elements() -> KeplerianElements {
    KeplerianElements::new(1.2, 0.3, 5.0, 50.0, 80.0, 10.0, 2451545.0).unwrap()
}

/// An orbit matching the circular Earth model of the simulator, phased to
/// Earth's J2000 mean longitude.
#[allow(dead_code)]
pub fn earth_grazer() -> KeplerianElements {
    KeplerianElements::new(
        1.0,
        0.0,
        0.0,
        0.0,
        0.0,
        spaceguard::earth::EARTH_MEAN_LONGITUDE_J2000,
        2451545.0,
    )
    .unwrap()
}
