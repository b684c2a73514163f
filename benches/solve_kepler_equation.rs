use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spaceguard::kepler::{solve_kepler_equation, PropagationParams};

/// Uniform random in [0, 2π)
#[inline]
fn rand_angle(rng: &mut StdRng) -> f64 {
    rng.random::<f64>() * std::f64::consts::TAU
}

/// Typical regime: e ∈ [0.0, 0.7]
fn bench_typical(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xDEADBEEF);
    let samples = 10_000usize;
    let params = PropagationParams::default();

    c.bench_function("solve_kepler_equation/typical_e<=0.7", |b| {
        b.iter_batched(
            || {
                // Pre-generate inputs to avoid RNG cost in the timed section
                (0..samples)
                    .map(|_| (rand_angle(&mut rng), rng.random_range(0.0..=0.7)))
                    .collect::<Vec<_>>()
            },
            |cases| {
                // Benchmark only the solver calls
                for (m, e) in cases {
                    let solution =
                        solve_kepler_equation(black_box(m), black_box(e), &params).unwrap();
                    black_box(solution.eccentric_anomaly);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

/// Stress regime: e ∈ [0.8, 0.99], where the π initial guess kicks in
fn bench_high_eccentricity(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let samples = 10_000usize;
    let params = PropagationParams::default();

    c.bench_function("solve_kepler_equation/high_e>=0.8", |b| {
        b.iter_batched(
            || {
                (0..samples)
                    .map(|_| (rand_angle(&mut rng), rng.random_range(0.8..=0.99)))
                    .collect::<Vec<_>>()
            },
            |cases| {
                for (m, e) in cases {
                    let solution =
                        solve_kepler_equation(black_box(m), black_box(e), &params).unwrap();
                    black_box(solution.eccentric_anomaly);
                }
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, bench_typical, bench_high_eccentricity);
criterion_main!(benches);
