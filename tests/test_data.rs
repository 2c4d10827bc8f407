use ndarray::{array, Array2};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Seeded continuous covariates and rewards.
pub fn random_data(n: usize, p: usize, d: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, p), |_| rng.gen_range(-1.0..1.0));
    let y = Array2::from_shape_fn((n, d), |_| rng.gen_range(-1.0..1.0));
    (x, y)
}

/// Like `random_data` but with covariates snapped to a coarse grid so that
/// duplicate values exercise the tie-breaking paths.
pub fn random_data_with_ties(n: usize, p: usize, d: usize, seed: u64) -> (Array2<f64>, Array2<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = Array2::from_shape_fn((n, p), |_| rng.gen_range(0..4) as f64 * 0.25);
    let y = Array2::from_shape_fn((n, d), |_| rng.gen_range(-1.0..1.0));
    (x, y)
}

/// Three actions over two features: action 2 pays off only where x1 > 0.5
/// and x0 <= 0.5, action 0 everywhere else, and misassignments are
/// penalized. The optimal depth-2 policy earns 6.0 with two split nodes.
pub fn two_regime_data() -> (Array2<f64>, Array2<f64>) {
    let x = array![
        [0.30, 0.20],
        [0.45, 0.45],
        [0.10, 0.80],
        [0.50, 0.90],
        [0.70, 0.80],
        [0.90, 0.30],
    ];
    let y = array![
        [1.0, 0.0, -2.0],
        [1.0, 0.0, -2.0],
        [-2.0, 0.0, 1.0],
        [-2.0, 0.0, 1.0],
        [1.0, 0.0, -2.0],
        [1.0, 0.0, -2.0],
    ];
    (x, y)
}
