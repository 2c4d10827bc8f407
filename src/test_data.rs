use ndarray::{array, Array2};

/// One feature, two actions: action 0 pays off on the lower half of the
/// range, action 1 on the upper half. The optimal depth-1 tree splits at
/// x0 <= 1 for a total reward of 4.
pub fn two_region_data() -> (Array2<f64>, Array2<f64>) {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array![[1.0, 0.0], [1.0, 0.0], [0.0, 1.0], [0.0, 1.0]];
    (x, y)
}

/// Action 0 dominates everywhere, so any split prunes back into one leaf.
pub fn single_action_data() -> (Array2<f64>, Array2<f64>) {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array![[1.0, 0.0], [1.0, 0.0], [1.0, 0.0], [1.0, 0.0]];
    (x, y)
}

/// Action 1 pays off only in the interior band of a single feature, which
/// needs two stacked splits to isolate.
pub fn interior_band_data() -> (Array2<f64>, Array2<f64>) {
    let x = array![[0.0], [1.0], [2.0], [3.0]];
    let y = array![[1.0, 0.0], [0.0, 2.0], [0.0, 2.0], [1.0, 0.0]];
    (x, y)
}
