use ndarray::ArrayView2;

/// Read-only view over the covariate matrix X (N x p) and the reward matrix
/// Y (N x d). Row i of Y holds the estimated reward of each action for
/// observation i; the matrices are borrowed for the lifetime of a search and
/// shared across all recursion frames.
///
/// Dimensions are fixed at construction. Entries must not be NaN (caller's
/// responsibility); out-of-range indices are a programming error and panic.
#[derive(Debug, Clone, Copy)]
pub struct DataSet<'a> {
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
}

impl<'a> DataSet<'a> {
    pub fn new(x: ArrayView2<'a, f64>, y: ArrayView2<'a, f64>) -> Self {
        debug_assert_eq!(x.nrows(), y.nrows());
        DataSet { x, y }
    }

    #[inline]
    pub fn num_rows(&self) -> usize {
        self.x.nrows()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.x.ncols()
    }

    #[inline]
    pub fn num_rewards(&self) -> usize {
        self.y.ncols()
    }

    /// Covariate j of observation i.
    #[inline]
    pub fn value(&self, i: usize, j: usize) -> f64 {
        self.x[[i, j]]
    }

    /// Reward of action a for observation i.
    #[inline]
    pub fn reward(&self, i: usize, a: usize) -> f64 {
        self.y[[i, a]]
    }
}
