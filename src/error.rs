use thiserror::Error;

/// Errors reported by the search entry points before any tree is built.
///
/// The search itself has no recoverable failures: once the input has been
/// validated it either completes or hits a programming error (which panics).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("covariate matrix X and reward matrix Y must each have at least one row and one column")]
    EmptyInput,

    #[error("row count mismatch: X has {x_rows} rows but Y has {y_rows}")]
    RowMismatch { x_rows: usize, y_rows: usize },

    #[error("split_step must be at least 1, got {0}")]
    SplitStep(usize),

    #[error("min_node_size must be at least 1, got {0}")]
    MinNodeSize(usize),

    #[error("malformed tree array: {0}")]
    TreeEncoding(String),
}
