use numpy::{PyArray2, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::search::{fit, HybridParams, SearchMethod, SearchParams};
use crate::tree;

fn non_negative(name: &str, value: i64) -> PyResult<usize> {
    usize::try_from(value).map_err(|_| PyValueError::new_err(format!("{name} must be non-negative, got {value}")))
}

/// Fit a policy tree and return it as the flat numeric encoding: one row
/// per node in pre-order with columns
/// `[node_id, is_leaf, split_var, split_val, left_id, right_id, action_id]`
/// (ids, split variables and actions 1-indexed).
#[pyfunction]
#[pyo3(signature = (
    x,
    y,
    depth,
    split_step = 1,
    min_node_size = 1,
    exact_search = true,
    hybrid_complete_split_depth = 2,
    hybrid_chop_depth = 1,
    hybrid_repeat_splits = 0,
))]
#[allow(clippy::too_many_arguments)]
pub fn tree_search<'py>(
    py: Python<'py>,
    x: PyReadonlyArray2<'py, f64>,
    y: PyReadonlyArray2<'py, f64>,
    depth: i64,
    split_step: i64,
    min_node_size: i64,
    exact_search: bool,
    hybrid_complete_split_depth: i64,
    hybrid_chop_depth: i64,
    hybrid_repeat_splits: i64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let depth = non_negative("depth", depth)?;
    let split_step = non_negative("split_step", split_step)?;
    let min_node_size = non_negative("min_node_size", min_node_size)?;

    let method = if exact_search {
        SearchMethod::Exact
    } else {
        SearchMethod::Hybrid(HybridParams {
            complete_split_depth: non_negative(
                "hybrid_complete_split_depth",
                hybrid_complete_split_depth,
            )?,
            chop_depth: non_negative("hybrid_chop_depth", hybrid_chop_depth)?,
            repeat_splits: non_negative("hybrid_repeat_splits", hybrid_repeat_splits)?,
        })
    };
    let params = SearchParams {
        depth,
        split_step,
        min_node_size,
        method,
    };

    let tree = fit(x.as_array(), y.as_array(), &params)
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(tree.to_array().to_pyarray(py))
}

/// Route every row of `x` through an encoded tree, returning the 1-indexed
/// action ids as an N x 1 matrix.
#[pyfunction]
pub fn tree_search_predict<'py>(
    py: Python<'py>,
    tree_array: PyReadonlyArray2<'py, f64>,
    x: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let actions = tree::predict_from_array(tree_array.as_array(), x.as_array())
        .map_err(|e| PyValueError::new_err(e.to_string()))?;
    Ok(actions.to_pyarray(py))
}
