pub mod data;
pub mod error;
pub mod search;
pub mod sorted_sets;
pub mod tree;

#[cfg(feature = "python")]
pub mod py_bindings;

#[cfg(test)]
pub(crate) mod test_data;

pub use error::SearchError;
pub use search::{
    fit, tree_search, tree_search_hybrid, HybridParams, SearchMethod, SearchParams,
    SearchParamsBuilder,
};
pub use tree::{predict_from_array, Node, NodeKind, PolicyTree};

#[cfg(feature = "python")]
use pyo3::prelude::*;

#[cfg(feature = "python")]
#[pymodule]
fn policy_tree(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_bindings::tree_search, m)?)?;
    m.add_function(wrap_pyfunction!(py_bindings::tree_search_predict, m)?)?;
    Ok(())
}
