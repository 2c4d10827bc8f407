use ndarray::ArrayView2;

use crate::data::DataSet;
use crate::error::SearchError;
use crate::sorted_sets::SortedFamily;
use crate::tree::PolicyTree;

pub(crate) mod exact;
pub(crate) mod hybrid;
pub mod params;

pub use params::{HybridParams, SearchMethod, SearchParams, SearchParamsBuilder};

/// Fit the policy tree maximizing the summed reward of the assigned actions.
///
/// `x` is the N x p covariate matrix, `y` the N x d reward matrix (one
/// column per action, already debiased upstream). The search method and its
/// complexity controls come from `params`; see [`SearchParams`].
pub fn fit<'a>(
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
    params: &SearchParams,
) -> Result<PolicyTree, SearchError> {
    validate(x, y, params)?;
    let data = DataSet::new(x, y);
    let family = SortedFamily::build(&data);
    let mut scratch = exact::reward_scratch(data.num_rewards(), data.num_rows());

    let root = match &params.method {
        SearchMethod::Exact => exact::find_best_split(
            &family,
            params.depth,
            params.split_step,
            params.min_node_size,
            &data,
            &mut scratch,
            0,
            false,
        ),
        SearchMethod::Hybrid(hybrid) => {
            hybrid::expand(&data, family, params, hybrid, &mut scratch)
        }
    };
    Ok(PolicyTree::new(root))
}

/// Exhaustive search at `params.depth`, regardless of `params.method`.
pub fn tree_search<'a>(
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
    params: &SearchParams,
) -> Result<PolicyTree, SearchError> {
    let params = SearchParams {
        method: SearchMethod::Exact,
        ..params.clone()
    };
    fit(x, y, &params)
}

/// Hybrid search at `params.depth` with the given expansion windows.
pub fn tree_search_hybrid<'a>(
    x: ArrayView2<'a, f64>,
    y: ArrayView2<'a, f64>,
    params: &SearchParams,
    hybrid: HybridParams,
) -> Result<PolicyTree, SearchError> {
    let params = SearchParams {
        method: SearchMethod::Hybrid(hybrid),
        ..params.clone()
    };
    fit(x, y, &params)
}

fn validate(
    x: ArrayView2<f64>,
    y: ArrayView2<f64>,
    params: &SearchParams,
) -> Result<(), SearchError> {
    if x.nrows() == 0 || x.ncols() == 0 || y.nrows() == 0 || y.ncols() == 0 {
        return Err(SearchError::EmptyInput);
    }
    if x.nrows() != y.nrows() {
        return Err(SearchError::RowMismatch {
            x_rows: x.nrows(),
            y_rows: y.nrows(),
        });
    }
    if params.split_step < 1 {
        return Err(SearchError::SplitStep(params.split_step));
    }
    if params.min_node_size < 1 {
        return Err(SearchError::MinNodeSize(params.min_node_size));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_data::two_region_data;
    use ndarray::Array2;

    #[test]
    fn rejects_empty_matrices() {
        let empty = Array2::<f64>::zeros((0, 1));
        let y = Array2::<f64>::zeros((0, 2));
        assert_eq!(
            fit(empty.view(), y.view(), &SearchParams::default()),
            Err(SearchError::EmptyInput)
        );

        let x = Array2::<f64>::zeros((3, 0));
        let y = Array2::<f64>::zeros((3, 2));
        assert_eq!(
            fit(x.view(), y.view(), &SearchParams::default()),
            Err(SearchError::EmptyInput)
        );
    }

    #[test]
    fn rejects_mismatched_row_counts() {
        let (x, _) = two_region_data();
        let y = Array2::<f64>::zeros((3, 2));
        assert_eq!(
            fit(x.view(), y.view(), &SearchParams::default()),
            Err(SearchError::RowMismatch { x_rows: 4, y_rows: 3 })
        );
    }

    #[test]
    fn rejects_degenerate_parameters() {
        let (x, y) = two_region_data();
        let params = SearchParamsBuilder::new().split_step(0).build();
        assert_eq!(
            fit(x.view(), y.view(), &params),
            Err(SearchError::SplitStep(0))
        );

        let params = SearchParamsBuilder::new().min_node_size(0).build();
        assert_eq!(
            fit(x.view(), y.view(), &params),
            Err(SearchError::MinNodeSize(0))
        );
    }

    #[test]
    fn fit_dispatches_on_the_method() {
        let (x, y) = two_region_data();
        let exact = tree_search(x.view(), y.view(), &SearchParams::default()).unwrap();
        let hybrid = tree_search_hybrid(
            x.view(),
            y.view(),
            &SearchParams::default(),
            HybridParams::default(),
        )
        .unwrap();
        assert_eq!(exact.reward(), 4.0);
        assert_eq!(hybrid.reward(), 4.0);
    }
}
