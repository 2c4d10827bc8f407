use std::collections::VecDeque;

use crate::data::DataSet;
use crate::search::exact::{find_best_split, RewardScratch};
use crate::search::params::{HybridParams, SearchParams};
use crate::sorted_sets::SortedFamily;
use crate::tree::{Node, NodeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    Left,
    Right,
}

/// Re-derive reward and height for every ancestor of a grafted node, bottom
/// up. A graft can change the subtree's reward, and the ancestors' cached
/// sums were computed against the old subtree.
fn refresh_ancestors(node: &mut Node, path: &[Branch]) {
    let Some((first, rest)) = path.split_first() else {
        return;
    };
    let mut updated = None;
    if let NodeKind::Split { left, right, .. } = &mut node.kind {
        match first {
            Branch::Left => refresh_ancestors(left, rest),
            Branch::Right => refresh_ancestors(right, rest),
        }
        updated = Some((left.reward + right.reward, 1 + left.height.max(right.height)));
    }
    if let Some((reward, height)) = updated {
        node.reward = reward;
        node.height = height;
    }
}

fn node_at_path_mut<'a>(root: &'a mut Node, path: &[Branch]) -> &'a mut Node {
    let mut node = root;
    for branch in path {
        node = match &mut node.kind {
            NodeKind::Split { left, right, .. } => match branch {
                Branch::Left => left,
                Branch::Right => right,
            },
            NodeKind::Leaf { .. } => panic!("expansion path walked through a leaf"),
        };
    }
    node
}

/// Root-relative paths of the chop frontier of a freshly expanded local
/// tree: the strict descendants sitting exactly `chop_depth` height levels
/// below the local root. Shallower descendants stay as grafted; deeper ones
/// are left to be replaced when their ancestor on the frontier is expanded.
fn chop_frontier(local: &Node, chop_depth: usize) -> Vec<Vec<Branch>> {
    let local_height = local.height;
    let mut frontier = Vec::new();
    let mut bfs: VecDeque<(Vec<Branch>, &Node)> = VecDeque::new();
    if let NodeKind::Split { left, right, .. } = &local.kind {
        bfs.push_back((vec![Branch::Left], left));
        bfs.push_back((vec![Branch::Right], right));
    }
    while let Some((path, node)) = bfs.pop_front() {
        let gap = local_height - node.height;
        if gap == chop_depth {
            frontier.push(path);
        } else if gap < chop_depth {
            if let NodeKind::Split { left, right, .. } = &node.kind {
                let mut left_path = path.clone();
                left_path.push(Branch::Left);
                bfs.push_back((left_path, left));
                let mut right_path = path;
                right_path.push(Branch::Right);
                bfs.push_back((right_path, right));
            }
        }
    }
    frontier
}

/// Iterative "expand, chop, and re-expand" search.
///
/// A FIFO queue of expansion points (addressed by their path from the root)
/// starts at a placeholder root holding the full sorted-index family. Each
/// dequeued node is replaced by a local exact search over its attached
/// family, and the chop frontier of that local tree is queued for further
/// expansion until the global depth budget is met. Each local window is
/// optimal; composing them trades global optimality for tractability on
/// deeper targets.
pub(crate) fn expand(
    data: &DataSet,
    family: SortedFamily,
    params: &SearchParams,
    hybrid: &HybridParams,
    scratch: &mut RewardScratch,
) -> Node {
    let max_global_depth = params.depth;
    if max_global_depth == 0 {
        return find_best_split(&family, 0, params.split_step, params.min_node_size, data, scratch, 0, false);
    }

    // Placeholder root; its height of 1 marks it as expandable.
    let mut root = Node::leaf(0, 0.0, 0);
    root.height = 1;
    root.family = Some(family);

    let mut queue: VecDeque<Vec<Branch>> = VecDeque::new();
    queue.push_back(Vec::new());

    while let Some(path) = queue.pop_front() {
        let node = node_at_path_mut(&mut root, &path);
        if node.height < 1 || node.depth >= max_global_depth {
            continue;
        }
        let node_family = node
            .family
            .take()
            .expect("expansion node lost its sorted-index family");
        // a window never reaches past the global depth budget
        let level = hybrid.complete_split_depth.min(max_global_depth - node.depth);
        let local = find_best_split(
            &node_family,
            level,
            params.split_step,
            params.min_node_size,
            data,
            scratch,
            node.depth,
            true,
        );
        let frontier = chop_frontier(&local, hybrid.chop_depth);
        *node = local;
        refresh_ancestors(&mut root, &path);
        for relative in frontier {
            let mut full = path.clone();
            full.extend(relative);
            queue.push_back(full);
        }
    }

    root.drop_families();
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::exact::reward_scratch;
    use crate::search::params::SearchParamsBuilder;
    use crate::test_data::{interior_band_data, two_region_data};

    fn run_hybrid(
        x: &ndarray::Array2<f64>,
        y: &ndarray::Array2<f64>,
        depth: usize,
        hybrid: HybridParams,
    ) -> Node {
        let data = DataSet::new(x.view(), y.view());
        let family = SortedFamily::build(&data);
        let mut scratch = reward_scratch(data.num_rewards(), data.num_rows());
        let params = SearchParamsBuilder::new().depth(depth).build();
        expand(&data, family, &params, &hybrid, &mut scratch)
    }

    fn run_exact(x: &ndarray::Array2<f64>, y: &ndarray::Array2<f64>, depth: usize) -> Node {
        let data = DataSet::new(x.view(), y.view());
        let family = SortedFamily::build(&data);
        let mut scratch = reward_scratch(data.num_rewards(), data.num_rows());
        find_best_split(&family, depth, 1, 1, &data, &mut scratch, 0, false)
    }

    #[test]
    fn depth_zero_budget_returns_the_argmax_leaf() {
        let (x, y) = two_region_data();
        let node = run_hybrid(&x, &y, 0, HybridParams::default());
        assert!(node.is_leaf());
        assert_eq!(node.reward, 2.0);
    }

    #[test]
    fn window_covering_the_budget_matches_the_exact_search() {
        let (x, y) = interior_band_data();
        for depth in 1..=2 {
            let exact = run_exact(&x, &y, depth);
            let hybrid = run_hybrid(&x, &y, depth, HybridParams::default());
            assert_eq!(hybrid, exact, "depth {depth}");
        }
    }

    #[test]
    fn expansion_windows_are_clamped_to_the_budget() {
        let (x, y) = interior_band_data();
        let node = run_hybrid(
            &x,
            &y,
            1,
            HybridParams {
                complete_split_depth: 2,
                chop_depth: 1,
                repeat_splits: 0,
            },
        );
        assert!(node.height <= 1);
        assert_eq!(node, run_exact(&x, &y, 1));
    }

    #[test]
    fn final_tree_carries_no_expansion_state() {
        let (x, y) = interior_band_data();
        let node = run_hybrid(&x, &y, 2, HybridParams::default());
        fn assert_stripped(node: &Node) {
            assert!(node.family.is_none());
            if let NodeKind::Split { left, right, .. } = &node.kind {
                assert_stripped(left);
                assert_stripped(right);
            }
        }
        assert_stripped(&node);
    }
}
