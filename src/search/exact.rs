use crate::data::DataSet;
use crate::sorted_sets::SortedFamily;
use crate::tree::{Node, NodeKind};

#[cfg(feature = "use-rayon")]
use rayon::prelude::*;

/// Cumulative reward sums, `scratch[a][k]` = reward of action a summed over
/// the first k observations in the current feature order. Allocated once per
/// search and reused by every depth-1 call; safe because the recursion is
/// post-order and each call overwrites the prefix it reads.
pub(crate) type RewardScratch = Vec<Vec<f64>>;

pub(crate) fn reward_scratch(num_rewards: usize, num_points: usize) -> RewardScratch {
    vec![vec![0.0; num_points + 1]; num_rewards]
}

/// Best single action for the observations in `family`. O(n * d); ties keep
/// the smallest action index.
pub(crate) fn level_zero_learning(family: &SortedFamily, data: &DataSet, this_depth: usize) -> Node {
    let num_rewards = data.num_rewards();
    let mut reward_sum = vec![0.0; num_rewards];
    for &i in family.set(0).as_slice() {
        for (a, sum) in reward_sum.iter_mut().enumerate() {
            *sum += data.reward(i, a);
        }
    }

    let mut best_action = 0;
    let mut best_reward = f64::NEG_INFINITY;
    for (a, &sum) in reward_sum.iter().enumerate() {
        if sum > best_reward {
            best_reward = sum;
            best_action = a;
        }
    }
    Node::leaf(best_action, best_reward, this_depth)
}

/// Best single split over all features, with the optimal action on each
/// side computed from cumulative reward sums. O(n * p * d).
#[allow(clippy::too_many_arguments)]
pub(crate) fn level_one_learning(
    family: &SortedFamily,
    data: &DataSet,
    scratch: &mut RewardScratch,
    split_step: usize,
    min_node_size: usize,
    this_depth: usize,
    attach_family: bool,
) -> Node {
    let num_points = family.len();

    let mut best_reward = f64::NEG_INFINITY;
    let mut best_left = f64::NEG_INFINITY;
    let mut best_right = f64::NEG_INFINITY;
    let mut best_action_left = 0;
    let mut best_action_right = 0;
    let mut split_var = 0;
    let mut split_val = 0.0;

    for p in 0..family.num_features() {
        let obs = family.set(p).as_slice();
        for (a, sums) in scratch.iter_mut().enumerate() {
            sums[0] = 0.0;
            for (k, &i) in obs.iter().enumerate() {
                sums[k + 1] = sums[k] + data.reward(i, a);
            }
        }

        let mut split_counter = 0;
        for k in 1..num_points {
            split_counter += 1;
            let value = data.value(obs[k - 1], p);
            if value == data.value(obs[k], p) {
                continue;
            }
            if k < min_node_size || num_points - k < min_node_size {
                continue;
            }
            if split_counter >= split_step {
                split_counter = 0;
            } else {
                continue;
            }

            let mut left_best = f64::NEG_INFINITY;
            let mut right_best = f64::NEG_INFINITY;
            let mut left_action = 0;
            let mut right_action = 0;
            for (a, sums) in scratch.iter().enumerate() {
                let left_reward = sums[k];
                let right_reward = sums[num_points] - left_reward;
                if left_best < left_reward {
                    left_best = left_reward;
                    left_action = a;
                }
                if right_best < right_reward {
                    right_best = right_reward;
                    right_action = a;
                }
            }
            if best_reward < left_best + right_best {
                best_reward = left_best + right_best;
                best_left = left_best;
                best_right = right_best;
                best_action_left = left_action;
                best_action_right = right_action;
                split_var = p;
                split_val = value;
            }
        }
    }

    if best_reward > f64::NEG_INFINITY {
        // "pruning": both sides agreeing on the action is just a leaf
        if best_action_left == best_action_right {
            Node::leaf(best_action_left, best_reward, this_depth)
        } else {
            let left = Node::leaf(best_action_left, best_left, this_depth + 1);
            let right = Node::leaf(best_action_right, best_right, this_depth + 1);
            let mut ans = Node::split(split_var, split_val, best_reward, this_depth, left, right);
            if attach_family {
                ans.family = Some(family.clone());
            }
            ans
        }
    } else {
        level_zero_learning(family, data, this_depth)
    }
}

struct SplitCandidate {
    reward: f64,
    split_val: f64,
    left: Node,
    right: Node,
}

/// Best candidate when splitting on `split_dim`, recursing to `level - 1`
/// on both sides of every admissible boundary. The boundary advances one
/// observation at a time by moving the minimum of the right family into the
/// left one across all member sets.
#[allow(clippy::too_many_arguments)]
fn scan_split_feature(
    family: &SortedFamily,
    split_dim: usize,
    level: usize,
    split_step: usize,
    min_node_size: usize,
    data: &DataSet,
    scratch: &mut RewardScratch,
    this_depth: usize,
    attach_family: bool,
) -> Option<SplitCandidate> {
    let num_points = family.len();
    let mut right = family.clone();
    let mut left = SortedFamily::empty(family.num_features());

    let mut best: Option<SplitCandidate> = None;
    let mut split_counter = 0;
    for _ in 0..num_points.saturating_sub(1) {
        let moved = right.transfer_min(data, split_dim, &mut left);
        split_counter += 1;
        let next = right
            .set(split_dim)
            .first()
            .expect("split scan drained the right family");
        let value = data.value(moved, split_dim);
        if value == data.value(next, split_dim) {
            continue;
        }
        let k = left.len();
        if k < min_node_size || num_points - k < min_node_size {
            continue;
        }
        if split_counter >= split_step {
            split_counter = 0;
        } else {
            continue;
        }

        let left_child = find_best_split(
            &left,
            level - 1,
            split_step,
            min_node_size,
            data,
            scratch,
            this_depth + 1,
            attach_family,
        );
        let right_child = find_best_split(
            &right,
            level - 1,
            split_step,
            min_node_size,
            data,
            scratch,
            this_depth + 1,
            attach_family,
        );
        let reward = left_child.reward + right_child.reward;
        if best.as_ref().map_or(true, |b| reward > b.reward) {
            best = Some(SplitCandidate {
                reward,
                split_val: value,
                left: left_child,
                right: right_child,
            });
        }
    }
    best
}

/// Exhaustive optimal search to `level` remaining levels, returning the
/// node rooted at `this_depth`.
///
/// For each of the p * (n - 1) boundaries the observation on the boundary is
/// moved from the right family to the left one in all p member sets, and
/// both halves are searched recursively. Iteration order over features and
/// over the tie-broken observation order is fixed, and the first of equally
/// rewarding candidates wins, so the result is reproducible bit for bit.
///
/// Time complexity for tree depth k >= 1:
/// O(p^k n^k (log n + d) + p n log n).
#[allow(clippy::too_many_arguments)]
pub(crate) fn find_best_split(
    family: &SortedFamily,
    level: usize,
    split_step: usize,
    min_node_size: usize,
    data: &DataSet,
    scratch: &mut RewardScratch,
    this_depth: usize,
    attach_family: bool,
) -> Node {
    debug_assert!(!family.is_empty(), "search reached an empty node");
    if level == 0 {
        return level_zero_learning(family, data, this_depth);
    }
    if level == 1 {
        return level_one_learning(
            family,
            data,
            scratch,
            split_step,
            min_node_size,
            this_depth,
            attach_family,
        );
    }

    let num_features = family.num_features();

    // The scan of each split feature starts from a private copy of the
    // family, so the top-level feature loop is embarrassingly parallel.
    // Workers own a private scratch buffer; the reduction below replays the
    // sequential first-found tie-break, keeping the output bit-identical.
    #[cfg(feature = "use-rayon")]
    let feature_bests: Vec<Option<SplitCandidate>> = if this_depth == 0 {
        (0..num_features)
            .into_par_iter()
            .map(|p| {
                let mut scratch = reward_scratch(data.num_rewards(), family.len());
                scan_split_feature(
                    family,
                    p,
                    level,
                    split_step,
                    min_node_size,
                    data,
                    &mut scratch,
                    this_depth,
                    attach_family,
                )
            })
            .collect()
    } else {
        (0..num_features)
            .map(|p| {
                scan_split_feature(
                    family,
                    p,
                    level,
                    split_step,
                    min_node_size,
                    data,
                    scratch,
                    this_depth,
                    attach_family,
                )
            })
            .collect()
    };

    #[cfg(not(feature = "use-rayon"))]
    let feature_bests: Vec<Option<SplitCandidate>> = (0..num_features)
        .map(|p| {
            scan_split_feature(
                family,
                p,
                level,
                split_step,
                min_node_size,
                data,
                scratch,
                this_depth,
                attach_family,
            )
        })
        .collect();

    let mut best: Option<(usize, SplitCandidate)> = None;
    for (p, candidate) in feature_bests.into_iter().enumerate() {
        if let Some(candidate) = candidate {
            if best.as_ref().map_or(true, |(_, b)| candidate.reward > b.reward) {
                best = Some((p, candidate));
            }
        }
    }

    match best {
        None => level_zero_learning(family, data, this_depth),
        Some((split_var, candidate)) => {
            // "pruning", the recursive case: both children reduced to leaves
            // with the same action collapse into one leaf
            if let (NodeKind::Leaf { action: la }, NodeKind::Leaf { action: ra }) =
                (&candidate.left.kind, &candidate.right.kind)
            {
                if la == ra {
                    return Node::leaf(*la, candidate.reward, this_depth);
                }
            }
            let mut ans = Node::split(
                split_var,
                candidate.split_val,
                candidate.reward,
                this_depth,
                candidate.left,
                candidate.right,
            );
            if attach_family {
                ans.family = Some(family.clone());
            }
            ans
        }
    }
}
