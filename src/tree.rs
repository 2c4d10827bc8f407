use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::SearchError;
use crate::sorted_sets::SortedFamily;

/// Number of columns in the flat tree encoding.
const ENCODING_COLS: usize = 7;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Leaf {
        /// Column index into the reward matrix.
        action: usize,
    },
    Split {
        split_var: usize,
        split_val: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A node of the fitted policy tree.
///
/// `reward` is the summed reward of the observations routed through this
/// node under the subtree's action assignment. `depth` is the distance from
/// the root (root 0); `height` is 0 for leaves and 1 + max child height
/// otherwise. The hybrid search additionally parks the node's sorted-index
/// family on internal nodes so they can be re-expanded later; the exact
/// search leaves it empty.
#[derive(Debug, Clone)]
pub struct Node {
    pub reward: f64,
    pub depth: usize,
    pub height: usize,
    pub kind: NodeKind,
    pub(crate) family: Option<SortedFamily>,
}

impl Node {
    pub(crate) fn leaf(action: usize, reward: f64, depth: usize) -> Self {
        Node {
            reward,
            depth,
            height: 0,
            kind: NodeKind::Leaf { action },
            family: None,
        }
    }

    pub(crate) fn split(
        split_var: usize,
        split_val: f64,
        reward: f64,
        depth: usize,
        left: Node,
        right: Node,
    ) -> Self {
        let height = 1 + left.height.max(right.height);
        Node {
            reward,
            depth,
            height,
            kind: NodeKind::Split {
                split_var,
                split_val,
                left: Box::new(left),
                right: Box::new(right),
            },
            family: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf { .. })
    }

    /// The assigned action, if this is a leaf.
    #[inline]
    pub fn action_id(&self) -> Option<usize> {
        match self.kind {
            NodeKind::Leaf { action } => Some(action),
            NodeKind::Split { .. } => None,
        }
    }

    /// Route one observation to its leaf action.
    pub fn action_for(&self, row: ArrayView1<f64>) -> usize {
        let mut node = self;
        loop {
            match &node.kind {
                NodeKind::Leaf { action } => return *action,
                NodeKind::Split {
                    split_var,
                    split_val,
                    left,
                    right,
                } => {
                    node = if row[*split_var] <= *split_val { left } else { right };
                }
            }
        }
    }

    pub(crate) fn drop_families(&mut self) {
        self.family = None;
        if let NodeKind::Split { left, right, .. } = &mut self.kind {
            left.drop_families();
            right.drop_families();
        }
    }
}

impl PartialEq for Node {
    /// Structural equality on the fitted policy; the re-expansion state is
    /// not part of the policy and is ignored.
    fn eq(&self, other: &Self) -> bool {
        self.reward == other.reward
            && self.depth == other.depth
            && self.height == other.height
            && self.kind == other.kind
    }
}

/// A fitted policy tree: an owning tree of splits and action leaves.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyTree {
    root: Node,
}

impl PolicyTree {
    pub(crate) fn new(mut root: Node) -> Self {
        root.drop_families();
        PolicyTree { root }
    }

    #[inline]
    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Total reward of the training observations under the fitted policy.
    #[inline]
    pub fn reward(&self) -> f64 {
        self.root.reward
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.root.height
    }

    /// Assign every row of `x` to an action (0-indexed reward column).
    pub fn predict(&self, x: ArrayView2<f64>) -> Array1<usize> {
        Array1::from_iter(x.axis_iter(Axis(0)).map(|row| self.root.action_for(row)))
    }

    /// Flatten into the dense numeric encoding used across the host
    /// boundary: one row per node in pre-order, columns
    /// `[node_id, is_leaf, split_var, split_val, left_id, right_id, action_id]`.
    /// Ids, `split_var` and `action_id` are 1-indexed in the encoding; 0
    /// marks a field that does not apply to the node.
    pub fn to_array(&self) -> Array2<f64> {
        let mut rows: Vec<[f64; ENCODING_COLS]> = Vec::new();
        encode_node(&self.root, &mut rows);
        let n = rows.len();
        let flat: Vec<f64> = rows.into_iter().flatten().collect();
        Array2::from_shape_vec((n, ENCODING_COLS), flat)
            .expect("encoding rows have a fixed width")
    }

    /// Decode the flat encoding produced by [`PolicyTree::to_array`].
    ///
    /// Rewards are not part of the encoding, so the decoded tree reports a
    /// reward of 0; it is usable for prediction and round-trips the
    /// topology, splits and actions exactly.
    pub fn from_array(array: ArrayView2<f64>) -> Result<Self, SearchError> {
        if array.nrows() == 0 || array.ncols() != ENCODING_COLS {
            return Err(SearchError::TreeEncoding(format!(
                "expected a non-empty matrix with {ENCODING_COLS} columns, got {}x{}",
                array.nrows(),
                array.ncols()
            )));
        }
        let mut visited = vec![false; array.nrows()];
        let root = decode_node(array, 1, 0, &mut visited)?;
        Ok(PolicyTree { root })
    }
}

fn encode_node(node: &Node, rows: &mut Vec<[f64; ENCODING_COLS]>) -> usize {
    let id = rows.len() + 1;
    match &node.kind {
        NodeKind::Leaf { action } => {
            rows.push([id as f64, 1.0, 0.0, 0.0, 0.0, 0.0, (*action + 1) as f64]);
        }
        NodeKind::Split {
            split_var,
            split_val,
            left,
            right,
        } => {
            rows.push([id as f64, 0.0, (*split_var + 1) as f64, *split_val, 0.0, 0.0, 0.0]);
            let slot = id - 1;
            let left_id = encode_node(left, rows);
            let right_id = encode_node(right, rows);
            rows[slot][4] = left_id as f64;
            rows[slot][5] = right_id as f64;
        }
    }
    id
}

fn decode_node(
    array: ArrayView2<f64>,
    id: usize,
    depth: usize,
    visited: &mut [bool],
) -> Result<Node, SearchError> {
    if id == 0 || id > array.nrows() {
        return Err(SearchError::TreeEncoding(format!(
            "node id {id} out of range for {} rows",
            array.nrows()
        )));
    }
    let row = id - 1;
    if visited[row] {
        return Err(SearchError::TreeEncoding(format!(
            "node id {id} referenced more than once"
        )));
    }
    visited[row] = true;

    if array[[row, 1]] != 0.0 {
        let action = array[[row, 6]];
        if action < 1.0 {
            return Err(SearchError::TreeEncoding(format!(
                "leaf {id} carries invalid action id {action}"
            )));
        }
        Ok(Node::leaf(action as usize - 1, 0.0, depth))
    } else {
        let split_var = array[[row, 2]];
        if split_var < 1.0 {
            return Err(SearchError::TreeEncoding(format!(
                "internal node {id} carries invalid split variable {split_var}"
            )));
        }
        let left = decode_node(array, array[[row, 4]] as usize, depth + 1, visited)?;
        let right = decode_node(array, array[[row, 5]] as usize, depth + 1, visited)?;
        Ok(Node::split(
            split_var as usize - 1,
            array[[row, 3]],
            0.0,
            depth,
            left,
            right,
        ))
    }
}

/// Route every row of `x` through an encoded tree, returning the 1-indexed
/// action ids as an N x 1 matrix. This is the prediction entry point used by
/// hosts that hold only the flat encoding.
pub fn predict_from_array(
    tree: ArrayView2<f64>,
    x: ArrayView2<f64>,
) -> Result<Array2<f64>, SearchError> {
    let decoded = PolicyTree::from_array(tree)?;
    if let Some(split_var) = max_split_var(decoded.root()) {
        if split_var >= x.ncols() {
            return Err(SearchError::TreeEncoding(format!(
                "tree splits on feature {} but X has only {} columns",
                split_var + 1,
                x.ncols()
            )));
        }
    }
    let actions = decoded.predict(x);
    Ok(Array2::from_shape_fn((actions.len(), 1), |(i, _)| {
        (actions[i] + 1) as f64
    }))
}

fn max_split_var(node: &Node) -> Option<usize> {
    match &node.kind {
        NodeKind::Leaf { .. } => None,
        NodeKind::Split {
            split_var, left, right, ..
        } => {
            let below = max_split_var(left).max(max_split_var(right));
            Some(below.map_or(*split_var, |b| b.max(*split_var)))
        }
    }
}
