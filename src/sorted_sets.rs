use std::cmp::Ordering;

use crate::data::DataSet;

/// Observation indices kept sorted along one covariate dimension.
///
/// Two observations are ordered by their value on `dim`, with the
/// observation index as tie-breaker so the order is strictly total. The
/// backing store is a flat `Vec` rather than a node-based tree: in-order
/// traversal is the hot operation and contiguous storage keeps it
/// cache-friendly.
#[derive(Debug, Clone)]
pub struct SortedSet {
    dim: usize,
    obs: Vec<usize>,
}

impl SortedSet {
    pub fn new(dim: usize) -> Self {
        SortedSet { dim, obs: Vec::new() }
    }

    /// Build the set containing every observation, sorted along `dim`.
    pub fn with_all(dim: usize, data: &DataSet) -> Self {
        let mut obs: Vec<usize> = (0..data.num_rows()).collect();
        obs.sort_unstable_by(|&a, &b| order(data, dim, a, b));
        SortedSet { dim, obs }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.obs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.obs.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.obs
    }

    #[inline]
    pub fn first(&self) -> Option<usize> {
        self.obs.first().copied()
    }

    /// Binary search for observation `i`, in the style of
    /// `slice::binary_search`: `Ok(pos)` if present, `Err(pos)` with the
    /// insertion point otherwise.
    pub fn position(&self, data: &DataSet, i: usize) -> Result<usize, usize> {
        self.obs
            .binary_search_by(|&probe| order(data, self.dim, probe, i))
    }

    pub fn insert(&mut self, data: &DataSet, i: usize) {
        match self.position(data, i) {
            Ok(_) => panic!("observation {i} inserted twice into sorted set {}", self.dim),
            Err(pos) => self.obs.insert(pos, i),
        }
    }

    pub fn erase(&mut self, data: &DataSet, i: usize) -> usize {
        let pos = self
            .position(data, i)
            .unwrap_or_else(|_| panic!("observation {i} missing from sorted set {}", self.dim));
        self.obs.remove(pos)
    }

    /// Remove and return the minimum.
    pub fn erase_first(&mut self) -> usize {
        self.obs.remove(0)
    }
}

#[inline]
fn order(data: &DataSet, dim: usize, a: usize, b: usize) -> Ordering {
    data.value(a, dim)
        .total_cmp(&data.value(b, dim))
        .then_with(|| a.cmp(&b))
}

/// One `SortedSet` per feature, all holding the same observations.
///
/// This is the structure that makes the exhaustive search tractable: as the
/// split boundary advances one observation at a time, the observation is
/// moved in every member set at once, so both halves stay sorted along every
/// dimension and can be recursed into directly.
#[derive(Debug, Clone)]
pub struct SortedFamily {
    sets: Vec<SortedSet>,
}

impl SortedFamily {
    /// Populated family: each member set sorts all N observations along its
    /// own dimension. O(p * N * log N).
    pub fn build(data: &DataSet) -> Self {
        let sets = (0..data.num_features())
            .map(|dim| SortedSet::with_all(dim, data))
            .collect();
        SortedFamily { sets }
    }

    /// Empty family with the comparators already configured.
    pub fn empty(num_features: usize) -> Self {
        let sets = (0..num_features).map(SortedSet::new).collect();
        SortedFamily { sets }
    }

    /// Number of observations currently held (identical in every member set).
    #[inline]
    pub fn len(&self) -> usize {
        self.sets[0].len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sets[0].is_empty()
    }

    #[inline]
    pub fn num_features(&self) -> usize {
        self.sets.len()
    }

    #[inline]
    pub fn set(&self, dim: usize) -> &SortedSet {
        &self.sets[dim]
    }

    pub fn insert(&mut self, data: &DataSet, i: usize) {
        for set in &mut self.sets {
            set.insert(data, i);
        }
    }

    pub fn erase(&mut self, data: &DataSet, i: usize) {
        for set in &mut self.sets {
            set.erase(data, i);
        }
    }

    /// Move the minimum of `self`'s set along `split_dim` into `dst`,
    /// updating every member set on both sides. Returns the moved
    /// observation. This is the incremental step of the split enumeration:
    /// O(1) removal on the split dimension, O(log n) find on the others.
    pub fn transfer_min(&mut self, data: &DataSet, split_dim: usize, dst: &mut SortedFamily) -> usize {
        let moved = self.sets[split_dim].erase_first();
        dst.sets[split_dim].insert(data, moved);
        for dim in 0..self.sets.len() {
            if dim == split_dim {
                continue;
            }
            self.sets[dim].erase(data, moved);
            dst.sets[dim].insert(data, moved);
        }
        moved
    }
}
