/// Tuning knobs of the hybrid "expand and chop" search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HybridParams {
    /// Depth of each local exact search window.
    pub complete_split_depth: usize,
    /// Levels of a local tree retained before its frontier is queued for
    /// re-expansion.
    pub chop_depth: usize,
    /// Reserved. Accepted for host-API stability but currently ignored.
    pub repeat_splits: usize,
}

impl Default for HybridParams {
    fn default() -> Self {
        HybridParams {
            complete_split_depth: 2,
            chop_depth: 1,
            repeat_splits: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMethod {
    /// Exhaustive search, globally optimal at the requested depth.
    Exact,
    /// Composition of bounded exact searches, near-optimal on deep trees.
    Hybrid(HybridParams),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Maximum tree depth; 0 fits a single leaf.
    pub depth: usize,
    /// Consider a split candidate only at every `split_step`-th sample along
    /// a feature. 1 considers every possible split; larger values trade
    /// exactness for speed on dense features.
    pub split_step: usize,
    /// Smallest number of observations a leaf may subtend.
    pub min_node_size: usize,
    pub method: SearchMethod,
}

impl Default for SearchParams {
    fn default() -> Self {
        SearchParamsBuilder::new().build()
    }
}

// Builder for SearchParams
#[derive(Debug, Clone)]
pub struct SearchParamsBuilder {
    depth: usize,
    split_step: usize,
    min_node_size: usize,
    method: SearchMethod,
}

impl SearchParamsBuilder {
    pub fn new() -> Self {
        Self {
            depth: 2,
            split_step: 1,
            min_node_size: 1,
            method: SearchMethod::Exact,
        }
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn split_step(mut self, split_step: usize) -> Self {
        self.split_step = split_step;
        self
    }

    pub fn min_node_size(mut self, min_node_size: usize) -> Self {
        self.min_node_size = min_node_size;
        self
    }

    pub fn exact(mut self) -> Self {
        self.method = SearchMethod::Exact;
        self
    }

    pub fn hybrid(mut self, hybrid: HybridParams) -> Self {
        self.method = SearchMethod::Hybrid(hybrid);
        self
    }

    // Convenience methods for the nested hybrid parameters
    pub fn complete_split_depth(mut self, complete_split_depth: usize) -> Self {
        self.hybrid_mut().complete_split_depth = complete_split_depth;
        self
    }

    pub fn chop_depth(mut self, chop_depth: usize) -> Self {
        self.hybrid_mut().chop_depth = chop_depth;
        self
    }

    pub fn repeat_splits(mut self, repeat_splits: usize) -> Self {
        self.hybrid_mut().repeat_splits = repeat_splits;
        self
    }

    fn hybrid_mut(&mut self) -> &mut HybridParams {
        if !matches!(self.method, SearchMethod::Hybrid(_)) {
            self.method = SearchMethod::Hybrid(HybridParams::default());
        }
        match &mut self.method {
            SearchMethod::Hybrid(h) => h,
            SearchMethod::Exact => unreachable!(),
        }
    }

    pub fn build(self) -> SearchParams {
        SearchParams {
            depth: self.depth,
            split_step: self.split_step,
            min_node_size: self.min_node_size,
            method: self.method,
        }
    }
}

impl Default for SearchParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_exact_depth_two() {
        let params = SearchParamsBuilder::new().build();
        assert_eq!(params.depth, 2);
        assert_eq!(params.split_step, 1);
        assert_eq!(params.min_node_size, 1);
        assert_eq!(params.method, SearchMethod::Exact);
    }

    #[test]
    fn hybrid_convenience_methods_switch_the_method() {
        let params = SearchParamsBuilder::new()
            .depth(5)
            .complete_split_depth(3)
            .chop_depth(2)
            .build();
        assert_eq!(
            params.method,
            SearchMethod::Hybrid(HybridParams {
                complete_split_depth: 3,
                chop_depth: 2,
                repeat_splits: 0,
            })
        );
    }
}
