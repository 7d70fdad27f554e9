use crate::io::error::Result;
use crate::operators::differential::PatchOperators;
use std::collections::HashMap;
use std::sync::Arc;

/// Memoization cache for patch operators keyed by patch size
///
/// Every channel of one clone shares `(rows, cols)`, so the sparse operators
/// are built once and handed out as shared references.
#[derive(Default)]
pub struct OperatorCache {
    operators: HashMap<(usize, usize), Arc<PatchOperators>>,

    /// Cache performance statistics
    pub stats: CacheStats,
}

/// Performance metrics for cache effectiveness
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits
    pub hits: usize,
    /// Number of cache misses
    pub misses: usize,
}

impl OperatorCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Retrieve cached operators or build and store them
    ///
    /// # Errors
    ///
    /// Propagates operator construction failures; nothing is cached on error
    pub fn get_or_build(&mut self, rows: usize, cols: usize) -> Result<Arc<PatchOperators>> {
        use std::collections::hash_map::Entry;

        match self.operators.entry((rows, cols)) {
            Entry::Occupied(entry) => {
                self.stats.hits += 1;
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                self.stats.misses += 1;
                let operators = Arc::new(PatchOperators::new(rows, cols)?);
                Ok(Arc::clone(entry.insert(operators)))
            }
        }
    }

    /// Number of distinct patch sizes held
    pub fn len(&self) -> usize {
        self.operators.len()
    }

    /// True when nothing has been cached yet
    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }

    /// Drop every cached operator set
    pub fn clear(&mut self) {
        self.operators.clear();
    }
}
