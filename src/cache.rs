//! Copper-paths cache: memoises per-layer polygon-generator output.
//!
//! Heavy polygon generation (flattening every copper object on a layer into
//! a `PolygonSet`) is shared across the multiple check passes that need it,
//! keyed by `(layer, set of net signals, ignore-planes flag)`. The cache is
//! populated lazily on first request in a run and is owned exclusively by
//! the `DrcCoordinator` for the run's duration — single-threaded, no
//! locking needed (spec.md §5).

use std::collections::HashMap;

use uuid::Uuid;

use crate::polygon::PolygonSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    layer: String,
    nets: Vec<Uuid>,
    ignore_planes: bool,
}

impl CacheKey {
    pub fn new(layer: impl Into<String>, nets: impl IntoIterator<Item = Uuid>, ignore_planes: bool) -> Self {
        let mut nets: Vec<Uuid> = nets.into_iter().collect();
        nets.sort();
        nets.dedup();
        Self { layer: layer.into(), nets, ignore_planes }
    }
}

#[derive(Debug, Default)]
pub struct CopperPathsCache {
    entries: HashMap<CacheKey, PolygonSet>,
}

impl CopperPathsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached polygon set for `key`, computing and storing it
    /// via `build` on first request.
    pub fn get_or_build(&mut self, key: CacheKey, build: impl FnOnce() -> PolygonSet) -> &PolygonSet {
        self.entries.entry(key).or_insert_with(build)
    }

    /// Returns the cached polygon set for `key` if present, without
    /// building it. Lets a fallible rebuild check the cache first and only
    /// populate it on success, so a failure is never cached.
    pub fn get(&self, key: &CacheKey) -> Option<&PolygonSet> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears every entry. Called at the end of a run; the cache is not
    /// intended to outlive a single DRC invocation.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
