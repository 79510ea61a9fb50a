//! Single-writer / multi-reader handle around a [`MapGraph`]

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::MapGraph;
use crate::Error;

/// Shared ownership of one map graph.
///
/// Readers (path queries, POI lookups) take the read lock and may run in
/// parallel. Only the tile loader and the persistence codec take the write
/// lock, so a merge or load never interleaves with a query.
#[derive(Debug, Clone, Default)]
pub struct SharedMap {
    inner: Arc<RwLock<MapGraph>>,
}

impl SharedMap {
    pub fn new(graph: MapGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Immutable view of the graph, blocks while a writer holds the lock
    pub fn read(&self) -> Result<RwLockReadGuard<'_, MapGraph>, Error> {
        self.inner.read().map_err(|_| Error::LockPoisoned)
    }

    pub(crate) fn write(&self) -> Result<RwLockWriteGuard<'_, MapGraph>, Error> {
        self.inner.write().map_err(|_| Error::LockPoisoned)
    }

    /// Swaps in a fully built graph in one step
    pub(crate) fn replace(&self, graph: MapGraph) -> Result<MapGraph, Error> {
        let mut guard = self.write()?;
        Ok(std::mem::replace(&mut *guard, graph))
    }

    /// Owned copy of the current graph
    pub fn snapshot(&self) -> Result<MapGraph, Error> {
        Ok(self.read()?.clone())
    }
}

impl From<MapGraph> for SharedMap {
    fn from(graph: MapGraph) -> Self {
        Self::new(graph)
    }
}
