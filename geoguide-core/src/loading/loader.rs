use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Instant;

use log::{debug, info, warn};
use rayon::{ThreadPool, ThreadPoolBuilder};

use super::merge::MergeOutcome;
use super::{HttpTileSource, LoaderConfig, TileCache, TileSource};
use crate::persistence::document::{EdgeRecord, MapDocument};
use crate::routing::Path;
use crate::transform::MAX_ZOOM;
use crate::{Error, GeoPoint, MapGraph, SharedMap, TileKey};

/// Outcome of one load call. Partial coverage is a valid result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    /// Keys the call tried to cover, sorted
    pub requested: Vec<TileKey>,
    /// Tiles whose document was merged, from the cache or the source
    pub merged: BTreeSet<TileKey>,
    /// Subset of `merged` served from the cache
    pub reused: BTreeSet<TileKey>,
    /// Tiles that could not be obtained, with the last failure reason
    pub failed: BTreeMap<TileKey, String>,
    /// Edges whose endpoints are still absent after every tile was merged
    pub dangling_edges: Vec<EdgeRecord>,
    pub nodes_added: usize,
    pub edges_added: usize,
    pub pois_added: usize,
}

impl LoadReport {
    fn new(requested: Vec<TileKey>) -> Self {
        Self {
            requested,
            ..Self::default()
        }
    }

    /// Every requested tile was merged
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Tiles obtained from the source during this call
    pub fn fetched(&self) -> impl Iterator<Item = &TileKey> {
        self.merged.difference(&self.reused)
    }

    fn record(&mut self, key: TileKey, outcome: MergeOutcome, deferred: &mut Vec<EdgeRecord>) {
        self.merged.insert(key);
        self.nodes_added += outcome.nodes_added;
        self.edges_added += outcome.edges_added;
        self.pois_added += outcome.pois_added;
        deferred.extend(outcome.deferred_edges);
    }
}

type FetchResult = Result<(String, MapDocument), Error>;

/// Acquires the tiles around a position and merges them into a shared map.
///
/// Fetches run on a dedicated pool bounded by
/// [`LoaderConfig::max_concurrent_fetches`]; merging happens on the calling
/// thread, one document at a time, under the map's write lock.
pub struct TileLoader {
    source: Arc<dyn TileSource>,
    cache: Arc<TileCache>,
    config: LoaderConfig,
    pool: ThreadPool,
}

impl TileLoader {
    /// Creates a loader over any tile source.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] if the configuration does not validate or
    /// the worker pool cannot be started.
    pub fn new(source: Arc<dyn TileSource>, config: LoaderConfig) -> Result<Self, Error> {
        config.validate()?;

        let cache = match &config.cache_dir {
            Some(dir) => TileCache::with_dir(dir),
            None => TileCache::new(),
        };
        let pool = ThreadPoolBuilder::new()
            .num_threads(config.max_concurrent_fetches)
            .thread_name(|i| format!("tile-fetch-{i}"))
            .build()
            .map_err(|e| Error::InvalidConfig(format!("tile fetch pool: {e}")))?;

        Ok(Self {
            source,
            cache: Arc::new(cache),
            config,
            pool,
        })
    }

    /// Loader talking to the HTTP service named by `config.url_template`
    pub fn from_config(config: LoaderConfig) -> Result<Self, Error> {
        let source = HttpTileSource::new(&config)?;
        Self::new(Arc::new(source), config)
    }

    /// Shares an existing cache, e.g. between loaders with different sources
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<TileCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<TileCache> {
        &self.cache
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Tile under `center` and its configured neighbourhood
    pub fn tiles_around(&self, center: GeoPoint, zoom: u8) -> Result<Vec<TileKey>, Error> {
        if !center.is_valid_geodetic() {
            return Err(Error::InvalidCoordinate {
                lat: center.lat(),
                lon: center.lon(),
            });
        }
        let key = TileKey::containing(center.lon(), center.lat(), zoom)?;
        Ok(key.neighborhood(self.config.tile_radius))
    }

    /// Loads the tiles around `center` into `map`.
    ///
    /// # Errors
    ///
    /// Only for an unusable center ([`Error::OutOfProjectionRange`],
    /// [`Error::InvalidCoordinate`], [`Error::UnsupportedZoom`]) or a
    /// poisoned lock. Per-tile
    /// failures are listed in [`LoadReport::failed`].
    pub fn load(&self, center: GeoPoint, zoom: u8, map: &SharedMap) -> Result<LoadReport, Error> {
        let keys = self.tiles_around(center, zoom)?;
        info!(
            "Loading {} tiles around ({:.6}, {:.6}) at zoom {zoom}",
            keys.len(),
            center.lat(),
            center.lon()
        );
        self.load_tiles(&keys, map)
    }

    /// Loads around `center` into a fresh map
    pub fn load_map(&self, center: GeoPoint, zoom: u8) -> Result<(SharedMap, LoadReport), Error> {
        let map = SharedMap::new(MapGraph::new());
        let report = self.load(center, zoom, &map)?;
        Ok((map, report))
    }

    /// Loads the neighbourhood of every waypoint of `path`
    pub fn load_along_path(
        &self,
        path: &Path,
        zoom: u8,
        map: &SharedMap,
    ) -> Result<LoadReport, Error> {
        let mut keys = BTreeSet::new();
        for waypoint in path.waypoints() {
            keys.extend(self.tiles_around(*waypoint, zoom)?);
        }
        let keys: Vec<_> = keys.into_iter().collect();
        info!(
            "Loading {} tiles along a path of {} waypoints",
            keys.len(),
            path.len()
        );
        self.load_tiles(&keys, map)
    }

    /// Loads an explicit set of tiles into `map`.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedZoom`] for a key deeper than the tile grid, before
    /// anything is fetched.
    pub fn load_tiles(&self, keys: &[TileKey], map: &SharedMap) -> Result<LoadReport, Error> {
        if let Some(key) = keys.iter().find(|key| key.zoom > MAX_ZOOM) {
            return Err(Error::UnsupportedZoom(key.zoom));
        }
        let started = Instant::now();
        let deadline = self.config.deadline().map(|budget| started + budget);

        let mut requested = keys.to_vec();
        requested.sort_unstable();
        requested.dedup();
        let mut report = LoadReport::new(requested.clone());
        let mut deferred = Vec::new();
        let mut missing = Vec::new();

        for key in requested {
            let Some(payload) = self.cache.get(key)? else {
                missing.push(key);
                continue;
            };
            match MapDocument::parse(&payload) {
                Ok(document) => {
                    let outcome = map.write()?.merge_document(&document);
                    report.reused.insert(key);
                    report.record(key, outcome, &mut deferred);
                }
                Err(e) => {
                    warn!("Cached tile {key} is unreadable, fetching again: {e}");
                    self.cache.remove(key)?;
                    missing.push(key);
                }
            }
        }

        if !missing.is_empty() {
            debug!(
                "{} tiles cached, fetching {} from the source",
                report.reused.len(),
                missing.len()
            );
            self.fetch_and_merge(&missing, deadline, map, &mut report, &mut deferred)?;
        }

        if !deferred.is_empty() {
            let mut graph = map.write()?;
            let (added, dangling) = graph.resolve_deferred(deferred);
            report.edges_added += added;
            report.dangling_edges = dangling;
            // Arrival order of fetches is not deterministic
            report
                .dangling_edges
                .sort_by_key(|edge| (edge.node_a, edge.node_b, edge.kind));
            report.dangling_edges.dedup();
        }

        if report.is_complete() {
            info!(
                "Merged {} tiles (+{} nodes, +{} edges) in {:.2?}",
                report.merged.len(),
                report.nodes_added,
                report.edges_added,
                started.elapsed()
            );
        } else {
            warn!(
                "Merged {} of {} tiles, {} failed",
                report.merged.len(),
                report.requested.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }

    fn fetch_and_merge(
        &self,
        keys: &[TileKey],
        deadline: Option<Instant>,
        map: &SharedMap,
        report: &mut LoadReport,
        deferred: &mut Vec<EdgeRecord>,
    ) -> Result<(), Error> {
        let (tx, rx) = mpsc::channel::<(TileKey, FetchResult)>();
        for &key in keys {
            let tx = tx.clone();
            let source = Arc::clone(&self.source);
            let config = self.config.clone();
            self.pool.spawn(move || {
                let result = fetch_with_retry(source.as_ref(), key, &config, deadline);
                // The receiver is gone once the deadline passed
                let _ = tx.send((key, result));
            });
        }
        drop(tx);

        let mut pending: BTreeSet<TileKey> = keys.iter().copied().collect();
        while !pending.is_empty() {
            let received = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    rx.recv_timeout(remaining).ok()
                }
                None => rx.recv().ok(),
            };
            let Some((key, result)) = received else {
                break;
            };
            pending.remove(&key);

            match result {
                Ok((payload, document)) => {
                    let outcome = map.write()?.merge_document(&document);
                    self.cache.insert(key, &payload)?;
                    report.record(key, outcome, deferred);
                }
                Err(e) => {
                    warn!("Tile {key} failed: {e}");
                    report.failed.insert(key, e.to_string());
                }
            }
        }

        for key in pending {
            report
                .failed
                .insert(key, "deadline exceeded before the tile arrived".to_string());
        }
        Ok(())
    }
}

/// Fetches and parses one tile, retrying with doubling backoff.
///
/// No attempt starts once the deadline has passed, and a retry is skipped
/// when its backoff would end past the deadline.
fn fetch_with_retry(
    source: &dyn TileSource,
    key: TileKey,
    config: &LoaderConfig,
    deadline: Option<Instant>,
) -> FetchResult {
    let mut retry = 0;
    loop {
        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            return Err(Error::TileFetchFailed {
                key,
                reason: "deadline exceeded before the fetch started".to_string(),
            });
        }
        let result = source.fetch(key).and_then(|payload| {
            let document = MapDocument::parse(&payload)?;
            Ok((payload, document))
        });

        let error = match result {
            Ok(fetched) => return Ok(fetched),
            Err(e) if retry >= config.max_retries => return Err(e),
            Err(e) => e,
        };

        retry += 1;
        let backoff = config.backoff_for(retry);
        if let Some(deadline) = deadline
            && Instant::now() + backoff >= deadline
        {
            return Err(error);
        }
        debug!("Tile {key} attempt {retry} failed ({error}), retrying in {backoff:?}");
        thread::sleep(backoff);
    }
}
