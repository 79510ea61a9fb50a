//! Pluggable origins of raw tile payloads

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hashbrown::HashMap;
use log::{debug, trace};
use reqwest::blocking::Client;

use super::LoaderConfig;
use crate::{Error, TileKey};

/// Anything that can hand out the JSON payload of one tile.
///
/// Implementations are shared between pool workers, so they take `&self`.
/// A returned payload is raw text; the loader parses and validates it.
pub trait TileSource: Send + Sync {
    /// Fetches the payload of `key`.
    ///
    /// # Errors
    ///
    /// [`Error::TileFetchFailed`] (or a transport error) when the tile could
    /// not be obtained.
    fn fetch(&self, key: TileKey) -> Result<String, Error>;
}

/// Expands `{z}`, `{x}` and `{y}` in a URL template
pub fn expand_template(template: &str, key: TileKey) -> String {
    template
        .replace("{z}", &key.zoom.to_string())
        .replace("{x}", &key.x.to_string())
        .replace("{y}", &key.y.to_string())
}

/// Remote tile service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpTileSource {
    client: Client,
    url_template: String,
}

impl HttpTileSource {
    /// Builds a client with the configured per-request timeout.
    ///
    /// # Errors
    ///
    /// [`Error::HttpError`] if the TLS backend cannot be initialised.
    pub fn new(config: &LoaderConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .build()?;
        Ok(Self {
            client,
            url_template: config.url_template.clone(),
        })
    }

    pub fn url_for(&self, key: TileKey) -> String {
        expand_template(&self.url_template, key)
    }
}

impl TileSource for HttpTileSource {
    fn fetch(&self, key: TileKey) -> Result<String, Error> {
        let url = self.url_for(key);
        debug!("GET {url}");
        let response = self.client.get(&url).send()?;

        if !response.status().is_success() {
            return Err(Error::TileFetchFailed {
                key,
                reason: format!("HTTP {}", response.status()),
            });
        }
        Ok(response.text()?)
    }
}

/// Offline tiles laid out as `root/{z}/{x}/{y}.json`
#[derive(Debug, Clone)]
pub struct FixtureTileSource {
    root: PathBuf,
}

impl FixtureTileSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Location of a tile under a `{z}/{x}/{y}.json` tree
pub(crate) fn tile_file(root: &Path, key: TileKey) -> PathBuf {
    root.join(key.zoom.to_string())
        .join(key.x.to_string())
        .join(format!("{}.json", key.y))
}

impl TileSource for FixtureTileSource {
    fn fetch(&self, key: TileKey) -> Result<String, Error> {
        let path = tile_file(&self.root, key);
        trace!("Reading fixture tile {}", path.display());
        std::fs::read_to_string(&path).map_err(|e| Error::TileFetchFailed {
            key,
            reason: format!("{}: {e}", path.display()),
        })
    }
}

/// In-memory source, mostly for tests and embedding pre-fetched data
#[derive(Debug, Default)]
pub struct MemoryTileSource {
    tiles: Mutex<HashMap<TileKey, String>>,
}

impl MemoryTileSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tile(self, key: TileKey, payload: impl Into<String>) -> Self {
        self.insert(key, payload);
        self
    }

    pub fn insert(&self, key: TileKey, payload: impl Into<String>) {
        if let Ok(mut tiles) = self.tiles.lock() {
            tiles.insert(key, payload.into());
        }
    }
}

impl TileSource for MemoryTileSource {
    fn fetch(&self, key: TileKey) -> Result<String, Error> {
        let tiles = self.tiles.lock().map_err(|_| Error::LockPoisoned)?;
        tiles.get(&key).cloned().ok_or_else(|| Error::TileFetchFailed {
            key,
            reason: "tile not present".to_string(),
        })
    }
}
