use thiserror::Error;

use crate::{NodeId, TileKey};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Latitude {0} is outside the Web-Mercator projection band")]
    OutOfProjectionRange(f64),
    #[error("Invalid UTM zone {0}, expected 1..=60")]
    InvalidZone(i32),
    #[error("Zoom level {0} is above the supported maximum of {max}", max = crate::transform::MAX_ZOOM)]
    UnsupportedZoom(u8),
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),
    #[error("Node {0} is still referenced by {1} edge(s)")]
    NodeInUse(NodeId, usize),
    #[error("Fetching tile {key} failed: {reason}")]
    TileFetchFailed { key: TileKey, reason: String },
    #[error("No route between the requested points")]
    NoRoute,
    #[error("Invalid geodetic coordinate ({lat}, {lon})")]
    InvalidCoordinate { lat: f64, lon: f64 },
    #[error("Malformed document: {0}")]
    MalformedDocument(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Map lock poisoned by a panicking writer")]
    LockPoisoned,
    #[error("Recognition failed: {0}")]
    RecognitionFailed(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedDocument(err.to_string())
    }
}
