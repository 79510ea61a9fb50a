//! Stored form of a [`Path`]

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::routing::Path;
use crate::{EdgeKind, Error, GeoPoint, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaypointRecord {
    pub lat: f64,
    pub lon: f64,
}

impl From<GeoPoint> for WaypointRecord {
    fn from(point: GeoPoint) -> Self {
        Self {
            lat: point.lat(),
            lon: point.lon(),
        }
    }
}

impl From<WaypointRecord> for GeoPoint {
    fn from(record: WaypointRecord) -> Self {
        GeoPoint::from_lat_lon(record.lat, record.lon)
    }
}

/// Path document. Only `waypoints` is required; the rest is metadata that
/// older writers did not produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDocument {
    pub waypoints: Vec<WaypointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<WaypointRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<WaypointRecord>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<NodeId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub edge_kinds: Vec<EdgeKind>,
}

impl PathDocument {
    /// Snapshot of a path stamped with the current time
    pub fn from_path(path: &Path) -> Self {
        Self {
            waypoints: path.waypoints().iter().copied().map(Into::into).collect(),
            created: Some(Utc::now()),
            start: path.start().map(Into::into),
            goal: path.goal().map(Into::into),
            nodes: path.nodes().to_vec(),
            edge_kinds: path.edge_kinds().to_vec(),
        }
    }

    /// Parses a document. Waypoints are checked strictly, unreadable metadata
    /// is dropped with a warning.
    ///
    /// # Errors
    ///
    /// [`Error::MalformedDocument`] for invalid JSON, a missing or empty
    /// waypoint list or out-of-range waypoint coordinates.
    pub fn parse(text: &str) -> Result<Self, Error> {
        let mut value: Value = serde_json::from_str(text)?;
        let object = value
            .as_object_mut()
            .ok_or_else(|| Error::MalformedDocument("path document is not an object".into()))?;

        let waypoints: Vec<WaypointRecord> = object
            .remove("waypoints")
            .ok_or_else(|| Error::MalformedDocument("missing field `waypoints`".into()))
            .and_then(|raw| serde_json::from_value(raw).map_err(Error::from))?;

        if waypoints.is_empty() {
            return Err(Error::MalformedDocument("path has no waypoints".into()));
        }
        for (i, waypoint) in waypoints.iter().enumerate() {
            if !GeoPoint::from(*waypoint).is_valid_geodetic() {
                return Err(Error::MalformedDocument(format!(
                    "waypoint {i} has invalid coordinates ({}, {})",
                    waypoint.lat, waypoint.lon
                )));
            }
        }

        let mut document = Self {
            waypoints,
            created: metadata(object.remove("created"), "created"),
            start: metadata(object.remove("start"), "start"),
            goal: metadata(object.remove("goal"), "goal"),
            nodes: metadata(object.remove("nodes"), "nodes").unwrap_or_default(),
            edge_kinds: metadata(object.remove("edge_kinds"), "edge_kinds").unwrap_or_default(),
        };

        if !document.edge_kinds.is_empty() && document.edge_kinds.len() + 1 != document.nodes.len()
        {
            warn!(
                "Path stores {} edge kinds for {} nodes, dropping the route details",
                document.edge_kinds.len(),
                document.nodes.len()
            );
            document.nodes.clear();
            document.edge_kinds.clear();
        }

        Ok(document)
    }

    pub fn into_path(self) -> Path {
        Path::new(
            self.waypoints.into_iter().map(Into::into).collect(),
            self.nodes,
            self.edge_kinds,
        )
    }
}

fn metadata<T: DeserializeOwned>(raw: Option<Value>, field: &str) -> Option<T> {
    let raw = raw.filter(|value| !value.is_null())?;
    match serde_json::from_value(raw) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warn!("Ignoring unreadable path metadata `{field}`: {e}");
            None
        }
    }
}
