//! JSON storage of maps and paths.
//!
//! Reading is all-or-nothing: a document that fails validation never leaves
//! a partially populated graph behind. Files are written to a sibling
//! temporary file first and moved into place.

pub mod document;
pub mod path_doc;

use std::fs;
use std::path::Path as FsPath;

use log::{debug, info};

pub use document::{EdgeRecord, MapDocument, NodeRecord, PoiRecord};
pub use path_doc::{PathDocument, WaypointRecord};

use crate::routing::Path;
use crate::{Error, MapGraph, SharedMap};

/// Parses a map document into a new graph
pub fn map_from_str(text: &str) -> Result<MapGraph, Error> {
    MapDocument::parse(text)?.into_graph()
}

/// Pretty-printed map document, records in id order
pub fn map_to_string(graph: &MapGraph) -> Result<String, Error> {
    Ok(serde_json::to_string_pretty(&MapDocument::from_graph(graph))?)
}

/// Reads a map file.
///
/// # Errors
///
/// [`Error::IoError`] if the file cannot be read, [`Error::MalformedDocument`]
/// if its content does not validate.
pub fn load_map(source: impl AsRef<FsPath>) -> Result<MapGraph, Error> {
    let source = source.as_ref();
    let graph = map_from_str(&fs::read_to_string(source)?)?;
    info!(
        "Loaded map {} ({} nodes, {} edges, {} POIs)",
        source.display(),
        graph.node_count(),
        graph.edge_count(),
        graph.poi_count()
    );
    Ok(graph)
}

pub fn save_map(graph: &MapGraph, destination: impl AsRef<FsPath>) -> Result<(), Error> {
    let destination = destination.as_ref();
    write_atomically(destination, &map_to_string(graph)?)?;
    info!("Saved map to {}", destination.display());
    Ok(())
}

/// Replaces the contents of `map` with the file's graph. On any error the
/// shared map is left untouched.
pub fn load_map_into(source: impl AsRef<FsPath>, map: &SharedMap) -> Result<(), Error> {
    let graph = load_map(source)?;
    map.replace(graph)?;
    Ok(())
}

pub fn path_from_str(text: &str) -> Result<Path, Error> {
    Ok(PathDocument::parse(text)?.into_path())
}

/// Pretty-printed path document stamped with the current time
pub fn path_to_string(path: &Path) -> Result<String, Error> {
    if path.is_empty() {
        return Err(Error::MalformedDocument("path has no waypoints".into()));
    }
    Ok(serde_json::to_string_pretty(&PathDocument::from_path(path))?)
}

pub fn load_path(source: impl AsRef<FsPath>) -> Result<Path, Error> {
    let source = source.as_ref();
    let path = path_from_str(&fs::read_to_string(source)?)?;
    debug!("Loaded path of {} waypoints from {}", path.len(), source.display());
    Ok(path)
}

pub fn save_path(path: &Path, destination: impl AsRef<FsPath>) -> Result<(), Error> {
    let destination = destination.as_ref();
    write_atomically(destination, &path_to_string(path)?)?;
    debug!("Saved path of {} waypoints to {}", path.len(), destination.display());
    Ok(())
}

fn write_atomically(destination: &FsPath, contents: &str) -> Result<(), Error> {
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut staging = destination.as_os_str().to_owned();
    staging.push(".tmp");
    fs::write(&staging, contents)?;
    fs::rename(&staging, destination)?;
    Ok(())
}
