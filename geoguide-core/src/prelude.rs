pub use crate::DEFAULT_ZOOM;

// Coordinates
pub use crate::transform::{
    LocalFrame, TileKey, UtmCoord, geodetic_to_tile, geodetic_to_utm, tile_to_geodetic,
    utm_to_geodetic,
};

// Map model and acquisition
pub use crate::loading::{
    FixtureTileSource, HttpTileSource, LoadReport, LoaderConfig, MemoryTileSource, TileCache,
    TileLoader, TileSource,
};
pub use crate::model::{Edge, EdgeKind, GeoPoint, MapGraph, Node, NodeKind, SharedMap};

// Routes and storage
pub use crate::persistence::{load_map, load_map_into, load_path, save_map, save_path};
pub use crate::routing::{Path, build_path, build_path_shared};

// Vision boundary
pub use crate::recognition::{Detection, Recognition, Recognizer, locate_detections};

pub use crate::Error;
pub use crate::NodeId;
