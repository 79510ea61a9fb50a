//! Route construction over the map graph: endpoint snapping, a deterministic
//! shortest-path search and the resulting immutable [`Path`].

mod builder;
mod dijkstra;
mod path;
mod snap;

pub use builder::{build_path, build_path_shared};
pub use path::Path;
