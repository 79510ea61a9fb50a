//! Map graph components - nodes, edges and their kinds

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{GeoPoint, NodeId};

/// Role of a node in the pedestrian network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "KindRepr")]
pub enum NodeKind {
    #[default]
    Basic,
    Crossing,
    Door,
    Elevator,
}

/// Surface an edge runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "KindRepr")]
pub enum EdgeKind {
    #[default]
    Sidewalk,
    Street,
    Crosswalk,
}

/// Kinds arrive either as names or as the numeric codes used by older
/// map services (`0` = basic / sidewalk, ...).
#[derive(Deserialize)]
#[serde(untagged)]
enum KindRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<KindRepr> for NodeKind {
    type Error = String;

    fn try_from(repr: KindRepr) -> Result<Self, Self::Error> {
        match repr {
            KindRepr::Code(0) => Ok(NodeKind::Basic),
            KindRepr::Code(1) => Ok(NodeKind::Crossing),
            KindRepr::Code(2) => Ok(NodeKind::Door),
            KindRepr::Code(3) => Ok(NodeKind::Elevator),
            KindRepr::Code(code) => Err(format!("unknown node kind code {code}")),
            KindRepr::Name(name) => match name.as_str() {
                "basic" => Ok(NodeKind::Basic),
                "crossing" => Ok(NodeKind::Crossing),
                "door" => Ok(NodeKind::Door),
                "elevator" => Ok(NodeKind::Elevator),
                _ => Err(format!("unknown node kind '{name}'")),
            },
        }
    }
}

impl TryFrom<KindRepr> for EdgeKind {
    type Error = String;

    fn try_from(repr: KindRepr) -> Result<Self, Self::Error> {
        match repr {
            KindRepr::Code(0) => Ok(EdgeKind::Sidewalk),
            KindRepr::Code(1) => Ok(EdgeKind::Street),
            KindRepr::Code(2) => Ok(EdgeKind::Crosswalk),
            KindRepr::Code(code) => Err(format!("unknown edge kind code {code}")),
            KindRepr::Name(name) => match name.as_str() {
                "sidewalk" => Ok(EdgeKind::Sidewalk),
                "street" => Ok(EdgeKind::Street),
                "crosswalk" => Ok(EdgeKind::Crosswalk),
                _ => Err(format!("unknown edge kind '{name}'")),
            },
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EdgeKind::Sidewalk => "sidewalk",
            EdgeKind::Street => "street",
            EdgeKind::Crosswalk => "crosswalk",
        })
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Basic => "basic",
            NodeKind::Crossing => "crossing",
            NodeKind::Door => "door",
            NodeKind::Elevator => "elevator",
        })
    }
}

/// Map graph node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: NodeId,
    /// Geodetic location
    pub location: GeoPoint,
    pub kind: NodeKind,
}

impl Node {
    pub fn new(id: NodeId, location: GeoPoint, kind: NodeKind) -> Self {
        Self { id, location, kind }
    }
}

/// Undirected map graph edge.
///
/// Endpoints are stored in ascending id order so that `(a, b)` and `(b, a)`
/// compare equal. The edge length is derived from the endpoint locations by
/// the owning graph and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    a: NodeId,
    b: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(a: NodeId, b: NodeId, kind: EdgeKind) -> Self {
        Self {
            a: a.min(b),
            b: a.max(b),
            kind,
        }
    }

    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    pub fn touches(&self, node: NodeId) -> bool {
        self.a == node || self.b == node
    }

    /// Endpoint opposite to `node`, `None` if the edge does not touch it
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}
