use std::collections::HashSet;
use std::fmt;

use crate::ir::{Direction, Member};

use super::error::LayoutWarning;

/// Identity of a node in the family graph.
///
/// Lookups inside the pipeline always go through this type; the string form
/// from [`fmt::Display`] is only produced for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeId {
    Member(String),
    /// Partnership anchor. The pair is stored sorted, so `Union(a, b)` always
    /// has `a < b`.
    Union(String, String),
    Virtual(usize),
}

impl NodeId {
    pub fn member(id: impl Into<String>) -> Self {
        Self::Member(id.into())
    }

    /// Union id for an unordered partner pair.
    pub fn union(a: &str, b: &str) -> Self {
        if a <= b {
            Self::Union(a.to_string(), b.to_string())
        } else {
            Self::Union(b.to_string(), a.to_string())
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Member(_) => NodeKind::Member,
            Self::Union(..) => NodeKind::Union,
            Self::Virtual(_) => NodeKind::Virtual,
        }
    }

    pub fn is_anchor(&self) -> bool {
        !matches!(self, Self::Member(_))
    }

    pub fn as_member(&self) -> Option<&str> {
        match self {
            Self::Member(id) => Some(id),
            _ => None,
        }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member(id) => f.write_str(id),
            Self::Union(a, b) => write!(f, "union-{a}-{b}"),
            Self::Virtual(seq) => write!(f, "virtual-{seq}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Member,
    Union,
    Virtual,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Union => "union",
            Self::Virtual => "virtual",
        }
    }
}

/// Side of a node box where an edge may attach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Top,
    Bottom,
    Left,
    Right,
}

impl Face {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Face a generation edge enters through.
    pub fn incoming(direction: Direction) -> Self {
        if direction.is_horizontal() {
            Self::Left
        } else {
            Self::Top
        }
    }

    /// Face a generation edge leaves through.
    pub fn outgoing(direction: Direction) -> Self {
        if direction.is_horizontal() {
            Self::Right
        } else {
            Self::Bottom
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleRole {
    Source,
    Target,
}

/// Connection point id understood by the renderer.
///
/// Member cards carry a source and a target handle on every face
/// (`"bottom-source"`, `"left-target"`, ...); anchors carry a single
/// `"<face>-anchor"` handle per face.
pub fn handle_id(node: &NodeId, face: Face, role: HandleRole) -> String {
    if node.is_anchor() {
        return format!("{}-anchor", face.as_str());
    }
    let role = match role {
        HandleRole::Source => "source",
        HandleRole::Target => "target",
    };
    format!("{}-{role}", face.as_str())
}

/// Which flank of its union a partner occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartnerSide {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    PartnerLink,
    ParentChild,
    VirtualLink,
}

impl EdgeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PartnerLink => "partner-link",
            Self::ParentChild => "parent-child",
            Self::VirtualLink => "virtual-link",
        }
    }
}

/// Edge id as a pure function of its endpoints and kind.
pub fn edge_id(source: &NodeId, target: &NodeId, kind: EdgeKind) -> String {
    format!("{}:{source}->{target}", kind.as_str())
}

/// An edge that takes part in rank assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    /// Set on partner links only.
    pub side: Option<PartnerSide>,
}

impl StructuralEdge {
    pub fn new(source: NodeId, target: NodeId, kind: EdgeKind) -> Self {
        Self {
            source,
            target,
            kind,
            side: None,
        }
    }

    pub fn id(&self) -> String {
        edge_id(&self.source, &self.target, self.kind)
    }
}

/// Insertion-ordered edge list that refuses duplicate ids.
#[derive(Debug, Clone, Default)]
pub struct EdgeSet {
    edges: Vec<StructuralEdge>,
    ids: HashSet<String>,
}

impl EdgeSet {
    /// Returns false when an edge with the same id is already present.
    pub fn insert(&mut self, edge: StructuralEdge) -> bool {
        if !self.ids.insert(edge.id()) {
            return false;
        }
        self.edges.push(edge);
        true
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&StructuralEdge) -> bool) {
        let ids = &mut self.ids;
        self.edges.retain(|edge| {
            if keep(edge) {
                true
            } else {
                ids.remove(&edge.id());
                false
            }
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StructuralEdge> {
        self.edges.iter()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

impl<'a> IntoIterator for &'a EdgeSet {
    type Item = &'a StructuralEdge;
    type IntoIter = std::slice::Iter<'a, StructuralEdge>;

    fn into_iter(self) -> Self::IntoIter {
        self.edges.iter()
    }
}

/// A positioned node. `x`/`y` is the center of the node box.
#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub id: NodeId,
    pub member: Option<Member>,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Generation depth; roots are 0.
    pub rank: usize,
    pub target_face: Face,
    pub source_face: Face,
}

impl NodeLayout {
    pub fn kind(&self) -> NodeKind {
        self.id.kind()
    }

    /// Attachment point on one face of the node box.
    pub fn face_point(&self, face: Face) -> (f32, f32) {
        match face {
            Face::Top => (self.x, self.y - self.height / 2.0),
            Face::Bottom => (self.x, self.y + self.height / 2.0),
            Face::Left => (self.x - self.width / 2.0, self.y),
            Face::Right => (self.x + self.width / 2.0, self.y),
        }
    }

    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.y - self.height / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeShape {
    /// Side-to-side partner connector.
    Step,
    /// Generation connector with a single bend band between ranks.
    Elbow,
}

impl EdgeShape {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Elbow => "elbow",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f32,
    pub dasharray: Option<String>,
    pub animated: bool,
}

#[derive(Debug, Clone)]
pub struct EdgeLayout {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
    pub shape: EdgeShape,
    pub style: EdgeStyle,
    pub source_handle: String,
    pub target_handle: String,
    pub points: Vec<(f32, f32)>,
}

/// Result of one build: positioned nodes (sorted by id), renderable edges and
/// the non-fatal problems met on the way.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    pub direction: Direction,
    pub nodes: Vec<NodeLayout>,
    pub edges: Vec<EdgeLayout>,
    pub warnings: Vec<LayoutWarning>,
    pub width: f32,
    pub height: f32,
}

impl TreeLayout {
    pub fn node(&self, id: &NodeId) -> Option<&NodeLayout> {
        self.nodes
            .binary_search_by(|node| node.id.cmp(id))
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    pub fn member(&self, id: &str) -> Option<&NodeLayout> {
        self.node(&NodeId::member(id))
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeLayout> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edges_into<'a>(
        &'a self,
        target: &NodeId,
    ) -> impl Iterator<Item = &'a EdgeLayout> + use<'a> {
        let target = target.clone();
        self.edges.iter().filter(move |edge| edge.target == target)
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &NodeLayout> {
        self.nodes.iter().filter(move |node| node.kind() == kind)
    }
}
