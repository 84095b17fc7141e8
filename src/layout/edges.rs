use std::collections::BTreeMap;

use crate::ir::Direction;
use crate::theme::Theme;

use super::types::{
    EdgeKind, EdgeLayout, EdgeShape, EdgeStyle, Face, HandleRole, NodeId, NodeLayout, PartnerSide,
    StructuralEdge, handle_id,
};
use super::unions::FamilyGraph;

/// Visual style of an edge kind. Total and pure.
pub fn edge_style(kind: EdgeKind, theme: &Theme) -> EdgeStyle {
    match kind {
        EdgeKind::PartnerLink => EdgeStyle {
            stroke: theme.accent_color.clone(),
            stroke_width: theme.partner_width,
            dasharray: Some(theme.partner_dasharray.clone()),
            animated: true,
        },
        EdgeKind::ParentChild => EdgeStyle {
            stroke: theme.line_color.clone(),
            stroke_width: theme.line_width,
            dasharray: None,
            animated: false,
        },
        EdgeKind::VirtualLink => EdgeStyle {
            stroke: theme.line_color.clone(),
            stroke_width: theme.line_width,
            dasharray: theme.virtual_dasharray.clone(),
            animated: false,
        },
    }
}

/// (partner face, union face) for a partner link.
fn partner_faces(side: PartnerSide, direction: Direction) -> (Face, Face) {
    match (side, direction.is_horizontal()) {
        (PartnerSide::Left, false) => (Face::Right, Face::Left),
        (PartnerSide::Right, false) => (Face::Left, Face::Right),
        (PartnerSide::Left, true) => (Face::Bottom, Face::Top),
        (PartnerSide::Right, true) => (Face::Top, Face::Bottom),
    }
}

/// Orthogonal polyline between two attachment points.
///
/// Vertical faces bend once in the band halfway between the two ranks
/// (down, across, down); horizontal faces do the same along x. Collinear
/// points are dropped.
pub fn orthogonal_path(
    from: (f32, f32),
    from_face: Face,
    to: (f32, f32),
    to_face: Face,
) -> Vec<(f32, f32)> {
    let points = if from_face.is_vertical() && to_face.is_vertical() {
        let mid_y = from.1 + (to.1 - from.1) / 2.0;
        vec![from, (from.0, mid_y), (to.0, mid_y), to]
    } else if !from_face.is_vertical() && !to_face.is_vertical() {
        let mid_x = from.0 + (to.0 - from.0) / 2.0;
        vec![from, (mid_x, from.1), (mid_x, to.1), to]
    } else if from_face.is_vertical() {
        vec![from, (from.0, to.1), to]
    } else {
        vec![from, (to.0, from.1), to]
    };
    simplify(points)
}

fn simplify(points: Vec<(f32, f32)>) -> Vec<(f32, f32)> {
    let mut out: Vec<(f32, f32)> = Vec::with_capacity(points.len());
    for point in points {
        if out.last() == Some(&point) {
            continue;
        }
        if out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            let collinear = (a.0 == b.0 && b.0 == point.0) || (a.1 == b.1 && b.1 == point.1);
            if collinear {
                out.pop();
            }
        }
        out.push(point);
    }
    out
}

fn materialize(
    edge: &StructuralEdge,
    source: &NodeLayout,
    target: &NodeLayout,
    direction: Direction,
    theme: &Theme,
) -> EdgeLayout {
    let (shape, source_face, target_face) = match edge.kind {
        EdgeKind::PartnerLink => {
            let (member_face, union_face) =
                partner_faces(edge.side.unwrap_or(PartnerSide::Left), direction);
            (EdgeShape::Step, member_face, union_face)
        }
        EdgeKind::ParentChild | EdgeKind::VirtualLink => (
            EdgeShape::Elbow,
            Face::outgoing(direction),
            Face::incoming(direction),
        ),
    };
    let points = orthogonal_path(
        source.face_point(source_face),
        source_face,
        target.face_point(target_face),
        target_face,
    );
    EdgeLayout {
        id: edge.id(),
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge.kind,
        shape,
        style: edge_style(edge.kind, theme),
        source_handle: handle_id(&edge.source, source_face, HandleRole::Source),
        target_handle: handle_id(&edge.target, target_face, HandleRole::Target),
        points,
    }
}

/// Turns the final structural edges into renderable edges, sorted by id.
pub(crate) fn materialize_edges(
    graph: &FamilyGraph,
    nodes: &BTreeMap<NodeId, NodeLayout>,
    direction: Direction,
    theme: &Theme,
) -> Vec<EdgeLayout> {
    let mut edges: Vec<EdgeLayout> = graph
        .edges
        .iter()
        .filter_map(|edge| {
            let source = nodes.get(&edge.source)?;
            let target = nodes.get(&edge.target)?;
            Some(materialize(edge, source, target, direction, theme))
        })
        .collect();
    edges.sort_by(|a, b| a.id.cmp(&b.id));
    edges
}
