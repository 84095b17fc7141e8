//! Family graph construction and layout.
//!
//! `compute_layout` runs the whole pipeline on one dataset snapshot:
//!
//! 1. normalize ids and drop malformed relationships,
//! 2. synthesize one union node per partner pair,
//! 3. merge multi-parent fan-in through virtual nodes,
//! 4. reject cyclic ancestry and rank generations,
//! 5. run the layered engine,
//! 6. align partners around their union,
//! 7. materialize renderable edges.
//!
//! Every call starts from scratch; no state survives between builds.

mod edges;
mod engine;
pub mod error;
mod multi_parent;
mod normalize;
mod ranking;
mod spouse;
pub mod types;
mod unions;

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Dataset;
use crate::theme::Theme;

pub use edges::{edge_style, orthogonal_path};
pub use error::{LayoutError, LayoutWarning};
pub use types::{
    EdgeKind, EdgeLayout, EdgeShape, EdgeStyle, Face, HandleRole, NodeId, NodeKind, NodeLayout,
    PartnerSide, TreeLayout, edge_id, handle_id,
};

/// Builds a positioned family graph from one dataset snapshot.
///
/// Fails only on cyclic ancestry; everything else malformed is skipped and
/// reported in [`TreeLayout::warnings`].
pub fn compute_layout(
    dataset: &Dataset,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<TreeLayout, LayoutError> {
    let mut warnings = Vec::new();
    let normalized = normalize::normalize(dataset, &mut warnings);
    let mut graph = unions::synthesize_unions(&normalized.relationships);
    multi_parent::resolve_multi_parents(&mut graph);

    let mut ids: Vec<NodeId> =
        Vec::with_capacity(normalized.members.len() + graph.unions.len() + graph.virtuals.len());
    ids.extend(normalized.members.keys().map(|id| NodeId::member(id.as_str())));
    ids.extend(graph.unions.keys().cloned());
    ids.extend(graph.virtuals.iter().cloned());

    let ranks = ranking::rank_generations(&ids, &graph.edges)?;

    let target_face = Face::incoming(config.direction);
    let source_face = Face::outgoing(config.direction);
    let mut members = normalized.members;
    let mut nodes: BTreeMap<NodeId, NodeLayout> = BTreeMap::new();
    for id in ids {
        let (width, height) = if id.is_anchor() {
            (config.anchor_size, config.anchor_size)
        } else {
            (config.member_width, config.member_height)
        };
        let member = id.as_member().and_then(|key| members.remove(key));
        let rank = ranks.get(&id).copied().unwrap_or(0);
        nodes.insert(
            id.clone(),
            NodeLayout {
                id,
                member,
                x: 0.0,
                y: 0.0,
                width,
                height,
                rank,
                target_face,
                source_face,
            },
        );
    }

    let parked = engine::assign_positions(&mut nodes, &graph.edges, config);
    let clusters = spouse::align_partners(&mut nodes, &graph, config);
    let shifts = spouse::separate_cards(&mut nodes, &clusters, config);
    shift_into_margin(&mut nodes, config.margin);
    let (width, height) = bounds(&nodes, config.margin);

    let rendered_edges = edges::materialize_edges(&graph, &nodes, config.direction, theme);
    debug!(
        nodes = nodes.len(),
        unions = graph.unions.len(),
        virtuals = graph.virtuals.len(),
        edges = rendered_edges.len(),
        parked,
        shifts,
        warnings = warnings.len(),
        "family layout built"
    );

    Ok(TreeLayout {
        direction: config.direction,
        nodes: nodes.into_values().collect(),
        edges: rendered_edges,
        warnings,
        width,
        height,
    })
}

/// Parses a `{ "members": [...], "relationships": [...] }` document and lays
/// it out.
pub fn compute_layout_from_json(
    input: &str,
    theme: &Theme,
    config: &LayoutConfig,
) -> Result<TreeLayout, LayoutError> {
    let dataset = Dataset::from_json(input)?;
    compute_layout(&dataset, theme, config)
}

fn shift_into_margin(nodes: &mut BTreeMap<NodeId, NodeLayout>, margin: f32) {
    let mut min_x = f32::MAX;
    let mut min_y = f32::MAX;
    for node in nodes.values() {
        min_x = min_x.min(node.left());
        min_y = min_y.min(node.top());
    }
    let shift_x = if min_x < margin { margin - min_x } else { 0.0 };
    let shift_y = if min_y < margin { margin - min_y } else { 0.0 };
    if shift_x == 0.0 && shift_y == 0.0 {
        return;
    }
    for node in nodes.values_mut() {
        node.x += shift_x;
        node.y += shift_y;
    }
}

fn bounds(nodes: &BTreeMap<NodeId, NodeLayout>, margin: f32) -> (f32, f32) {
    let mut max_x: f32 = 0.0;
    let mut max_y: f32 = 0.0;
    for node in nodes.values() {
        max_x = max_x.max(node.x + node.width / 2.0);
        max_y = max_y.max(node.y + node.height / 2.0);
    }
    (max_x + margin, max_y + margin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Member, Relationship};

    fn family() -> Dataset {
        Dataset::new(
            vec![
                Member::new(1, "Grandma"),
                Member::new(2, "Grandpa"),
                Member::new(3, "Child"),
                Member::new(4, "In-law"),
                Member::new(5, "Grandchild"),
                Member::new(6, "Hermit"),
            ],
            vec![
                Relationship::partner(2, 1),
                Relationship::parent_child(1, 3),
                Relationship::parent_child(2, 3),
                Relationship::partner(3, 4),
                Relationship::parent_child(3, 5),
                Relationship::parent_child(4, 5),
            ],
        )
    }

    #[test]
    fn builds_unions_and_keeps_isolated_members() {
        let layout =
            compute_layout(&family(), &Theme::modern(), &LayoutConfig::default()).expect("layout");
        assert_eq!(layout.nodes_of_kind(NodeKind::Union).count(), 2);
        assert_eq!(layout.nodes_of_kind(NodeKind::Virtual).count(), 0);
        assert_eq!(layout.nodes_of_kind(NodeKind::Member).count(), 6);
        assert!(layout.member("6").is_some());
        assert!(layout.edge("parent-child:union-1-2->3").is_some());
        assert!(layout.edge("parent-child:union-3-4->5").is_some());
        assert_eq!(layout.edges.len(), 6);
        assert!(layout.warnings.is_empty());
    }

    #[test]
    fn every_node_fits_inside_bounds() {
        let config = LayoutConfig::default();
        let layout = compute_layout(&family(), &Theme::modern(), &config).expect("layout");
        for node in &layout.nodes {
            assert!(node.left() >= config.margin - 0.01, "{} too far left", node.id);
            assert!(node.top() >= config.margin - 0.01, "{} too high", node.id);
            assert!(node.x + node.width / 2.0 <= layout.width);
            assert!(node.y + node.height / 2.0 <= layout.height);
        }
    }

    #[test]
    fn ranks_count_generations_through_anchors() {
        let layout =
            compute_layout(&family(), &Theme::modern(), &LayoutConfig::default()).expect("layout");
        let rank = |id: &str| layout.member(id).map(|node| node.rank);
        assert_eq!(rank("1"), Some(0));
        assert_eq!(rank("3"), Some(2));
        assert_eq!(rank("5"), Some(4));
        assert_eq!(layout.node(&NodeId::union("1", "2")).map(|n| n.rank), Some(1));
    }

    #[test]
    fn empty_dataset_builds_empty_layout() {
        let layout = compute_layout(&Dataset::default(), &Theme::modern(), &LayoutConfig::default())
            .expect("layout");
        assert!(layout.nodes.is_empty());
        assert!(layout.edges.is_empty());
    }

    #[test]
    fn invalid_json_is_reported() {
        let err = compute_layout_from_json("{ nope", &Theme::modern(), &LayoutConfig::default())
            .expect_err("invalid");
        assert!(matches!(err, LayoutError::InvalidDataset(_)));
    }
}
