use std::collections::{BTreeMap, HashSet};

use dagre_rust::{
    GraphConfig as DagreConfig, GraphEdge as DagreEdge, GraphNode as DagreNode,
    layout as dagre_layout,
};
use graphlib_rust::{Graph as DagreGraph, GraphOption};
use tracing::debug;

use crate::config::LayoutConfig;
use crate::ir::Direction;

use super::types::{EdgeSet, NodeId, NodeLayout};

fn dagre_rankdir(direction: Direction) -> &'static str {
    match direction {
        Direction::TopBottom => "tb",
        Direction::LeftRight => "lr",
    }
}

/// Runs the layered layout over every node and structural edge.
///
/// A new dagre graph is built on each call; nothing outlives it. Node
/// centers are written back into `nodes`. Returns the number of nodes the
/// engine did not place, which are then parked on a spare rank.
pub(crate) fn assign_positions(
    nodes: &mut BTreeMap<NodeId, NodeLayout>,
    edges: &EdgeSet,
    config: &LayoutConfig,
) -> usize {
    if nodes.is_empty() {
        return 0;
    }

    let mut dagre_graph: DagreGraph<DagreConfig, DagreNode, DagreEdge> =
        DagreGraph::new(Some(GraphOption {
            directed: Some(true),
            multigraph: Some(false),
            compound: Some(false),
        }));

    let mut graph_config = DagreConfig::default();
    graph_config.rankdir = Some(dagre_rankdir(config.direction).to_string());
    graph_config.nodesep = Some(config.node_spacing);
    graph_config.ranksep = Some(config.rank_spacing);
    graph_config.marginx = Some(config.margin);
    graph_config.marginy = Some(config.margin);
    dagre_graph.set_graph(graph_config);

    // Keys are the rendered ids; the typed ids stay the source of truth.
    let keys: BTreeMap<NodeId, String> = nodes.keys().map(|id| (id.clone(), id.to_string())).collect();
    // dagre_rust only terminates when every node is inserted after its
    // ancestors, so nodes go in by generation rank, then id.
    let mut order: Vec<&NodeLayout> = nodes.values().collect();
    order.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
    for layout in order {
        let mut node = DagreNode::default();
        node.width = layout.width;
        node.height = layout.height;
        dagre_graph.set_node(keys[&layout.id].clone(), Some(node));
    }

    let mut edge_set: HashSet<(String, String)> = HashSet::new();
    for edge in edges {
        let (Some(from), Some(to)) = (keys.get(&edge.source), keys.get(&edge.target)) else {
            continue;
        };
        if !edge_set.insert((from.clone(), to.clone())) {
            continue;
        }
        let edge_label = DagreEdge::default();
        let _ = dagre_graph.set_edge(from, to, Some(edge_label), None);
    }

    dagre_layout::run_layout(&mut dagre_graph);

    let mut unplaced: Vec<NodeId> = Vec::new();
    for (id, layout) in nodes.iter_mut() {
        match dagre_graph.node(&keys[id]) {
            Some(dagre_node) if dagre_node.x.is_finite() && dagre_node.y.is_finite() => {
                layout.x = dagre_node.x;
                layout.y = dagre_node.y;
            }
            _ => unplaced.push(id.clone()),
        }
    }

    if !unplaced.is_empty() {
        debug!(count = unplaced.len(), "parking nodes the engine left unplaced");
        park_on_spare_rank(nodes, &unplaced, config);
    }
    unplaced.len()
}

/// Lines `ids` up side by side one rank past everything already placed.
fn park_on_spare_rank(
    nodes: &mut BTreeMap<NodeId, NodeLayout>,
    ids: &[NodeId],
    config: &LayoutConfig,
) {
    let parked: HashSet<&NodeId> = ids.iter().collect();
    let horizontal = config.direction.is_horizontal();
    let rank_extent = |node: &NodeLayout| {
        if horizontal {
            node.x + node.width / 2.0
        } else {
            node.y + node.height / 2.0
        }
    };
    let last_rank = nodes
        .values()
        .filter(|node| !parked.contains(&node.id))
        .map(rank_extent)
        .fold(config.margin, f32::max);

    let mut cursor = config.margin;
    for id in ids {
        let Some(node) = nodes.get_mut(id) else {
            continue;
        };
        if horizontal {
            node.x = last_rank + config.rank_spacing + node.width / 2.0;
            node.y = cursor + node.height / 2.0;
            cursor += node.height + config.node_spacing;
        } else {
            node.x = cursor + node.width / 2.0;
            node.y = last_rank + config.rank_spacing + node.height / 2.0;
            cursor += node.width + config.node_spacing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::types::{EdgeKind, Face, StructuralEdge};

    fn node(id: NodeId, width: f32, height: f32) -> NodeLayout {
        NodeLayout {
            id,
            member: None,
            x: 0.0,
            y: 0.0,
            width,
            height,
            rank: 0,
            target_face: Face::Top,
            source_face: Face::Bottom,
        }
    }

    #[test]
    fn child_sorting_before_its_parents_is_laid_out() {
        let config = LayoutConfig::default();
        let union = NodeId::union("b", "c");
        let mut nodes = BTreeMap::new();
        for (id, rank, size) in [
            (NodeId::member("a"), 2, 100.0),
            (NodeId::member("b"), 0, 100.0),
            (NodeId::member("c"), 0, 100.0),
            (union.clone(), 1, 1.0),
        ] {
            let mut layout = node(id.clone(), size, size);
            layout.rank = rank;
            nodes.insert(id, layout);
        }
        let mut edges = EdgeSet::default();
        for partner in ["b", "c"] {
            edges.insert(StructuralEdge::new(
                NodeId::member(partner),
                union.clone(),
                EdgeKind::PartnerLink,
            ));
        }
        edges.insert(StructuralEdge::new(
            union.clone(),
            NodeId::member("a"),
            EdgeKind::ParentChild,
        ));

        assert_eq!(assign_positions(&mut nodes, &edges, &config), 0);

        let (a, b, anchor) = (
            &nodes[&NodeId::member("a")],
            &nodes[&NodeId::member("b")],
            &nodes[&union],
        );
        assert!(b.y < anchor.y && anchor.y < a.y);
    }

    #[test]
    fn left_to_right_advances_along_x() {
        let config = LayoutConfig::default().with_direction(Direction::LeftRight);
        let mut nodes = BTreeMap::new();
        let mut parent = node(NodeId::member("p"), 100.0, 50.0);
        parent.rank = 0;
        let mut child = node(NodeId::member("k"), 100.0, 50.0);
        child.rank = 1;
        nodes.insert(parent.id.clone(), parent);
        nodes.insert(child.id.clone(), child);
        let mut edges = EdgeSet::default();
        edges.insert(StructuralEdge::new(
            NodeId::member("p"),
            NodeId::member("k"),
            EdgeKind::ParentChild,
        ));

        assign_positions(&mut nodes, &edges, &config);

        let p = &nodes[&NodeId::member("p")];
        let k = &nodes[&NodeId::member("k")];
        assert!(k.x > p.x, "child at x={} not right of parent at x={}", k.x, p.x);
        assert!((k.y - p.y).abs() < 0.5);
    }

    #[test]
    fn parked_nodes_sit_below_everything() {
        let config = LayoutConfig::default();
        let mut nodes = BTreeMap::new();
        let mut placed = node(NodeId::member("a"), 100.0, 50.0);
        placed.x = 300.0;
        placed.y = 400.0;
        nodes.insert(placed.id.clone(), placed);
        nodes.insert(NodeId::member("b"), node(NodeId::member("b"), 100.0, 50.0));
        nodes.insert(NodeId::member("c"), node(NodeId::member("c"), 100.0, 50.0));

        park_on_spare_rank(&mut nodes, &[NodeId::member("b"), NodeId::member("c")], &config);

        let b = &nodes[&NodeId::member("b")];
        let c = &nodes[&NodeId::member("c")];
        assert!(b.top() > 425.0);
        assert_eq!(b.y, c.y);
        assert!(c.left() >= b.left() + b.width);
    }
}
