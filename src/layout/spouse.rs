//! Partner placement on top of the engine layout.
//!
//! The engine ranks both partners above their union but is free to put them
//! anywhere along the rank. This pass pins each pair to one rank coordinate
//! and places them symmetrically around the union anchor, smaller id first.
//! Anchors never move.

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::debug;

use crate::config::LayoutConfig;

use super::types::{NodeId, NodeLayout};
use super::unions::FamilyGraph;

#[derive(Debug, Clone, Copy)]
struct Axes {
    horizontal: bool,
}

impl Axes {
    /// Coordinate along which generations advance.
    fn rank(self, node: &NodeLayout) -> f32 {
        if self.horizontal { node.x } else { node.y }
    }

    fn set_rank(self, node: &mut NodeLayout, value: f32) {
        if self.horizontal {
            node.x = value;
        } else {
            node.y = value;
        }
    }

    fn cross(self, node: &NodeLayout) -> f32 {
        if self.horizontal { node.y } else { node.x }
    }

    fn set_cross(self, node: &mut NodeLayout, value: f32) {
        if self.horizontal {
            node.y = value;
        } else {
            node.x = value;
        }
    }

    fn cross_extent(self, node: &NodeLayout) -> f32 {
        if self.horizontal {
            node.height
        } else {
            node.width
        }
    }
}

struct Neighbours<'a> {
    predecessors: HashMap<&'a NodeId, Vec<&'a NodeId>>,
    successors: HashMap<&'a NodeId, Vec<&'a NodeId>>,
}

impl<'a> Neighbours<'a> {
    fn new(graph: &'a FamilyGraph) -> Self {
        let mut predecessors: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        let mut successors: HashMap<&NodeId, Vec<&NodeId>> = HashMap::new();
        for edge in &graph.edges {
            successors.entry(&edge.source).or_default().push(&edge.target);
            predecessors.entry(&edge.target).or_default().push(&edge.source);
        }
        Self {
            predecessors,
            successors,
        }
    }

    /// True when `member` can sit at rank coordinate `target` with every
    /// predecessor strictly before it and every successor strictly after.
    fn allows(
        &self,
        nodes: &BTreeMap<NodeId, NodeLayout>,
        axes: Axes,
        member: &NodeId,
        target: f32,
    ) -> bool {
        let rank_of = |id: &&NodeId| nodes.get(*id).map(|node| axes.rank(node));
        let before = self
            .predecessors
            .get(member)
            .into_iter()
            .flatten()
            .filter_map(rank_of)
            .all(|rank| rank < target);
        let after = self
            .successors
            .get(member)
            .into_iter()
            .flatten()
            .filter_map(rank_of)
            .all(|rank| rank > target);
        before && after
    }
}

/// A union anchor and the partners it placed. Clusters move as one unit
/// when cards are separated, so partners stay symmetric around the anchor.
pub(crate) type Cluster = Vec<NodeId>;

/// Places every partner pair around its union node.
///
/// Unions are processed in id order. A member that belongs to several unions
/// is placed by the first one; later unions only move their other partner.
pub(crate) fn align_partners(
    nodes: &mut BTreeMap<NodeId, NodeLayout>,
    graph: &FamilyGraph,
    config: &LayoutConfig,
) -> Vec<Cluster> {
    let axes = Axes {
        horizontal: config.direction.is_horizontal(),
    };
    let neighbours = Neighbours::new(graph);
    let mut placed: HashSet<NodeId> = HashSet::new();
    let mut clusters = Vec::with_capacity(graph.unions.len());

    for (union_id, partners) in &graph.unions {
        let Some(union_cross) = nodes.get(union_id).map(|node| axes.cross(node)) else {
            continue;
        };
        let left = NodeId::member(partners.left.as_str());
        let right = NodeId::member(partners.right.as_str());
        let (Some(left_node), Some(right_node)) = (nodes.get(&left), nodes.get(&right)) else {
            continue;
        };

        let mut cluster: Cluster = vec![union_id.clone()];
        let target_rank = match (placed.contains(&left), placed.contains(&right)) {
            (true, true) => continue,
            (true, false) => axes.rank(left_node),
            (false, true) => axes.rank(right_node),
            (false, false) => axes.rank(left_node).max(axes.rank(right_node)),
        };

        for (member, sign) in [(left, -1.0f32), (right, 1.0f32)] {
            if placed.contains(&member) {
                continue;
            }
            let move_rank = neighbours.allows(nodes, axes, &member, target_rank);
            if !move_rank {
                debug!(member = %member, union = %union_id, "keeping engine rank for partner");
            }
            let Some(node) = nodes.get_mut(&member) else {
                continue;
            };
            let half_span = axes.cross_extent(node) / 2.0 + config.partner_spacing / 2.0;
            axes.set_cross(node, union_cross + sign * half_span);
            if move_rank {
                axes.set_rank(node, target_rank);
            }
            cluster.push(member.clone());
            placed.insert(member);
        }
        clusters.push(cluster);
    }
    clusters
}

/// Pushes member cards apart along their row.
///
/// Alignment moves partners off the slots the engine reserved, so a spouse
/// can land on a sibling. Each sweep sorts every row along the cross axis and
/// moves the first card that sits closer than `node_spacing` to its
/// predecessor, together with its cluster, away from it. Cards of one cluster
/// never push each other. Returns the number of shifts applied.
pub(crate) fn separate_cards(
    nodes: &mut BTreeMap<NodeId, NodeLayout>,
    clusters: &[Cluster],
    config: &LayoutConfig,
) -> usize {
    let axes = Axes {
        horizontal: config.direction.is_horizontal(),
    };
    let mut cluster_of: HashMap<NodeId, usize> = HashMap::new();
    for (index, cluster) in clusters.iter().enumerate() {
        for id in cluster {
            cluster_of.insert(id.clone(), index);
        }
    }

    let cards = nodes.values().filter(|node| !node.id.is_anchor()).count();
    let limit = cards * 8 + 8;
    for shifts in 0..limit {
        let Some((id, delta)) = first_collision(nodes, &cluster_of, axes, config.node_spacing)
        else {
            return shifts;
        };
        let single = [id];
        let moving: &[NodeId] = match cluster_of.get(&single[0]) {
            Some(&index) => &clusters[index],
            None => &single,
        };
        for member in moving {
            if let Some(node) = nodes.get_mut(member) {
                let cross = axes.cross(node);
                axes.set_cross(node, cross + delta);
            }
        }
    }
    debug!(limit, "card collisions remain after the separation limit");
    limit
}

/// First card, in row order, that crowds its predecessor, with the distance
/// it has to move.
fn first_collision(
    nodes: &BTreeMap<NodeId, NodeLayout>,
    cluster_of: &HashMap<NodeId, usize>,
    axes: Axes,
    spacing: f32,
) -> Option<(NodeId, f32)> {
    let mut rows: BTreeMap<i64, Vec<&NodeLayout>> = BTreeMap::new();
    for node in nodes.values().filter(|node| !node.id.is_anchor()) {
        let row = (axes.rank(node) * 100.0).round() as i64;
        rows.entry(row).or_default().push(node);
    }
    for row in rows.values_mut() {
        row.sort_by(|a, b| {
            axes.cross(a)
                .total_cmp(&axes.cross(b))
                .then_with(|| a.id.cmp(&b.id))
        });
        for pair in row.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if let (Some(a), Some(b)) = (cluster_of.get(&prev.id), cluster_of.get(&next.id)) {
                if a == b {
                    continue;
                }
            }
            let needed = axes.cross(prev)
                + axes.cross_extent(prev) / 2.0
                + spacing
                + axes.cross_extent(next) / 2.0;
            let delta = needed - axes.cross(next);
            if delta > 0.5 {
                return Some((next.id.clone(), delta));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Direction;
    use crate::layout::types::{EdgeKind, Face, PartnerSide, StructuralEdge};
    use crate::layout::unions::Partners;

    fn node(id: NodeId, x: f32, y: f32, size: f32) -> NodeLayout {
        NodeLayout {
            id,
            member: None,
            x,
            y,
            width: size,
            height: size,
            rank: 0,
            target_face: Face::Top,
            source_face: Face::Bottom,
        }
    }

    fn pair_graph(a: &str, b: &str) -> FamilyGraph {
        let mut graph = FamilyGraph::default();
        let union = NodeId::union(a, b);
        graph.unions.insert(
            union.clone(),
            Partners {
                left: a.to_string(),
                right: b.to_string(),
            },
        );
        for (member, side) in [(a, PartnerSide::Left), (b, PartnerSide::Right)] {
            graph.edges.insert(StructuralEdge {
                source: NodeId::member(member),
                target: union.clone(),
                kind: EdgeKind::PartnerLink,
                side: Some(side),
            });
        }
        graph
    }

    #[test]
    fn partners_flank_union_symmetrically() {
        let config = LayoutConfig::default();
        let graph = pair_graph("a", "b");
        let mut nodes = BTreeMap::new();
        // Engine placed them the wrong way round and on different rows.
        nodes.insert(NodeId::member("a"), node(NodeId::member("a"), 900.0, 90.0, 100.0));
        nodes.insert(NodeId::member("b"), node(NodeId::member("b"), 100.0, 100.0, 100.0));
        nodes.insert(NodeId::union("a", "b"), node(NodeId::union("a", "b"), 500.0, 300.0, 1.0));

        align_partners(&mut nodes, &graph, &config);

        let a = &nodes[&NodeId::member("a")];
        let b = &nodes[&NodeId::member("b")];
        let union = &nodes[&NodeId::union("a", "b")];
        assert_eq!(a.x, 500.0 - 50.0 - 24.0);
        assert_eq!(b.x, 500.0 + 50.0 + 24.0);
        assert_eq!(a.y, 100.0);
        assert_eq!(b.y, 100.0);
        assert_eq!((union.x, union.y), (500.0, 300.0));
    }

    #[test]
    fn left_to_right_swaps_axes() {
        let config = LayoutConfig::default().with_direction(Direction::LeftRight);
        let graph = pair_graph("a", "b");
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::member("a"), node(NodeId::member("a"), 80.0, 700.0, 100.0));
        nodes.insert(NodeId::member("b"), node(NodeId::member("b"), 100.0, 10.0, 100.0));
        nodes.insert(NodeId::union("a", "b"), node(NodeId::union("a", "b"), 400.0, 300.0, 1.0));

        align_partners(&mut nodes, &graph, &config);

        let a = &nodes[&NodeId::member("a")];
        let b = &nodes[&NodeId::member("b")];
        assert_eq!(a.x, 100.0);
        assert_eq!(b.x, 100.0);
        assert!(a.y < 300.0 && 300.0 < b.y);
    }

    #[test]
    fn rank_move_that_would_flatten_a_child_edge_is_skipped() {
        let config = LayoutConfig::default();
        let mut graph = pair_graph("a", "b");
        // `a` also has a lone child sitting on b's row.
        graph.edges.insert(StructuralEdge::new(
            NodeId::member("a"),
            NodeId::member("k"),
            EdgeKind::ParentChild,
        ));
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::member("a"), node(NodeId::member("a"), 0.0, 0.0, 100.0));
        nodes.insert(NodeId::member("b"), node(NodeId::member("b"), 0.0, 300.0, 100.0));
        nodes.insert(NodeId::member("k"), node(NodeId::member("k"), 0.0, 300.0, 100.0));
        nodes.insert(NodeId::union("a", "b"), node(NodeId::union("a", "b"), 200.0, 600.0, 1.0));

        align_partners(&mut nodes, &graph, &config);

        assert_eq!(nodes[&NodeId::member("a")].y, 0.0);
        assert_eq!(nodes[&NodeId::member("b")].y, 300.0);
        assert!(nodes[&NodeId::member("a")].x < 200.0);
        assert!(nodes[&NodeId::member("b")].x > 200.0);
    }

    #[test]
    fn married_sibling_does_not_cover_its_neighbours() {
        let config = LayoutConfig::default();
        let union = NodeId::union("s2", "w");
        let clusters = vec![vec![union.clone(), NodeId::member("s2"), NodeId::member("w")]];
        let mut nodes = BTreeMap::new();
        for (id, x) in [("s1", 356.0), ("s2", 712.0), ("s3", 864.0), ("w", 1016.0)] {
            nodes.insert(NodeId::member(id), node(NodeId::member(id), x, 635.0, 256.0));
        }
        nodes.insert(union.clone(), node(union.clone(), 864.0, 900.0, 1.0));

        let shifts = separate_cards(&mut nodes, &clusters, &config);

        assert!(shifts > 0);
        let mut row: Vec<&NodeLayout> = nodes.values().filter(|n| !n.id.is_anchor()).collect();
        row.sort_by(|a, b| a.x.total_cmp(&b.x));
        for pair in row.windows(2) {
            assert!(
                pair[0].x + pair[0].width / 2.0 <= pair[1].left(),
                "{} overlaps {}",
                pair[0].id,
                pair[1].id
            );
        }
        let s2 = &nodes[&NodeId::member("s2")];
        let w = &nodes[&NodeId::member("w")];
        let anchor = &nodes[&union];
        assert_eq!(anchor.x - s2.x, w.x - anchor.x);
        assert_eq!(nodes[&NodeId::member("s1")].x, 356.0);
    }

    #[test]
    fn first_union_places_a_remarried_member() {
        let config = LayoutConfig::default();
        let mut graph = pair_graph("m", "p");
        let second = pair_graph("m", "q");
        for (id, partners) in second.unions {
            graph.unions.insert(id, partners);
        }
        for edge in &second.edges {
            graph.edges.insert(edge.clone());
        }
        let mut nodes = BTreeMap::new();
        for (id, x) in [("m", 400.0), ("p", 100.0), ("q", 900.0)] {
            nodes.insert(NodeId::member(id), node(NodeId::member(id), x, 0.0, 100.0));
        }
        let first = NodeId::union("m", "p");
        let later = NodeId::union("m", "q");
        nodes.insert(first.clone(), node(first.clone(), 250.0, 200.0, 1.0));
        nodes.insert(later.clone(), node(later.clone(), 650.0, 200.0, 1.0));

        let clusters = align_partners(&mut nodes, &graph, &config);

        assert_eq!(
            clusters,
            vec![
                vec![first.clone(), NodeId::member("m"), NodeId::member("p")],
                vec![later.clone(), NodeId::member("q")],
            ]
        );
        assert_eq!(nodes[&NodeId::member("m")].x, 250.0 - 74.0);
        assert_eq!(nodes[&NodeId::member("p")].x, 250.0 + 74.0);
        assert_eq!(nodes[&NodeId::member("q")].x, 650.0 + 74.0);
    }

    #[test]
    fn unpartnered_nodes_do_not_move() {
        let config = LayoutConfig::default();
        let graph = pair_graph("a", "b");
        let mut nodes = BTreeMap::new();
        nodes.insert(NodeId::member("a"), node(NodeId::member("a"), 0.0, 0.0, 100.0));
        nodes.insert(NodeId::member("b"), node(NodeId::member("b"), 10.0, 0.0, 100.0));
        nodes.insert(NodeId::member("x"), node(NodeId::member("x"), 777.0, 3.0, 100.0));
        nodes.insert(NodeId::union("a", "b"), node(NodeId::union("a", "b"), 5.0, 200.0, 1.0));

        align_partners(&mut nodes, &graph, &config);

        let x = &nodes[&NodeId::member("x")];
        assert_eq!((x.x, x.y), (777.0, 3.0));
    }
}
