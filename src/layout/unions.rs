use std::collections::BTreeMap;

use crate::ir::RelationshipKind;

use super::normalize::NormalizedRelationship;
use super::types::{EdgeKind, EdgeSet, NodeId, PartnerSide, StructuralEdge};

/// The two members behind a union node, `left < right`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Partners {
    pub left: String,
    pub right: String,
}

/// Structural graph under construction: union and virtual anchors plus every
/// rank-defining edge.
#[derive(Debug, Default)]
pub(crate) struct FamilyGraph {
    pub unions: BTreeMap<NodeId, Partners>,
    pub virtuals: Vec<NodeId>,
    pub edges: EdgeSet,
}

impl FamilyGraph {
    pub fn has_union(&self, a: &str, b: &str) -> bool {
        self.unions.contains_key(&NodeId::union(a, b))
    }

    fn add_partnership(&mut self, a: &str, b: &str) {
        let union = NodeId::union(a, b);
        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        self.unions.entry(union.clone()).or_insert_with(|| Partners {
            left: left.to_string(),
            right: right.to_string(),
        });
        for (member, side) in [(left, PartnerSide::Left), (right, PartnerSide::Right)] {
            self.edges.insert(StructuralEdge {
                source: NodeId::member(member),
                target: union.clone(),
                kind: EdgeKind::PartnerLink,
                side: Some(side),
            });
        }
    }

    /// Provisional direct edge; the multi-parent pass decides its final route.
    fn add_parent_claim(&mut self, parent: &str, child: &str) {
        self.edges.insert(StructuralEdge::new(
            NodeId::member(parent),
            NodeId::member(child),
            EdgeKind::ParentChild,
        ));
    }
}

/// Builds unions for partner records and provisional edges for parent-child
/// records. Duplicate records collapse onto the same ids.
pub(crate) fn synthesize_unions(relationships: &[NormalizedRelationship]) -> FamilyGraph {
    let mut graph = FamilyGraph::default();
    for rel in relationships {
        match rel.kind {
            RelationshipKind::Partner => graph.add_partnership(&rel.member1, &rel.member2),
            RelationshipKind::ParentChild => graph.add_parent_claim(&rel.member1, &rel.member2),
        }
    }
    graph
}
