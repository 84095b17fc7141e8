use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::debug;

use super::types::{EdgeKind, NodeId, StructuralEdge};
use super::unions::FamilyGraph;

/// Collapses a child's recorded parents into parental sources.
///
/// Parents are visited in id order; each unpaired parent pairs with the
/// smallest unpaired co-parent it shares a union with. Pairs become the
/// union node, everyone left over is a lone source.
fn parental_sources(graph: &FamilyGraph, parents: &BTreeSet<String>) -> Vec<NodeId> {
    let parents: Vec<&str> = parents.iter().map(String::as_str).collect();
    let mut paired = vec![false; parents.len()];
    let mut sources = Vec::with_capacity(parents.len());
    for i in 0..parents.len() {
        if paired[i] {
            continue;
        }
        paired[i] = true;
        let partner = (i + 1..parents.len())
            .find(|&j| !paired[j] && graph.has_union(parents[i], parents[j]));
        match partner {
            Some(j) => {
                paired[j] = true;
                sources.push(NodeId::union(parents[i], parents[j]));
            }
            None => sources.push(NodeId::member(parents[i])),
        }
    }
    sources
}

/// Reroutes provisional parent edges so every child has exactly one
/// incoming structural edge: straight from its single source, or through a
/// fresh virtual node when there are several.
pub(crate) fn resolve_multi_parents(graph: &mut FamilyGraph) {
    let mut parents_of: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for edge in &graph.edges {
        if edge.kind != EdgeKind::ParentChild {
            continue;
        }
        if let (Some(parent), Some(child)) = (edge.source.as_member(), edge.target.as_member()) {
            parents_of
                .entry(child.to_string())
                .or_default()
                .insert(parent.to_string());
        }
    }

    let mut rewired: Vec<(NodeId, Vec<NodeId>)> = Vec::new();
    for (child, parents) in &parents_of {
        let sources = parental_sources(graph, parents);
        if let [NodeId::Member(_)] = sources.as_slice() {
            // Lone parent: the provisional edge already is the final one.
            continue;
        }
        rewired.push((NodeId::member(child.as_str()), sources));
    }
    if rewired.is_empty() {
        return;
    }

    let rewired_children: HashSet<NodeId> =
        rewired.iter().map(|(child, _)| child.clone()).collect();
    graph.edges.retain(|edge| {
        !(edge.kind == EdgeKind::ParentChild
            && edge.source.as_member().is_some()
            && rewired_children.contains(&edge.target))
    });

    let mut next_virtual = 0usize;
    for (child, sources) in rewired {
        if let [source] = sources.as_slice() {
            graph.edges.insert(StructuralEdge::new(
                source.clone(),
                child,
                EdgeKind::ParentChild,
            ));
            continue;
        }
        let virtual_id = NodeId::Virtual(next_virtual);
        next_virtual += 1;
        debug!(child = %child, sources = sources.len(), node = %virtual_id, "merging parental sources");
        for source in sources {
            graph.edges.insert(StructuralEdge::new(
                source,
                virtual_id.clone(),
                EdgeKind::VirtualLink,
            ));
        }
        graph.edges.insert(StructuralEdge::new(
            virtual_id.clone(),
            child,
            EdgeKind::VirtualLink,
        ));
        graph.virtuals.push(virtual_id);
    }
}
