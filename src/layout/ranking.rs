//! Acyclicity check and generation depth for the structural graph.
//!
//! Edge direction is `ancestor → descendant` (partner → union, source →
//! virtual, source → child). A cycle means some member is its own ancestor
//! and no layering exists, so the build is rejected before layout runs.

use std::collections::HashMap;

use petgraph::Direction as PetDirection;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};

use super::error::LayoutError;
use super::types::{EdgeSet, NodeId};

/// Longest-path rank of every node; roots sit at 0.
pub(crate) fn rank_generations(
    nodes: &[NodeId],
    edges: &EdgeSet,
) -> Result<HashMap<NodeId, usize>, LayoutError> {
    let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut index: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());
    for id in nodes {
        index.insert(id, graph.add_node(id.clone()));
    }
    for edge in edges {
        let (Some(&source), Some(&target)) = (index.get(&edge.source), index.get(&edge.target))
        else {
            continue;
        };
        graph.add_edge(source, target, ());
    }

    let order = toposort(&graph, None).map_err(|_| LayoutError::CyclicAncestry {
        members: cycle_members(&graph),
    })?;

    let mut ranks: HashMap<NodeIndex, usize> = HashMap::with_capacity(order.len());
    for idx in order {
        let rank = graph
            .neighbors_directed(idx, PetDirection::Incoming)
            .filter_map(|parent| ranks.get(&parent))
            .map(|rank| rank + 1)
            .max()
            .unwrap_or(0);
        ranks.insert(idx, rank);
    }

    Ok(ranks
        .into_iter()
        .map(|(idx, rank)| (graph[idx].clone(), rank))
        .collect())
}

/// Sorted member ids of every strongly connected component that forms a
/// cycle. Self-loops count as one-member cycles.
fn cycle_members(graph: &DiGraph<NodeId, ()>) -> Vec<String> {
    let mut members: Vec<String> = tarjan_scc(graph)
        .into_iter()
        .filter(|component| {
            component.len() > 1
                || component
                    .first()
                    .is_some_and(|&node| graph.find_edge(node, node).is_some())
        })
        .flatten()
        .filter_map(|idx| graph[idx].as_member().map(str::to_string))
        .collect();
    members.sort_unstable();
    members.dedup();
    members
}
