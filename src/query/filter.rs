// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashSet;

use crate::model::{ElementRef, StateId};
use crate::presentation::{NodePayload, PresentationEdge, PresentationGraph, PresentationNode};

/// Text query over node names and descriptions.
///
/// Matching is a case-insensitive substring test. The empty query matches everything.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodeQuery {
    folded: String,
}

impl NodeQuery {
    pub fn new(text: &str) -> Self {
        Self {
            folded: text.to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.folded.is_empty()
    }

    pub fn matches(&self, payload: &NodePayload) -> bool {
        self.is_empty()
            || payload.name.to_lowercase().contains(&self.folded)
            || payload.description.to_lowercase().contains(&self.folded)
    }
}

/// Returns a copy of `nodes` with visibility set from `query`.
///
/// Visibility is recomputed from scratch, so an empty query shows every node no matter what an
/// earlier filter hid.
pub fn apply_filter<'a>(
    query: &str,
    nodes: impl IntoIterator<Item = &'a PresentationNode>,
) -> Vec<PresentationNode> {
    let query = NodeQuery::new(query);
    nodes
        .into_iter()
        .map(|node| {
            let mut node = node.clone();
            node.set_visible(query.matches(node.payload()));
            node
        })
        .collect()
}

/// Returns a copy of `edges` where an edge is visible iff both endpoints are visible in `nodes`.
///
/// An endpoint missing from `nodes` counts as hidden.
pub fn derive_edge_visibility<'a, 'b>(
    nodes: impl IntoIterator<Item = &'a PresentationNode>,
    edges: impl IntoIterator<Item = &'b PresentationEdge>,
) -> Vec<PresentationEdge> {
    let visible = visible_node_ids(nodes);
    edges
        .into_iter()
        .map(|edge| {
            let mut edge = edge.clone();
            edge.set_visible(edge_endpoints_visible(&visible, &edge));
            edge
        })
        .collect()
}

/// Recomputes node and edge visibility of `graph` in place.
///
/// Returns the elements whose visibility flipped.
pub(crate) fn refresh_visibility(
    graph: &mut PresentationGraph,
    query: &NodeQuery,
) -> Vec<ElementRef> {
    let mut flipped = Vec::new();

    for node in graph.nodes_mut() {
        let visible = query.matches(node.payload());
        if node.visible() != visible {
            node.set_visible(visible);
            flipped.push(ElementRef::State(node.id().clone()));
        }
    }

    let (nodes, edges) = graph.nodes_and_edges_mut();
    let visible = visible_node_ids(nodes.values());
    for edge in edges {
        let edge_visible = edge_endpoints_visible(&visible, edge);
        if edge.visible() != edge_visible {
            edge.set_visible(edge_visible);
            flipped.push(ElementRef::Action(edge.id().clone()));
        }
    }

    flipped
}

fn visible_node_ids<'a>(
    nodes: impl IntoIterator<Item = &'a PresentationNode>,
) -> HashSet<&'a StateId> {
    nodes
        .into_iter()
        .filter(|node| node.visible())
        .map(PresentationNode::id)
        .collect()
}

fn edge_endpoints_visible(visible: &HashSet<&StateId>, edge: &PresentationEdge) -> bool {
    visible.contains(edge.source()) && visible.contains(edge.target())
}
