// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The renderable projection of a chat flow.
//!
//! Nodes mirror states and edges mirror actions by id. Positions and visibility live only here;
//! the domain model never sees them.

pub mod placeholder;

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::model::{Action, ActionId, ActionType, ChatFlow, IntegrityError, State, StateId};

pub use placeholder::PlaceholderLayout;

/// Last known canvas position per state, used to keep nodes in place across re-projection.
pub type PositionMap = HashMap<StateId, Position>;

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodePayload {
    pub name: String,
    pub description: String,
}

impl NodePayload {
    fn from_state(state: &State) -> Self {
        Self {
            name: state.name().to_owned(),
            description: state.description().to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePayload {
    pub name: String,
    pub description: String,
    pub action_type: ActionType,
}

impl EdgePayload {
    fn from_action(action: &Action) -> Self {
        Self {
            name: action.name().to_owned(),
            description: action.description().to_owned(),
            action_type: action.action_type(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentationNode {
    id: StateId,
    position: Position,
    visible: bool,
    payload: NodePayload,
}

impl PresentationNode {
    pub fn from_state(state: &State, position: Position) -> Self {
        Self {
            id: state.id().clone(),
            position,
            visible: true,
            payload: NodePayload::from_state(state),
        }
    }

    pub fn id(&self) -> &StateId {
        &self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn payload(&self) -> &NodePayload {
        &self.payload
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn refresh_payload(&mut self, state: &State) {
        self.payload = NodePayload::from_state(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PresentationEdge {
    id: ActionId,
    source: StateId,
    target: StateId,
    visible: bool,
    payload: EdgePayload,
}

impl PresentationEdge {
    pub fn from_action(action: &Action) -> Self {
        Self {
            id: action.id().clone(),
            source: action.source().clone(),
            target: action.target().clone(),
            visible: true,
            payload: EdgePayload::from_action(action),
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn source(&self) -> &StateId {
        &self.source
    }

    pub fn target(&self) -> &StateId {
        &self.target
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn payload(&self) -> &EdgePayload {
        &self.payload
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn refresh_payload(&mut self, action: &Action) {
        self.payload = EdgePayload::from_action(action);
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PresentationGraph {
    nodes: IndexMap<StateId, PresentationNode>,
    edges: IndexMap<ActionId, PresentationEdge>,
}

impl PresentationGraph {
    pub fn nodes(&self) -> &IndexMap<StateId, PresentationNode> {
        &self.nodes
    }

    pub fn edges(&self) -> &IndexMap<ActionId, PresentationEdge> {
        &self.edges
    }

    pub fn node(&self, state_id: &StateId) -> Option<&PresentationNode> {
        self.nodes.get(state_id)
    }

    pub fn edge(&self, action_id: &ActionId) -> Option<&PresentationEdge> {
        self.edges.get(action_id)
    }

    pub fn visible_nodes(&self) -> impl Iterator<Item = &PresentationNode> + '_ {
        self.nodes.values().filter(|node| node.visible())
    }

    pub fn visible_edges(&self) -> impl Iterator<Item = &PresentationEdge> + '_ {
        self.edges.values().filter(|edge| edge.visible())
    }

    pub fn positions(&self) -> PositionMap {
        self.nodes
            .iter()
            .map(|(state_id, node)| (state_id.clone(), node.position()))
            .collect()
    }

    /// Rebuilds the domain flow from node/edge payloads (positions and visibility dropped).
    pub fn to_chat_flow(&self) -> Result<ChatFlow, IntegrityError> {
        let mut flow = ChatFlow::default();
        for node in self.nodes.values() {
            flow.insert_state(State::new(
                node.id.clone(),
                node.payload.name.clone(),
                node.payload.description.clone(),
            ));
        }
        for edge in self.edges.values() {
            flow.insert_action(Action::new_with(
                edge.id.clone(),
                edge.source.clone(),
                edge.target.clone(),
                edge.payload.name.clone(),
                edge.payload.description.clone(),
                edge.payload.action_type,
            ))?;
        }
        Ok(flow)
    }

    pub(crate) fn from_parts(
        nodes: impl IntoIterator<Item = PresentationNode>,
        edges: impl IntoIterator<Item = PresentationEdge>,
    ) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| (node.id.clone(), node))
                .collect(),
            edges: edges
                .into_iter()
                .map(|edge| (edge.id.clone(), edge))
                .collect(),
        }
    }

    pub(crate) fn node_mut(&mut self, state_id: &StateId) -> Option<&mut PresentationNode> {
        self.nodes.get_mut(state_id)
    }

    pub(crate) fn edge_mut(&mut self, action_id: &ActionId) -> Option<&mut PresentationEdge> {
        self.edges.get_mut(action_id)
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut PresentationNode> + '_ {
        self.nodes.values_mut()
    }

    /// Nodes for reading alongside edges for writing, e.g. to derive edge visibility in place.
    pub(crate) fn nodes_and_edges_mut(
        &mut self,
    ) -> (
        &IndexMap<StateId, PresentationNode>,
        impl Iterator<Item = &mut PresentationEdge> + '_,
    ) {
        (&self.nodes, self.edges.values_mut())
    }

    pub(crate) fn insert_node(&mut self, node: PresentationNode) {
        self.nodes.insert(node.id.clone(), node);
    }

    pub(crate) fn insert_edge(&mut self, edge: PresentationEdge) {
        self.edges.insert(edge.id.clone(), edge);
    }

    pub(crate) fn remove_node(&mut self, state_id: &StateId) -> Option<PresentationNode> {
        self.nodes.shift_remove(state_id)
    }

    pub(crate) fn remove_edge(&mut self, action_id: &ActionId) -> Option<PresentationEdge> {
        self.edges.shift_remove(action_id)
    }
}
