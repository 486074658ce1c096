// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Keeps the chat flow and its presentation graph in lockstep.
//!
//! Every structural edit goes through [`SyncEngine`], which validates first and then mutates the
//! flow and the graph together, so no caller can observe one without the other. Out-of-band
//! flow changes (load, external update) go through [`SyncEngine::reconcile`], which re-projects
//! the graph while keeping known node positions.

mod delta;

use std::fmt;

use tracing::{debug, warn};

use crate::model::{
    Action, ActionId, ActionType, AllocationError, ChatFlow, ElementRef, IdAllocator, State,
    StateId,
};
use crate::presentation::{
    PlaceholderLayout, Position, PositionMap, PresentationEdge, PresentationGraph,
    PresentationNode,
};
use crate::query::filter::{refresh_visibility, NodeQuery};

pub use delta::Delta;
use delta::DeltaBuilder;

pub const DEFAULT_STATE_NAME: &str = "New state";
pub const DEFAULT_ACTION_NAME: &str = "New action";

/// Merge-patch for the editable fields of a state. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Merge-patch for the editable fields of an action. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub action_type: Option<ActionType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApplyResult<T> {
    pub value: T,
    pub new_rev: u64,
    pub delta: Delta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A connection names a state that does not exist.
    InvalidConnection {
        source_id: StateId,
        target_id: StateId,
        missing: StateId,
    },
    NotFound {
        element: ElementRef,
    },
    /// The id allocator broke its guarantee. Always a bug.
    Allocation(AllocationError),
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConnection {
                source_id,
                target_id,
                missing,
            } => write!(
                f,
                "cannot connect {source_id} -> {target_id}: state {missing} does not exist"
            ),
            Self::NotFound { element } => write!(f, "element not found ({element})"),
            Self::Allocation(err) => write!(f, "internal id allocation error: {err}"),
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Allocation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AllocationError> for SyncError {
    fn from(err: AllocationError) -> Self {
        Self::Allocation(err)
    }
}

fn invalid_connection(source_id: &StateId, target_id: &StateId, missing: &StateId) -> SyncError {
    SyncError::InvalidConnection {
        source_id: source_id.clone(),
        target_id: target_id.clone(),
        missing: missing.clone(),
    }
}

/// Builds the presentation graph for `flow`.
///
/// Nodes reuse `prior_positions` when the state was already on the canvas; new states get a
/// placeholder from `placeholder`, indexed by their position in the flow. Every element starts
/// visible; apply a filter afterwards if one is active.
pub fn project_from_domain(
    flow: &ChatFlow,
    prior_positions: &PositionMap,
    placeholder: &PlaceholderLayout,
) -> PresentationGraph {
    let nodes = flow.states().values().enumerate().map(|(index, state)| {
        let position = prior_positions
            .get(state.id())
            .copied()
            .unwrap_or_else(|| placeholder.position_for(index));
        PresentationNode::from_state(state, position)
    });
    let edges = flow.actions().values().map(PresentationEdge::from_action);

    PresentationGraph::from_parts(nodes, edges)
}

/// Owner of the chat flow and its presentation graph.
#[derive(Debug)]
pub struct SyncEngine {
    flow: ChatFlow,
    graph: PresentationGraph,
    allocator: IdAllocator,
    placeholder: PlaceholderLayout,
    query: NodeQuery,
    rev: u64,
}

impl SyncEngine {
    pub fn new(flow: ChatFlow, placeholder: PlaceholderLayout) -> Self {
        let graph = project_from_domain(&flow, &PositionMap::new(), &placeholder);
        let allocator = IdAllocator::seeded_from(&flow);
        Self {
            flow,
            graph,
            allocator,
            placeholder,
            query: NodeQuery::default(),
            rev: 0,
        }
    }

    /// Replaces the id allocator, seeding it from the current flow.
    pub fn with_allocator(mut self, mut allocator: IdAllocator) -> Self {
        allocator.reseed(&self.flow);
        self.allocator = allocator;
        self
    }

    pub fn flow(&self) -> &ChatFlow {
        &self.flow
    }

    pub fn graph(&self) -> &PresentationGraph {
        &self.graph
    }

    pub fn query(&self) -> &NodeQuery {
        &self.query
    }

    pub fn rev(&self) -> u64 {
        self.rev
    }

    /// Returns `true` if `element` exists in both the flow and the graph.
    pub fn contains(&self, element: &ElementRef) -> bool {
        match element {
            ElementRef::State(state_id) => {
                self.flow.contains_state(state_id) && self.graph.node(state_id).is_some()
            }
            ElementRef::Action(action_id) => {
                self.flow.contains_action(action_id) && self.graph.edge(action_id).is_some()
            }
        }
    }

    /// Adopts a flow that changed outside the engine and re-projects the graph.
    ///
    /// Positions of states that survive are kept; the active filter is re-applied.
    pub fn reconcile(&mut self, flow: ChatFlow) -> Delta {
        let prior_positions = self.graph.positions();
        let graph = project_from_domain(&flow, &prior_positions, &self.placeholder);
        let mut delta = DeltaBuilder::default();

        for (state_id, old) in self.graph.nodes() {
            match graph.node(state_id) {
                None => delta.record_removed(ElementRef::State(state_id.clone())),
                Some(new) if new.payload() != old.payload() => {
                    delta.record_updated(ElementRef::State(state_id.clone()))
                }
                Some(_) => {}
            }
        }
        for state_id in graph.nodes().keys() {
            if self.graph.node(state_id).is_none() {
                delta.record_added(ElementRef::State(state_id.clone()));
            }
        }
        for (action_id, old) in self.graph.edges() {
            match graph.edge(action_id) {
                None => delta.record_removed(ElementRef::Action(action_id.clone())),
                Some(new)
                    if new.payload() != old.payload()
                        || new.source() != old.source()
                        || new.target() != old.target() =>
                {
                    delta.record_updated(ElementRef::Action(action_id.clone()))
                }
                Some(_) => {}
            }
        }
        for action_id in graph.edges().keys() {
            if self.graph.edge(action_id).is_none() {
                delta.record_added(ElementRef::Action(action_id.clone()));
            }
        }

        let mut graph = graph;
        refresh_visibility(&mut graph, &self.query);
        for node in graph.nodes().values() {
            if self
                .graph
                .node(node.id())
                .is_some_and(|old| old.visible() != node.visible())
            {
                delta.record_updated(ElementRef::State(node.id().clone()));
            }
        }
        for edge in graph.edges().values() {
            if self
                .graph
                .edge(edge.id())
                .is_some_and(|old| old.visible() != edge.visible())
            {
                delta.record_updated(ElementRef::Action(edge.id().clone()));
            }
        }

        self.allocator.reseed(&flow);
        self.flow = flow;
        self.graph = graph;
        self.bump_rev();

        debug!(
            states = self.flow.states().len(),
            actions = self.flow.actions().len(),
            rev = self.rev,
            "reconciled presentation graph"
        );

        delta.finish()
    }

    /// Sets the filter text and recomputes node and edge visibility.
    pub fn set_query(&mut self, text: &str) -> Delta {
        self.query = NodeQuery::new(text);
        let mut delta = DeltaBuilder::default();
        delta.record_all_updated(refresh_visibility(&mut self.graph, &self.query));
        delta.finish()
    }

    /// Draws a new action from `source_id` to `target_id`. Self-loops are allowed.
    pub fn connect(
        &mut self,
        source_id: &StateId,
        target_id: &StateId,
    ) -> Result<ApplyResult<Action>, SyncError> {
        if let Some((end, missing)) = self.flow.missing_endpoint(source_id, target_id) {
            warn!(
                source = %source_id,
                target = %target_id,
                missing = %missing,
                end = end.as_str(),
                "rejected connection"
            );
            return Err(invalid_connection(source_id, target_id, missing));
        }

        let action_id = self.allocator.allocate_action_id(&self.flow)?;
        let action = Action::new_with(
            action_id,
            source_id.clone(),
            target_id.clone(),
            DEFAULT_ACTION_NAME,
            "",
            ActionType::Core,
        );

        self.flow
            .insert_action(action.clone())
            .map_err(|err| invalid_connection(source_id, target_id, &err.state_id))?;
        self.graph.insert_edge(PresentationEdge::from_action(&action));

        let mut delta = DeltaBuilder::default();
        delta.record_added(ElementRef::Action(action.id().clone()));
        delta.record_all_updated(refresh_visibility(&mut self.graph, &self.query));

        debug!(action_id = %action.id(), source = %source_id, target = %target_id, "connected states");
        Ok(self.applied(action, delta))
    }

    /// Adds a state with default fields at `position` (canvas coordinates).
    pub fn add_state(&mut self, position: Position) -> Result<ApplyResult<State>, SyncError> {
        let state_id = self.allocator.allocate_state_id(&self.flow)?;
        let state = State::new(state_id, DEFAULT_STATE_NAME, "");

        self.flow.insert_state(state.clone());
        self.graph
            .insert_node(PresentationNode::from_state(&state, position));

        let mut delta = DeltaBuilder::default();
        delta.record_added(ElementRef::State(state.id().clone()));
        delta.record_all_updated(refresh_visibility(&mut self.graph, &self.query));

        debug!(state_id = %state.id(), x = position.x, y = position.y, "added state");
        Ok(self.applied(state, delta))
    }

    /// Deletes a state (with every action touching it) or a single action.
    ///
    /// Unknown ids are a no-op: the result carries an empty delta and the revision is unchanged.
    pub fn delete_element(&mut self, element: &ElementRef) -> ApplyResult<()> {
        let mut delta = DeltaBuilder::default();

        match element {
            ElementRef::State(state_id) => {
                let Some(removed) = self.flow.remove_state(state_id) else {
                    return self.unchanged();
                };
                self.graph.remove_node(state_id);
                for action in &removed.actions {
                    self.graph.remove_edge(action.id());
                    delta.record_removed(ElementRef::Action(action.id().clone()));
                }
                delta.record_removed(element.clone());
                debug!(state_id = %state_id, cascaded = removed.actions.len(), "deleted state");
            }
            ElementRef::Action(action_id) => {
                if self.flow.remove_action(action_id).is_none() {
                    return self.unchanged();
                }
                self.graph.remove_edge(action_id);
                delta.record_removed(element.clone());
                debug!(action_id = %action_id, "deleted action");
            }
        }

        self.applied((), delta)
    }

    pub fn update_state(
        &mut self,
        state_id: &StateId,
        patch: &StatePatch,
    ) -> Result<ApplyResult<State>, SyncError> {
        let element = ElementRef::State(state_id.clone());
        let (Some(state), Some(node)) = (
            self.flow.state_mut(state_id),
            self.graph.node_mut(state_id),
        ) else {
            return Err(SyncError::NotFound { element });
        };

        if let Some(name) = &patch.name {
            state.set_name(name.clone());
        }
        if let Some(description) = &patch.description {
            state.set_description(description.clone());
        }
        node.refresh_payload(state);
        let state = state.clone();

        let mut delta = DeltaBuilder::default();
        delta.record_updated(element);
        delta.record_all_updated(refresh_visibility(&mut self.graph, &self.query));

        debug!(state_id = %state_id, "updated state");
        Ok(self.applied(state, delta))
    }

    pub fn update_action(
        &mut self,
        action_id: &ActionId,
        patch: &ActionPatch,
    ) -> Result<ApplyResult<Action>, SyncError> {
        let element = ElementRef::Action(action_id.clone());
        let (Some(action), Some(edge)) = (
            self.flow.action_mut(action_id),
            self.graph.edge_mut(action_id),
        ) else {
            return Err(SyncError::NotFound { element });
        };

        if let Some(name) = &patch.name {
            action.set_name(name.clone());
        }
        if let Some(description) = &patch.description {
            action.set_description(description.clone());
        }
        if let Some(action_type) = patch.action_type {
            action.set_action_type(action_type);
        }
        edge.refresh_payload(action);
        let action = action.clone();

        let mut delta = DeltaBuilder::default();
        delta.record_updated(element);

        debug!(action_id = %action_id, "updated action");
        Ok(self.applied(action, delta))
    }

    /// Moves a node on the canvas. The chat flow is not touched.
    pub fn move_node(
        &mut self,
        state_id: &StateId,
        position: Position,
    ) -> Result<ApplyResult<()>, SyncError> {
        let element = ElementRef::State(state_id.clone());
        let Some(node) = self.graph.node_mut(state_id) else {
            return Err(SyncError::NotFound { element });
        };
        node.set_position(position);

        let mut delta = DeltaBuilder::default();
        delta.record_updated(element);
        Ok(self.applied((), delta))
    }

    fn bump_rev(&mut self) {
        self.rev = self.rev.wrapping_add(1);
    }

    fn applied<T>(&mut self, value: T, delta: DeltaBuilder) -> ApplyResult<T> {
        self.bump_rev();
        ApplyResult {
            value,
            new_rev: self.rev,
            delta: delta.finish(),
        }
    }

    fn unchanged(&self) -> ApplyResult<()> {
        ApplyResult {
            value: (),
            new_rev: self.rev,
            delta: Delta::default(),
        }
    }
}

#[cfg(test)]
mod tests;
