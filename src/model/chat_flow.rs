// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use smallvec::SmallVec;

use super::ids::{ActionId, StateId};

/// The canonical graph of states and actions that belongs to a bot.
///
/// Both maps keep insertion order, so rendering and persistence stay stable across edits.
/// Actions always reference states present in the same flow as long as they are added through
/// [`ChatFlow::insert_action`] and states are removed through [`ChatFlow::remove_state`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatFlow {
    states: IndexMap<StateId, State>,
    actions: IndexMap<ActionId, Action>,
}

impl ChatFlow {
    pub fn states(&self) -> &IndexMap<StateId, State> {
        &self.states
    }

    pub fn actions(&self) -> &IndexMap<ActionId, Action> {
        &self.actions
    }

    pub fn state(&self, state_id: &StateId) -> Option<&State> {
        self.states.get(state_id)
    }

    pub fn state_mut(&mut self, state_id: &StateId) -> Option<&mut State> {
        self.states.get_mut(state_id)
    }

    pub fn action(&self, action_id: &ActionId) -> Option<&Action> {
        self.actions.get(action_id)
    }

    pub fn action_mut(&mut self, action_id: &ActionId) -> Option<&mut Action> {
        self.actions.get_mut(action_id)
    }

    pub fn contains_state(&self, state_id: &StateId) -> bool {
        self.states.contains_key(state_id)
    }

    pub fn contains_action(&self, action_id: &ActionId) -> bool {
        self.actions.contains_key(action_id)
    }

    /// Returns `true` if `raw` names any state or action.
    pub fn contains_raw_id(&self, raw: &str) -> bool {
        self.states.contains_key(raw) || self.actions.contains_key(raw)
    }

    /// Inserts (or replaces) a state keyed by its own id.
    pub fn insert_state(&mut self, state: State) -> Option<State> {
        self.states.insert(state.id().clone(), state)
    }

    /// Inserts (or replaces) an action keyed by its own id.
    ///
    /// Both endpoints must already be states of this flow.
    pub fn insert_action(&mut self, action: Action) -> Result<Option<Action>, DanglingEndpoint> {
        self.check_endpoints(&action)?;
        Ok(self.actions.insert(action.id().clone(), action))
    }

    /// Removes a state together with every action that uses it as source or target.
    pub fn remove_state(&mut self, state_id: &StateId) -> Option<RemovedState> {
        let state = self.states.shift_remove(state_id)?;

        let dangling = self
            .actions
            .values()
            .filter(|action| action.touches(state_id))
            .map(|action| action.id().clone())
            .collect::<SmallVec<[ActionId; 4]>>();

        let actions = dangling
            .iter()
            .filter_map(|action_id| self.actions.shift_remove(action_id))
            .collect();

        Some(RemovedState { state, actions })
    }

    pub fn remove_action(&mut self, action_id: &ActionId) -> Option<Action> {
        self.actions.shift_remove(action_id)
    }

    /// Actions whose source or target is `state_id`, in flow order.
    pub fn actions_touching<'a>(
        &'a self,
        state_id: &'a StateId,
    ) -> impl Iterator<Item = &'a Action> + 'a {
        self.actions
            .values()
            .filter(move |action| action.touches(state_id))
    }

    /// Checks referential integrity of every action.
    pub fn validate(&self) -> Result<(), IntegrityError> {
        self.actions
            .values()
            .try_for_each(|action| self.check_endpoints(action))
            .map_err(IntegrityError::from)
    }

    /// First endpoint of a would-be `source -> target` action that names no state here.
    pub fn missing_endpoint<'a>(
        &self,
        source: &'a StateId,
        target: &'a StateId,
    ) -> Option<(ActionEnd, &'a StateId)> {
        [(ActionEnd::Source, source), (ActionEnd::Target, target)]
            .into_iter()
            .find(|(_, state_id)| !self.states.contains_key(*state_id))
    }

    fn check_endpoints(&self, action: &Action) -> Result<(), DanglingEndpoint> {
        match self.missing_endpoint(action.source(), action.target()) {
            Some((end, state_id)) => Err(DanglingEndpoint {
                action_id: action.id().clone(),
                end,
                state_id: state_id.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// What [`ChatFlow::remove_state`] took out of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedState {
    pub state: State,
    pub actions: SmallVec<[Action; 4]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionEnd {
    Source,
    Target,
}

impl ActionEnd {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Source => "source",
            Self::Target => "target",
        }
    }
}

/// An action endpoint naming a state the flow does not have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingEndpoint {
    pub action_id: ActionId,
    pub end: ActionEnd,
    pub state_id: StateId,
}

impl fmt::Display for DanglingEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "action {} has unknown {} state {}",
            self.action_id,
            self.end.as_str(),
            self.state_id
        )
    }
}

impl std::error::Error for DanglingEndpoint {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    DanglingSource { action_id: ActionId, state_id: StateId },
    DanglingTarget { action_id: ActionId, state_id: StateId },
    DuplicateState { state_id: StateId },
    DuplicateAction { action_id: ActionId },
}

impl fmt::Display for IntegrityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingSource {
                action_id,
                state_id,
            } => write!(f, "action {action_id} has unknown source state {state_id}"),
            Self::DanglingTarget {
                action_id,
                state_id,
            } => write!(f, "action {action_id} has unknown target state {state_id}"),
            Self::DuplicateState { state_id } => write!(f, "duplicate state id {state_id}"),
            Self::DuplicateAction { action_id } => write!(f, "duplicate action id {action_id}"),
        }
    }
}

impl std::error::Error for IntegrityError {}

impl From<DanglingEndpoint> for IntegrityError {
    fn from(err: DanglingEndpoint) -> Self {
        let DanglingEndpoint {
            action_id,
            end,
            state_id,
        } = err;
        match end {
            ActionEnd::Source => Self::DanglingSource {
                action_id,
                state_id,
            },
            ActionEnd::Target => Self::DanglingTarget {
                action_id,
                state_id,
            },
        }
    }
}

/// A conversation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    id: StateId,
    name: String,
    description: String,
}

impl State {
    pub fn new(id: StateId, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn id(&self) -> &StateId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }
}

/// Whether an action is one of the built-in transitions or user-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum ActionType {
    #[default]
    Core,
    Custom,
}

impl ActionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseActionTypeError {
    value: String,
}

impl ParseActionTypeError {
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for ParseActionTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid action type {:?} (expected \"core\" or \"custom\")",
            self.value
        )
    }
}

impl std::error::Error for ParseActionTypeError {}

impl FromStr for ActionType {
    type Err = ParseActionTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "core" => Ok(Self::Core),
            "custom" => Ok(Self::Custom),
            other => Err(ParseActionTypeError {
                value: other.to_owned(),
            }),
        }
    }
}

/// A directed, typed transition between two states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    id: ActionId,
    name: String,
    description: String,
    action_type: ActionType,
    source: StateId,
    target: StateId,
}

impl Action {
    pub fn new(id: ActionId, source: StateId, target: StateId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            action_type: ActionType::default(),
            source,
            target,
        }
    }

    pub fn new_with(
        id: ActionId,
        source: StateId,
        target: StateId,
        name: impl Into<String>,
        description: impl Into<String>,
        action_type: ActionType,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            action_type,
            source,
            target,
        }
    }

    pub fn id(&self) -> &ActionId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action_type(&self) -> ActionType {
        self.action_type
    }

    pub fn source(&self) -> &StateId {
        &self.source
    }

    pub fn target(&self) -> &StateId {
        &self.target
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, state_id: &StateId) -> bool {
        &self.source == state_id || &self.target == state_id
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_action_type(&mut self, action_type: ActionType) {
        self.action_type = action_type;
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, ActionEnd, ActionType, ChatFlow, DanglingEndpoint, IntegrityError, State};
    use crate::model::fixtures::{aid, greeting_flow, sid};

    #[test]
    fn remove_state_cascades_to_incoming_and_outgoing_actions() {
        let mut flow = greeting_flow();

        let removed = flow.remove_state(&sid("s:ask")).expect("state exists");

        assert_eq!(removed.state.name(), "Ask");
        let mut removed_ids = removed
            .actions
            .iter()
            .map(|action| action.id().as_str())
            .collect::<Vec<_>>();
        removed_ids.sort_unstable();
        assert_eq!(removed_ids, vec!["a:ask-answer", "a:greet-ask", "a:retry"]);
        assert!(flow.contains_action(&aid("a:greet-bye")));
        assert!(flow.validate().is_ok());
    }

    #[test]
    fn remove_state_keeps_order_of_remaining_states() {
        let mut flow = greeting_flow();
        flow.remove_state(&sid("s:ask"));

        let order = flow
            .states()
            .keys()
            .map(|id| id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(order, vec!["s:greet", "s:answer", "s:bye"]);
    }

    #[test]
    fn missing_endpoint_reports_the_source_first() {
        let mut flow = ChatFlow::default();
        flow.insert_state(State::new(sid("s1"), "One", ""));

        assert_eq!(flow.missing_endpoint(&sid("s1"), &sid("s1")), None);
        assert_eq!(
            flow.missing_endpoint(&sid("s1"), &sid("sX")),
            Some((ActionEnd::Target, &sid("sX")))
        );
        assert_eq!(
            flow.missing_endpoint(&sid("sY"), &sid("sX")),
            Some((ActionEnd::Source, &sid("sY")))
        );
    }

    #[test]
    fn insert_action_rejects_unknown_endpoints() {
        let mut flow = ChatFlow::default();
        flow.insert_state(State::new(sid("s1"), "One", ""));

        let err = flow
            .insert_action(Action::new(aid("a1"), sid("s1"), sid("sX")))
            .expect_err("dangling target");

        assert_eq!(
            err,
            DanglingEndpoint {
                action_id: aid("a1"),
                end: ActionEnd::Target,
                state_id: sid("sX"),
            }
        );
        assert_eq!(err.to_string(), "action a1 has unknown target state sX");
        assert_eq!(
            IntegrityError::from(err),
            IntegrityError::DanglingTarget {
                action_id: aid("a1"),
                state_id: sid("sX"),
            }
        );
        assert!(flow.actions().is_empty());
    }

    #[test]
    fn self_loop_is_a_valid_action() {
        let mut flow = ChatFlow::default();
        flow.insert_state(State::new(sid("s1"), "One", ""));

        flow.insert_action(Action::new(aid("a1"), sid("s1"), sid("s1")))
            .expect("self loop");

        let action = flow.action(&aid("a1")).expect("action");
        assert!(action.is_self_loop());
        assert_eq!(flow.actions_touching(&sid("s1")).count(), 1);
    }

    #[test]
    fn action_type_parses_lowercase_names_only() {
        assert_eq!("core".parse::<ActionType>(), Ok(ActionType::Core));
        assert_eq!("custom".parse::<ActionType>(), Ok(ActionType::Custom));

        let err = "Core".parse::<ActionType>().expect_err("case sensitive");
        assert_eq!(err.value(), "Core");
    }
}
