// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::str::FromStr;

use super::ids::{ActionId, ActionKind, IdError, IdKind, StateId, StateKind};

/// A reference to one element of a chat flow, tagged with its kind.
///
/// Canonical text form: `state/<state_id>` or `action/<action_id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRef {
    State(StateId),
    Action(ActionId),
}

impl ElementRef {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::State(_) => ElementKind::State,
            Self::Action(_) => ElementKind::Action,
        }
    }

    pub fn raw_id(&self) -> &str {
        match self {
            Self::State(state_id) => state_id.as_str(),
            Self::Action(action_id) => action_id.as_str(),
        }
    }

    pub fn as_state(&self) -> Option<&StateId> {
        match self {
            Self::State(state_id) => Some(state_id),
            Self::Action(_) => None,
        }
    }

    pub fn as_action(&self) -> Option<&ActionId> {
        match self {
            Self::State(_) => None,
            Self::Action(action_id) => Some(action_id),
        }
    }

    pub fn parse(input: &str) -> Result<Self, ParseElementRefError> {
        let (kind, id) = input
            .split_once('/')
            .ok_or(ParseElementRefError::MissingKind)?;

        match kind {
            StateKind::NAME => StateId::new(id)
                .map(Self::State)
                .map_err(ParseElementRefError::InvalidId),
            ActionKind::NAME => ActionId::new(id)
                .map(Self::Action)
                .map_err(ParseElementRefError::InvalidId),
            other => Err(ParseElementRefError::UnknownKind(other.to_owned())),
        }
    }
}

impl From<StateId> for ElementRef {
    fn from(state_id: StateId) -> Self {
        Self::State(state_id)
    }
}

impl From<ActionId> for ElementRef {
    fn from(action_id: ActionId) -> Self {
        Self::Action(action_id)
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind().as_str(), self.raw_id())
    }
}

impl FromStr for ElementRef {
    type Err = ParseElementRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    State,
    Action,
}

impl ElementKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::State => StateKind::NAME,
            Self::Action => ActionKind::NAME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseElementRefError {
    MissingKind,
    UnknownKind(String),
    InvalidId(IdError),
}

impl fmt::Display for ParseElementRefError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKind => f.write_str("element ref must look like <kind>/<id>"),
            Self::UnknownKind(kind) => {
                write!(f, "unknown element kind {kind:?} (expected state or action)")
            }
            Self::InvalidId(err) => write!(f, "invalid element id: {err}"),
        }
    }
}

impl std::error::Error for ParseElementRefError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidId(err) => Some(err),
            _ => None,
        }
    }
}
