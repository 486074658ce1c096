// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Id allocation for new states and actions.
//!
//! Ids have the shape `<kind>-<uniquifier>`, e.g. `state-3` or `action-12`. The default
//! uniquifier is a counter seeded past every numeric suffix already present in the flow. Each
//! candidate is checked against the flow and a taken one is skipped, so with the counter a
//! collision cannot happen: among `len + 1` distinct candidates at least one is free.

use std::fmt;

use super::chat_flow::ChatFlow;
use super::ids::{ActionId, ActionKind, Id, IdError, IdKind, StateId, StateKind};

/// Source of the part of an id that follows the kind prefix.
pub trait Uniquifier: fmt::Debug {
    /// Returns the next candidate. Consecutive candidates should differ.
    fn next_uniquifier(&mut self) -> String;

    /// Called with every id in the flow whenever the allocator is (re)seeded.
    fn observe(&mut self, _existing_id: &str) {}
}

/// Counts up from the highest numeric suffix seen, wrapping to 0 after `u64::MAX`.
#[derive(Debug, Clone, Default)]
pub struct SequentialUniquifier {
    next: u64,
}

impl SequentialUniquifier {
    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Uniquifier for SequentialUniquifier {
    fn next_uniquifier(&mut self) -> String {
        let value = self.next;
        self.next = value.checked_add(1).unwrap_or(0);
        value.to_string()
    }

    fn observe(&mut self, existing_id: &str) {
        let suffix = existing_id
            .rsplit_once('-')
            .map_or(existing_id, |(_, suffix)| suffix);
        // `u64::MAX` has no successor; allocation skips it if the counter lands there.
        if let Some(after) = suffix.parse::<u64>().ok().and_then(|used| used.checked_add(1)) {
            self.next = self.next.max(after);
        }
    }
}

#[derive(Debug)]
pub struct IdAllocator {
    uniquifier: Box<dyn Uniquifier>,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::with_uniquifier(SequentialUniquifier::default())
    }
}

impl IdAllocator {
    pub fn with_uniquifier(uniquifier: impl Uniquifier + 'static) -> Self {
        Self {
            uniquifier: Box::new(uniquifier),
        }
    }

    pub fn seeded_from(flow: &ChatFlow) -> Self {
        let mut allocator = Self::default();
        allocator.reseed(flow);
        allocator
    }

    /// Lets the uniquifier see every id currently in `flow`.
    pub fn reseed(&mut self, flow: &ChatFlow) {
        for state_id in flow.states().keys() {
            self.uniquifier.observe(state_id.as_str());
        }
        for action_id in flow.actions().keys() {
            self.uniquifier.observe(action_id.as_str());
        }
    }

    pub fn allocate_state_id(&mut self, flow: &ChatFlow) -> Result<StateId, AllocationError> {
        self.allocate::<StateKind>(flow)
    }

    pub fn allocate_action_id(&mut self, flow: &ChatFlow) -> Result<ActionId, AllocationError> {
        self.allocate::<ActionKind>(flow)
    }

    fn allocate<K: IdKind>(&mut self, flow: &ChatFlow) -> Result<Id<K>, AllocationError> {
        // State and action ids share one namespace so a bare id never names two elements.
        let attempts = flow.states().len() + flow.actions().len() + 1;
        let mut last = String::new();
        for _ in 0..attempts {
            let raw = format!("{}-{}", K::NAME, self.uniquifier.next_uniquifier());
            if !flow.contains_raw_id(&raw) {
                return Id::new(raw.clone())
                    .map_err(|source| AllocationError::InvalidId { id: raw, source });
            }
            last = raw;
        }
        Err(AllocationError::Collision { id: last })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Every candidate was already in use. Only a uniquifier that repeats itself gets here.
    Collision { id: String },
    InvalidId { id: String, source: IdError },
}

impl fmt::Display for AllocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collision { id } => write!(f, "allocated id {id} is already in use"),
            Self::InvalidId { id, source } => write!(f, "allocated id {id:?} is invalid: {source}"),
        }
    }
}

impl std::error::Error for AllocationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Collision { .. } => None,
            Self::InvalidId { source, .. } => Some(source),
        }
    }
}
