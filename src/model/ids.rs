// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Kind-tagged ids for bots, states and actions.
//!
//! The kind name is shared by everything that spells an id out: validation errors, the
//! `state/<id>` element refs and the `<kind>-<n>` ids minted by the allocator.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::str::FromStr;

/// What an [`Id`] names.
pub trait IdKind {
    const NAME: &'static str;
}

pub enum BotKind {}
pub enum StateKind {}
pub enum ActionKind {}

impl IdKind for BotKind {
    const NAME: &'static str = "bot";
}

impl IdKind for StateKind {
    const NAME: &'static str = "state";
}

impl IdKind for ActionKind {
    const NAME: &'static str = "action";
}

pub type BotId = Id<BotKind>;
pub type StateId = Id<StateKind>;
pub type ActionId = Id<ActionKind>;

/// Id of a `K`. Any non-empty text without `/`: bot ids name files and element ids sit after
/// the `/` of an element ref.
pub struct Id<K> {
    value: String,
    _kind: PhantomData<fn() -> K>,
}

impl<K: IdKind> Id<K> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty { kind: K::NAME });
        }
        if value.contains('/') {
            return Err(IdError::ContainsSlash {
                kind: K::NAME,
                value,
            });
        }
        Ok(Self {
            value,
            _kind: PhantomData,
        })
    }

    pub fn kind(&self) -> &'static str {
        K::NAME
    }
}

impl<K> Id<K> {
    pub fn as_str(&self) -> &str {
        &self.value
    }
}

// Hand-written so the uninhabited kind types need no derives of their own.
impl<K> Clone for Id<K> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _kind: PhantomData,
        }
    }
}

impl<K> PartialEq for Id<K> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<K> Eq for Id<K> {}

impl<K> PartialOrd for Id<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K> Ord for Id<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

// Must hash like `str` for the `Borrow<str>` lookups in `ChatFlow`.
impl<K> Hash for Id<K> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<K> Borrow<str> for Id<K> {
    fn borrow(&self) -> &str {
        &self.value
    }
}

impl<K: IdKind> fmt::Debug for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:?}", K::NAME, self.value)
    }
}

impl<K> fmt::Display for Id<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<K: IdKind> FromStr for Id<K> {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdError {
    Empty { kind: &'static str },
    ContainsSlash { kind: &'static str, value: String },
}

impl IdError {
    /// Name of the id kind that failed validation.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Empty { kind } | Self::ContainsSlash { kind, .. } => kind,
        }
    }
}

impl fmt::Display for IdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { kind } => write!(f, "{kind} id must not be empty"),
            Self::ContainsSlash { kind, value } => {
                write!(f, "{kind} id {value:?} must not contain '/'")
            }
        }
    }
}

impl std::error::Error for IdError {}
