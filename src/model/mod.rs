// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Domain model: bots and their chat flows.
//!
//! A [`ChatFlow`] is the source of truth for states and actions; everything the editor shows is
//! derived from it.

pub mod alloc;
pub mod bot;
pub mod chat_flow;
pub mod element_ref;
#[cfg(test)]
pub(crate) mod fixtures;
pub mod ids;

pub use alloc::{AllocationError, IdAllocator, SequentialUniquifier, Uniquifier};
pub use bot::{BlankDocument, Bot, BotProfile};
pub use chat_flow::{
    Action, ActionEnd, ActionType, ChatFlow, DanglingEndpoint, IntegrityError,
    ParseActionTypeError, RemovedState, State,
};
pub use element_ref::{ElementKind, ElementRef, ParseElementRefError};
pub use ids::{ActionId, ActionKind, BotId, BotKind, Id, IdError, IdKind, StateId, StateKind};
