// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Botflow: editor core for chatbot conversation flows.
//!
//! A bot's [`model::ChatFlow`] (states and the actions between them) is the source of truth.
//! [`sync::SyncEngine`] keeps a positioned [`presentation::PresentationGraph`] in lockstep with
//! it, [`query`] filters what is shown, [`selection`] holds the properties-panel draft, and
//! [`editor::Editor`] ties them together behind one event entry point.

pub mod console;
pub mod editor;
pub mod model;
pub mod presentation;
pub mod query;
pub mod selection;
pub mod store;
pub mod sync;
