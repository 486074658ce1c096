// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The one place interaction events enter.
//!
//! [`Editor`] owns the bot being edited (profile plus [`SyncEngine`]), the selection and the
//! store. Renderers feed it [`EditorEvent`]s and redraw from the returned [`Delta`].

mod config;
mod event;

use std::fmt;

use tracing::{debug, info, warn};

use crate::model::{BlankDocument, Bot, BotId, BotProfile, ChatFlow, ElementRef};
use crate::presentation::PresentationGraph;
use crate::selection::{SelectionController, SelectionError};
use crate::store::{BotStore, StoreError};
use crate::sync::{Delta, SyncEngine, SyncError};

pub use config::EditorConfig;
pub use event::EditorEvent;

/// Merge-patch for the bot-level fields. `None` leaves a field unchanged; `Some(None)` clears an
/// optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BotDetailsPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub initial_prompt: Option<Option<String>>,
    pub instructions: Option<Option<String>>,
}

#[derive(Debug)]
pub enum EditorError {
    /// The editor was opened read-only.
    ReadOnly { action: &'static str },
    BotNotFound { bot_id: BotId },
    BlankDocument,
    Sync(SyncError),
    Selection(SelectionError),
    Store(StoreError),
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly { action } => write!(f, "editor is read-only ({action})"),
            Self::BotNotFound { bot_id } => write!(f, "bot not found ({bot_id})"),
            Self::BlankDocument => write!(f, "{}", BlankDocument),
            Self::Sync(err) => write!(f, "{err}"),
            Self::Selection(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "store error: {err}"),
        }
    }
}

impl std::error::Error for EditorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sync(err) => Some(err),
            Self::Selection(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyncError> for EditorError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

impl From<SelectionError> for EditorError {
    fn from(err: SelectionError) -> Self {
        Self::Selection(err)
    }
}

impl From<StoreError> for EditorError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<BlankDocument> for EditorError {
    fn from(_: BlankDocument) -> Self {
        Self::BlankDocument
    }
}

#[derive(Debug)]
pub struct Editor<S> {
    store: S,
    profile: BotProfile,
    sync: SyncEngine,
    selection: SelectionController,
    config: EditorConfig,
    unsaved: bool,
}

impl<S: BotStore> Editor<S> {
    pub fn new(store: S, bot: Bot, config: EditorConfig) -> Self {
        let (profile, flow) = bot.into_parts();
        Self {
            store,
            profile,
            sync: SyncEngine::new(flow, config.placeholder),
            selection: SelectionController::default(),
            config,
            unsaved: false,
        }
    }

    /// Loads `bot_id` from `store` and opens it.
    pub fn open(store: S, bot_id: &BotId, config: EditorConfig) -> Result<Self, EditorError> {
        let Some(bot) = store.load(bot_id)? else {
            return Err(EditorError::BotNotFound {
                bot_id: bot_id.clone(),
            });
        };
        info!(bot_id = %bot_id, read_only = config.read_only, "opened bot");
        Ok(Self::new(store, bot, config))
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn is_read_only(&self) -> bool {
        self.config.read_only
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    pub fn flow(&self) -> &ChatFlow {
        self.sync.flow()
    }

    pub fn graph(&self) -> &PresentationGraph {
        self.sync.graph()
    }

    pub fn sync(&self) -> &SyncEngine {
        &self.sync
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Returns `true` if the bot changed since it was opened or last saved.
    ///
    /// Node moves do not count: positions are not persisted.
    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }

    /// The bot as it currently stands, including unsaved edits.
    pub fn bot(&self) -> Bot {
        Bot::new(self.profile.clone(), self.sync.flow().clone())
    }

    pub fn handle(&mut self, event: EditorEvent) -> Result<Delta, EditorError> {
        if self.config.read_only {
            if event.is_mutating() {
                return Err(self.refuse(event.name()));
            }
            if event.is_selection() {
                return Ok(Delta::default());
            }
        }

        debug!(event = event.name(), "handling editor event");
        match event {
            EditorEvent::NodeClicked(state_id) => {
                self.selection
                    .select(ElementRef::State(state_id), &self.sync)?;
                Ok(Delta::default())
            }
            EditorEvent::EdgeClicked(action_id) => {
                self.selection
                    .select(ElementRef::Action(action_id), &self.sync)?;
                Ok(Delta::default())
            }
            EditorEvent::PaneClicked | EditorEvent::CloseSelection => {
                self.selection.close();
                Ok(Delta::default())
            }
            EditorEvent::ConnectDragged { source, target } => {
                let delta = self.sync.connect(&source, &target)?.delta;
                self.unsaved = true;
                Ok(delta)
            }
            EditorEvent::NodeMoved { id, position } => {
                Ok(self.sync.move_node(&id, position)?.delta)
            }
            EditorEvent::AddState { position } => {
                let delta = self.sync.add_state(position)?.delta;
                self.unsaved = true;
                Ok(delta)
            }
            EditorEvent::DeleteSelected => {
                let Some(element) = self.selection.selected().cloned() else {
                    return Ok(Delta::default());
                };
                let delta = self.sync.delete_element(&element).delta;
                self.selection.retain_existing(&self.sync);
                self.unsaved |= !delta.is_empty();
                Ok(delta)
            }
            EditorEvent::EditField { field, value } => {
                self.selection.edit(field, &value)?;
                Ok(Delta::default())
            }
            EditorEvent::SaveSelection => {
                let delta = self.selection.save(&mut self.sync)?;
                self.unsaved |= !delta.is_empty();
                Ok(delta)
            }
            EditorEvent::QueryChanged(text) => Ok(self.sync.set_query(&text)),
        }
    }

    /// Hands the current bot to the store. Local edits survive a failed save.
    pub fn save(&mut self) -> Result<(), EditorError> {
        self.ensure_writable("save")?;
        let bot = self.bot();
        match self.store.save(&bot) {
            Ok(()) => {
                self.unsaved = false;
                info!(bot_id = %bot.id(), "saved bot");
                Ok(())
            }
            Err(err) => {
                warn!(bot_id = %bot.id(), error = %err, "save failed; keeping local edits");
                Err(err.into())
            }
        }
    }

    /// Reloads the bot from the store, replacing local edits.
    pub fn reload(&mut self) -> Result<Delta, EditorError> {
        let bot_id = self.profile.id().clone();
        let Some(bot) = self.store.load(&bot_id)? else {
            return Err(EditorError::BotNotFound { bot_id });
        };
        let delta = self.apply_external(bot);
        self.unsaved = false;
        Ok(delta)
    }

    /// Adopts a bot that changed outside the editor.
    ///
    /// Node positions of surviving states are kept. The selection is dropped if its element is
    /// gone.
    pub fn apply_external(&mut self, bot: Bot) -> Delta {
        let (profile, flow) = bot.into_parts();
        self.profile = profile;
        let delta = self.sync.reconcile(flow);
        if self.selection.retain_existing(&self.sync) {
            debug!("selection cleared by external update");
        }
        self.unsaved = true;
        delta
    }

    pub fn set_bot_details(&mut self, patch: BotDetailsPatch) -> Result<(), EditorError> {
        self.ensure_writable("set_bot_details")?;

        if let Some(name) = patch.name {
            self.profile.set_name(name);
        }
        if let Some(description) = patch.description {
            self.profile.set_description(description);
        }
        if let Some(initial_prompt) = patch.initial_prompt {
            self.profile.set_initial_prompt(initial_prompt);
        }
        if let Some(instructions) = patch.instructions {
            self.profile.set_instructions(instructions);
        }
        self.unsaved = true;
        debug!(bot_id = %self.profile.id(), "updated bot details");
        Ok(())
    }

    /// Appends a knowledge document. Surrounding whitespace is trimmed; blank input is refused.
    pub fn add_document(&mut self, document: &str) -> Result<(), EditorError> {
        self.ensure_writable("add_document")?;
        self.profile.push_document(document)?;
        self.unsaved = true;
        Ok(())
    }

    /// Removes the document at `index`. Out-of-range indices are a no-op.
    pub fn remove_document(&mut self, index: usize) -> Result<Option<String>, EditorError> {
        self.ensure_writable("remove_document")?;
        let removed = self.profile.remove_document(index);
        self.unsaved |= removed.is_some();
        Ok(removed)
    }

    fn ensure_writable(&self, action: &'static str) -> Result<(), EditorError> {
        if self.config.read_only {
            return Err(self.refuse(action));
        }
        Ok(())
    }

    fn refuse(&self, action: &'static str) -> EditorError {
        warn!(bot_id = %self.profile.id(), action, "refused edit in read-only mode");
        EditorError::ReadOnly { action }
    }
}
