// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::chat_flow::ChatFlow;
use super::ids::BotId;

/// Bot-level settings edited next to the flow (prompt, instructions, linked documents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotProfile {
    id: BotId,
    name: String,
    description: String,
    initial_prompt: Option<String>,
    instructions: Option<String>,
    documents: Vec<String>,
}

impl BotProfile {
    pub fn new(id: BotId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            initial_prompt: None,
            instructions: None,
            documents: Vec::new(),
        }
    }

    pub fn id(&self) -> &BotId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn initial_prompt(&self) -> Option<&str> {
        self.initial_prompt.as_deref()
    }

    pub fn instructions(&self) -> Option<&str> {
        self.instructions.as_deref()
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_initial_prompt<T: Into<String>>(&mut self, initial_prompt: Option<T>) {
        self.initial_prompt = initial_prompt.map(Into::into);
    }

    pub fn set_instructions<T: Into<String>>(&mut self, instructions: Option<T>) {
        self.instructions = instructions.map(Into::into);
    }

    /// Appends a document reference (URL or file name), trimmed.
    pub fn push_document(&mut self, document: &str) -> Result<(), BlankDocument> {
        let document = document.trim();
        if document.is_empty() {
            return Err(BlankDocument);
        }
        self.documents.push(document.to_owned());
        Ok(())
    }

    /// Removes the document at `index`; out-of-range indices are ignored.
    pub fn remove_document(&mut self, index: usize) -> Option<String> {
        (index < self.documents.len()).then(|| self.documents.remove(index))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlankDocument;

impl fmt::Display for BlankDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("document reference must not be blank")
    }
}

impl std::error::Error for BlankDocument {}

/// A bot as the persistence layer sees it: profile plus its chat flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bot {
    profile: BotProfile,
    chat_flow: ChatFlow,
}

impl Bot {
    pub fn new(profile: BotProfile, chat_flow: ChatFlow) -> Self {
        Self { profile, chat_flow }
    }

    pub fn id(&self) -> &BotId {
        self.profile.id()
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut BotProfile {
        &mut self.profile
    }

    pub fn chat_flow(&self) -> &ChatFlow {
        &self.chat_flow
    }

    pub fn into_parts(self) -> (BotProfile, ChatFlow) {
        (self.profile, self.chat_flow)
    }
}
