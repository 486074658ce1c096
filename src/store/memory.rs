// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeMap;

use super::{BotStore, StoreError};
use crate::model::{Bot, BotId};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    bots: BTreeMap<BotId, Bot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bot(mut self, bot: Bot) -> Self {
        self.bots.insert(bot.id().clone(), bot);
        self
    }

    pub fn get(&self, bot_id: &BotId) -> Option<&Bot> {
        self.bots.get(bot_id)
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}

impl BotStore for MemoryStore {
    fn load(&self, bot_id: &BotId) -> Result<Option<Bot>, StoreError> {
        Ok(self.bots.get(bot_id).cloned())
    }

    fn save(&mut self, bot: &Bot) -> Result<(), StoreError> {
        self.bots.insert(bot.id().clone(), bot.clone());
        Ok(())
    }
}
