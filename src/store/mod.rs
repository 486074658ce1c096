// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Persistence for bots.
//!
//! The editor only talks to [`BotStore`]. [`BotFolder`] keeps one JSON file per bot on disk;
//! [`MemoryStore`] keeps bots in a map and backs the demo mode and tests.

pub mod bot_folder;
pub mod memory;

pub use bot_folder::{bot_file_schema, BotFolder, StoreError, WriteDurability};
pub use memory::MemoryStore;

use crate::model::{Bot, BotId};

pub trait BotStore {
    /// Loads the bot with `bot_id`. A bot that was never saved is `Ok(None)`.
    fn load(&self, bot_id: &BotId) -> Result<Option<Bot>, StoreError>;

    /// Persists `bot`, replacing any earlier version with the same id.
    fn save(&mut self, bot: &Bot) -> Result<(), StoreError>;
}
