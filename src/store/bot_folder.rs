// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::fs;
use std::io;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::BotStore;
use crate::model::{
    Action, ActionType, Bot, BotId, BotProfile, ChatFlow, Id, IdError, IdKind, IntegrityError,
    State,
};

const BOT_FILE_SUFFIX: &str = ".bot.json";

#[derive(Debug)]
pub enum StoreError {
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidId {
        field: &'static str,
        value: String,
        source: Box<IdError>,
    },
    /// The file parsed, but its chat flow is not referentially sound.
    Integrity {
        path: PathBuf,
        source: Box<IntegrityError>,
    },
    /// The file belongs to a different bot than the one requested.
    BotIdMismatch {
        path: PathBuf,
        expected: BotId,
        found: BotId,
    },
    SymlinkRefused {
        path: PathBuf,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "io error at {path:?}: {source}"),
            Self::Json { path, source } => write!(f, "json error at {path:?}: {source}"),
            Self::InvalidId {
                field,
                value,
                source,
            } => write!(f, "invalid id for {field}: {value:?}: {source}"),
            Self::Integrity { path, source } => {
                write!(f, "inconsistent chat flow in {path:?}: {source}")
            }
            Self::BotIdMismatch {
                path,
                expected,
                found,
            } => write!(f, "{path:?} holds bot {found}, expected {expected}"),
            Self::SymlinkRefused { path } => {
                write!(f, "refusing to write through symlink at {path:?}")
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
            Self::InvalidId { source, .. } => Some(source),
            Self::Integrity { source, .. } => Some(source),
            Self::BotIdMismatch { .. } => None,
            Self::SymlinkRefused { .. } => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WriteDurability {
    /// Writes a temp file and renames it into place. No fsync.
    #[default]
    BestEffort,

    /// Additionally fsyncs the file before the rename and the directory after it.
    ///
    /// Exact guarantees are platform/filesystem-dependent.
    Durable,
}

/// Directory holding one `<bot-id>.bot.json` file per bot.
#[derive(Debug, Clone)]
pub struct BotFolder {
    root: PathBuf,
    durability: WriteDurability,
}

impl BotFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            durability: WriteDurability::default(),
        }
    }

    pub fn with_durability(mut self, durability: WriteDurability) -> Self {
        self.durability = durability;
        self
    }

    pub fn durability(&self) -> WriteDurability {
        self.durability
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn bot_path(&self, bot_id: &BotId) -> PathBuf {
        self.root.join(format!(
            "{}{BOT_FILE_SUFFIX}",
            encode_file_name_segment(bot_id.as_str())
        ))
    }
}

impl BotStore for BotFolder {
    fn load(&self, bot_id: &BotId) -> Result<Option<Bot>, StoreError> {
        let path = self.bot_path(bot_id);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(source) if source.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let bot_json: BotJson =
            serde_json::from_str(&contents).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;
        let bot = bot_from_json(&path, bot_json)?;

        if bot.id() != bot_id {
            return Err(StoreError::BotIdMismatch {
                path,
                expected: bot_id.clone(),
                found: bot.id().clone(),
            });
        }

        info!(
            bot_id = %bot_id,
            states = bot.chat_flow().states().len(),
            actions = bot.chat_flow().actions().len(),
            "loaded bot"
        );
        Ok(Some(bot))
    }

    fn save(&mut self, bot: &Bot) -> Result<(), StoreError> {
        let path = self.bot_path(bot.id());
        let contents =
            serde_json::to_string_pretty(&bot_to_json(bot)).map_err(|source| StoreError::Json {
                path: path.clone(),
                source,
            })?;

        write_atomic(
            &self.root,
            &path,
            format!("{contents}\n").as_bytes(),
            self.durability,
        )?;

        info!(bot_id = %bot.id(), path = ?path, "saved bot");
        Ok(())
    }
}

/// JSON Schema of the `<bot-id>.bot.json` file format.
pub fn bot_file_schema() -> schemars::Schema {
    schemars::schema_for!(BotJson)
}

/// A bot as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct BotJson {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    initial_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instructions: Option<String>,
    #[serde(default)]
    documents: Vec<String>,
    #[serde(default)]
    chat_flow: ChatFlowJson,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
struct ChatFlowJson {
    #[serde(default)]
    states: Vec<StateJson>,
    #[serde(default)]
    actions: Vec<ActionJson>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct StateJson {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
struct ActionJson {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "type", default)]
    action_type: ActionTypeJson,
    source: String,
    target: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
enum ActionTypeJson {
    #[default]
    Core,
    Custom,
}

impl From<ActionType> for ActionTypeJson {
    fn from(action_type: ActionType) -> Self {
        match action_type {
            ActionType::Core => Self::Core,
            ActionType::Custom => Self::Custom,
        }
    }
}

impl From<ActionTypeJson> for ActionType {
    fn from(action_type: ActionTypeJson) -> Self {
        match action_type {
            ActionTypeJson::Core => Self::Core,
            ActionTypeJson::Custom => Self::Custom,
        }
    }
}

fn bot_to_json(bot: &Bot) -> BotJson {
    let profile = bot.profile();
    let flow = bot.chat_flow();

    BotJson {
        id: profile.id().to_string(),
        name: profile.name().to_owned(),
        description: profile.description().to_owned(),
        initial_prompt: profile.initial_prompt().map(str::to_owned),
        instructions: profile.instructions().map(str::to_owned),
        documents: profile.documents().to_vec(),
        chat_flow: ChatFlowJson {
            states: flow
                .states()
                .values()
                .map(|state| StateJson {
                    id: state.id().to_string(),
                    name: state.name().to_owned(),
                    description: state.description().to_owned(),
                })
                .collect(),
            actions: flow
                .actions()
                .values()
                .map(|action| ActionJson {
                    id: action.id().to_string(),
                    name: action.name().to_owned(),
                    description: action.description().to_owned(),
                    action_type: action.action_type().into(),
                    source: action.source().to_string(),
                    target: action.target().to_string(),
                })
                .collect(),
        },
    }
}

fn bot_from_json(path: &Path, bot_json: BotJson) -> Result<Bot, StoreError> {
    let integrity = |source: IntegrityError| StoreError::Integrity {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let mut profile = BotProfile::new(parse_id("id", bot_json.id)?, bot_json.name);
    profile.set_description(bot_json.description);
    profile.set_initial_prompt(bot_json.initial_prompt);
    profile.set_instructions(bot_json.instructions);
    // Blank documents are dropped rather than rejected; the editor never writes them.
    for document in &bot_json.documents {
        let _ = profile.push_document(document);
    }

    let mut flow = ChatFlow::default();
    for state_json in bot_json.chat_flow.states {
        let state_id = parse_id("chat_flow.states[].id", state_json.id)?;
        let state = State::new(state_id.clone(), state_json.name, state_json.description);
        if flow.insert_state(state).is_some() {
            return Err(integrity(IntegrityError::DuplicateState { state_id }));
        }
    }
    for action_json in bot_json.chat_flow.actions {
        let action_id = parse_id("chat_flow.actions[].id", action_json.id)?;
        let action = Action::new_with(
            action_id.clone(),
            parse_id("chat_flow.actions[].source", action_json.source)?,
            parse_id("chat_flow.actions[].target", action_json.target)?,
            action_json.name,
            action_json.description,
            action_json.action_type.into(),
        );
        if flow
            .insert_action(action)
            .map_err(|err| integrity(err.into()))?
            .is_some()
        {
            return Err(integrity(IntegrityError::DuplicateAction { action_id }));
        }
    }

    Ok(Bot::new(profile, flow))
}

fn parse_id<K: IdKind>(field: &'static str, value: String) -> Result<Id<K>, StoreError> {
    Id::new(value.clone()).map_err(|source| StoreError::InvalidId {
        field,
        value,
        source: Box::new(source),
    })
}

/// Escapes ids that are not safe as a file name on every platform as `~<hex bytes>`.
fn encode_file_name_segment(segment: &str) -> String {
    if !needs_file_name_encoding(segment) {
        return segment.to_owned();
    }

    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(1 + segment.len().saturating_mul(2));
    out.push('~');
    for &b in segment.as_bytes() {
        out.push(HEX[(b >> 4) as usize] as char);
        out.push(HEX[(b & 0x0f) as usize] as char);
    }
    out
}

fn needs_file_name_encoding(segment: &str) -> bool {
    if segment.starts_with(['~', '.']) || segment.ends_with([' ', '.']) {
        return true;
    }

    let base = segment.split('.').next().unwrap_or(segment);
    if is_windows_device_name(base) {
        return true;
    }

    segment.chars().any(|ch| {
        matches!(ch, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*')
            || ch <= '\u{1f}'
            || ch == '\u{7f}'
    })
}

fn is_windows_device_name(base: &str) -> bool {
    let base = base.to_ascii_uppercase();
    if matches!(base.as_str(), "CON" | "PRN" | "AUX" | "NUL") {
        return true;
    }
    ["COM", "LPT"].iter().any(|prefix| {
        base.strip_prefix(prefix)
            .is_some_and(|num| matches!(num, "1" | "2" | "3" | "4" | "5" | "6" | "7" | "8" | "9"))
    })
}

fn rename_overwrite(from: &Path, to: &Path) -> io::Result<()> {
    #[cfg(windows)]
    {
        match fs::rename(from, to) {
            Ok(()) => Ok(()),
            Err(err)
                if matches!(
                    err.kind(),
                    io::ErrorKind::AlreadyExists | io::ErrorKind::PermissionDenied
                ) =>
            {
                let _ = fs::remove_file(to);
                fs::rename(from, to)
            }
            Err(err) => Err(err),
        }
    }

    #[cfg(not(windows))]
    {
        fs::rename(from, to)
    }
}

fn write_atomic(
    root: &Path,
    path: &Path,
    contents: &[u8],
    durability: WriteDurability,
) -> Result<(), StoreError> {
    fs::create_dir_all(root).map_err(|source| StoreError::Io {
        path: root.to_path_buf(),
        source,
    })?;

    match fs::symlink_metadata(path) {
        Ok(md) if md.file_type().is_symlink() => {
            return Err(StoreError::SymlinkRefused {
                path: path.to_path_buf(),
            });
        }
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(source) => {
            return Err(StoreError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let Some(file_name) = path.file_name() else {
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source: io::Error::other("path has no file name"),
        });
    };

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let tmp_path = root.join(format!(
        ".botflow.tmp.{}.{}",
        file_name.to_string_lossy(),
        nanos
    ));

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&tmp_path)
        .map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;

    let written = file.write_all(contents).and_then(|()| {
        if durability == WriteDurability::Durable {
            file.sync_all()
        } else {
            Ok(())
        }
    });
    drop(file);
    if let Err(source) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: tmp_path,
            source,
        });
    }

    if let Err(source) = rename_overwrite(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(StoreError::Io {
            path: path.to_path_buf(),
            source,
        });
    }

    if durability == WriteDurability::Durable {
        #[cfg(unix)]
        {
            let dir = fs::File::open(root).map_err(|source| StoreError::Io {
                path: root.to_path_buf(),
                source,
            })?;
            dir.sync_all().map_err(|source| StoreError::Io {
                path: root.to_path_buf(),
                source,
            })?;
        }
    }

    Ok(())
}
