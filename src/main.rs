// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Botflow CLI entrypoint.
//!
//! Opens a bot from a bot folder and reads editing commands from stdin. Log output goes to
//! stderr and is controlled by `RUST_LOG`.

use std::error::Error;
use std::io;

use botflow::console;
use botflow::editor::{Editor, EditorConfig, EditorError};
use botflow::model::{Bot, BotId, BotProfile, ChatFlow};
use botflow::store::{bot_file_schema, BotFolder, BotStore, MemoryStore, WriteDurability};
use tracing::info;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} <bot-id> [--store <dir>] [--read-only] [--durable-writes]\n  {program} --demo [--read-only]\n  {program} --schema\n\nCommands are read from stdin, one per line (type `help`).\n\nIf --store is omitted, the current working directory is used. A bot id that is not in the\nstore yet starts a new, empty bot (unless --read-only).\n--demo edits a built-in bot in memory; nothing is written to disk.\n--schema prints the JSON Schema of the bot file format.\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    bot_id: Option<String>,
    store_dir: Option<String>,
    read_only: bool,
    durable_writes: bool,
    demo: bool,
    schema: bool,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--demo" => {
                if options.demo {
                    return Err(());
                }
                options.demo = true;
            }
            "--schema" => {
                if options.schema {
                    return Err(());
                }
                options.schema = true;
            }
            "--read-only" => {
                if options.read_only {
                    return Err(());
                }
                options.read_only = true;
            }
            "--store" => {
                if options.store_dir.is_some() {
                    return Err(());
                }
                let dir = args.next().ok_or(())?;
                options.store_dir = Some(dir);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => {
                if options.bot_id.is_some() {
                    return Err(());
                }
                options.bot_id = Some(arg);
            }
        }
    }

    if options.schema && options != (CliOptions { schema: true, ..CliOptions::default() }) {
        return Err(());
    }

    if options.demo
        && (options.bot_id.is_some() || options.store_dir.is_some() || options.durable_writes)
    {
        return Err(());
    }

    if !options.demo && !options.schema && options.bot_id.is_none() {
        return Err(());
    }

    Ok(options)
}

fn open_or_create<S: BotStore>(
    store: S,
    bot_id: &BotId,
    config: EditorConfig,
) -> Result<Editor<S>, EditorError> {
    if config.read_only {
        return Editor::open(store, bot_id, config);
    }
    let bot = match store.load(bot_id)? {
        Some(bot) => bot,
        None => {
            info!(bot_id = %bot_id, "starting a new bot");
            Bot::new(BotProfile::new(bot_id.clone(), bot_id.as_str()), ChatFlow::default())
        }
    };
    Ok(Editor::new(store, bot, config))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "botflow".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if options.schema {
            println!("{}", serde_json::to_string_pretty(&bot_file_schema())?);
            return Ok(());
        }

        let config = EditorConfig {
            read_only: options.read_only,
            ..EditorConfig::default()
        };
        let stdin = io::stdin().lock();
        let stdout = io::stdout().lock();

        if options.demo {
            let mut editor = Editor::new(MemoryStore::new(), console::demo_bot(), config);
            return Ok(console::run(&mut editor, stdin, stdout)?);
        }

        let bot_id = BotId::new(options.bot_id.unwrap_or_default())?;
        let dir = options.store_dir.unwrap_or_else(|| ".".to_owned());
        let folder = if options.durable_writes {
            BotFolder::new(dir).with_durability(WriteDurability::Durable)
        } else {
            BotFolder::new(dir)
        };

        let mut editor = open_or_create(folder, &bot_id, config)?;
        console::run(&mut editor, stdin, stdout)?;

        if editor.has_unsaved_changes() {
            eprintln!("botflow: unsaved changes to {bot_id} were discarded");
        }
        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("botflow: {err}");
        std::process::exit(1);
    }
}
