// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Line-oriented front end for the editor.
//!
//! Each input line is one command; the console translates it into an [`EditorEvent`] and prints
//! what changed. `show` lists the visible part of the canvas.

use std::fmt;
use std::fmt::Write as _;
use std::io::{self, BufRead, Write};

use crate::editor::{Editor, EditorEvent};
use crate::model::{
    Action, ActionId, ActionType, Bot, BotId, BotProfile, ChatFlow, ElementRef, State, StateId,
};
use crate::presentation::Position;
use crate::selection::{DraftField, ParseDraftFieldError};
use crate::store::BotStore;
use crate::sync::Delta;

pub const HELP: &str = "\
commands:
  add <x> <y>                 add a state at canvas position
  connect <source> <target>   draw an action between two states
  select <id>                 select a state or action (or state/<id>, action/<id>)
  pane                        click the empty canvas (clears the selection)
  set <field> <value>         edit name, description or type of the selection
  save-selection              commit the edited fields
  close                       close the properties panel
  delete                      delete the selected element
  move <id> <x> <y>           move a state on the canvas
  filter [text]               show only states matching text
  show                        list the visible canvas
  save                        save the bot
  help                        print this help
  quit                        leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Event(EditorEvent),
    Select(String),
    Show,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    UnknownCommand(String),
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    InvalidNumber(String),
    InvalidId(String),
    InvalidField(ParseDraftFieldError),
}

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCommand(command) => write!(f, "unknown command {command:?} (try help)"),
            Self::MissingArgument { command, argument } => {
                write!(f, "{command}: missing <{argument}>")
            }
            Self::InvalidNumber(value) => write!(f, "not a number: {value:?}"),
            Self::InvalidId(value) => write!(f, "invalid id: {value:?}"),
            Self::InvalidField(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ParseCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidField(err) => Some(err),
            _ => None,
        }
    }
}

impl Command {
    /// Parses one input line. Blank lines and `#` comments are `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>, ParseCommandError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let (name, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim_start();
        let mut args = rest.split_whitespace();

        let command = match name {
            "add" => Self::Event(EditorEvent::AddState {
                position: parse_position("add", &mut args)?,
            }),
            "connect" => Self::Event(EditorEvent::ConnectDragged {
                source: parse_state_id(required("connect", "source", args.next())?)?,
                target: parse_state_id(required("connect", "target", args.next())?)?,
            }),
            "select" => Self::Select(required("select", "id", args.next())?.to_owned()),
            "pane" => Self::Event(EditorEvent::PaneClicked),
            "set" => {
                let field = required("set", "field", args.next())?;
                let field = field
                    .parse::<DraftField>()
                    .map_err(ParseCommandError::InvalidField)?;
                let value = rest
                    .split_once(' ')
                    .map_or("", |(_, value)| value.trim_start());
                Self::Event(EditorEvent::EditField {
                    field,
                    value: value.to_owned(),
                })
            }
            "save-selection" => Self::Event(EditorEvent::SaveSelection),
            "close" => Self::Event(EditorEvent::CloseSelection),
            "delete" => Self::Event(EditorEvent::DeleteSelected),
            "move" => {
                let id = parse_state_id(required("move", "id", args.next())?)?;
                Self::Event(EditorEvent::NodeMoved {
                    id,
                    position: parse_position("move", &mut args)?,
                })
            }
            "filter" => Self::Event(EditorEvent::QueryChanged(rest.to_owned())),
            "show" => Self::Show,
            "save" => Self::Save,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => return Err(ParseCommandError::UnknownCommand(other.to_owned())),
        };
        Ok(Some(command))
    }
}

fn required<'a>(
    command: &'static str,
    argument: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, ParseCommandError> {
    value.ok_or(ParseCommandError::MissingArgument { command, argument })
}

fn parse_state_id(value: &str) -> Result<StateId, ParseCommandError> {
    StateId::new(value).map_err(|_| ParseCommandError::InvalidId(value.to_owned()))
}

fn parse_position<'a>(
    command: &'static str,
    args: &mut impl Iterator<Item = &'a str>,
) -> Result<Position, ParseCommandError> {
    let mut coordinate = |argument| {
        let raw = required(command, argument, args.next())?;
        raw.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| ParseCommandError::InvalidNumber(raw.to_owned()))
    };
    let x = coordinate("x")?;
    let y = coordinate("y")?;
    Ok(Position::new(x, y))
}

/// Resolves `state/<id>`, `action/<id>` or a bare id against the open flow.
///
/// A bare id that names neither a state nor an action resolves to a state click, which the editor
/// reports as not found.
fn resolve_selection(flow: &ChatFlow, raw: &str) -> Result<EditorEvent, ParseCommandError> {
    if raw.contains('/') {
        return match ElementRef::parse(raw) {
            Ok(ElementRef::State(state_id)) => Ok(EditorEvent::NodeClicked(state_id)),
            Ok(ElementRef::Action(action_id)) => Ok(EditorEvent::EdgeClicked(action_id)),
            Err(_) => Err(ParseCommandError::InvalidId(raw.to_owned())),
        };
    }

    match flow.actions().get(raw) {
        Some(action) if !flow.states().contains_key(raw) => {
            Ok(EditorEvent::EdgeClicked(action.id().clone()))
        }
        _ => parse_state_id(raw).map(EditorEvent::NodeClicked),
    }
}

/// Runs commands from `input` until it ends or `quit` is read.
pub fn run<S: BotStore>(
    editor: &mut Editor<S>,
    input: impl BufRead,
    mut output: impl Write,
) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                writeln!(output, "error: {err}")?;
                continue;
            }
        };

        match command {
            Command::Quit => break,
            Command::Help => writeln!(output, "{HELP}")?,
            Command::Show => write!(output, "{}", render_listing(editor))?,
            Command::Save => match editor.save() {
                Ok(()) => writeln!(output, "saved {}", editor.profile().id())?,
                Err(err) => writeln!(output, "error: {err}")?,
            },
            Command::Select(raw) => {
                let event = match resolve_selection(editor.flow(), &raw) {
                    Ok(event) => event,
                    Err(err) => {
                        writeln!(output, "error: {err}")?;
                        continue;
                    }
                };
                dispatch(editor, event, &mut output)?;
            }
            Command::Event(event) => dispatch(editor, event, &mut output)?,
        }
    }
    output.flush()
}

fn dispatch<S: BotStore>(
    editor: &mut Editor<S>,
    event: EditorEvent,
    output: &mut impl Write,
) -> io::Result<()> {
    match editor.handle(event) {
        Ok(delta) if delta.is_empty() => Ok(()),
        Ok(delta) => writeln!(output, "{}", summarize(&delta)),
        Err(err) => writeln!(output, "error: {err}"),
    }
}

/// One-line summary such as `+action/action-4 ~state/s1`.
pub fn summarize(delta: &Delta) -> String {
    let mut out = String::new();
    for (sign, elements) in [('+', &delta.added), ('-', &delta.removed), ('~', &delta.updated)] {
        for element in elements {
            if !out.is_empty() {
                out.push(' ');
            }
            let _ = write!(out, "{sign}{element}");
        }
    }
    out
}

/// Plain-text listing of the bot header, the selection and the visible canvas.
pub fn render_listing<S: BotStore>(editor: &Editor<S>) -> String {
    let profile = editor.profile();
    let graph = editor.graph();
    let mut out = String::new();

    let _ = writeln!(
        out,
        "bot {} {:?}{}{}",
        profile.id(),
        profile.name(),
        if editor.is_read_only() { " [read-only]" } else { "" },
        if editor.has_unsaved_changes() { " [unsaved]" } else { "" },
    );
    if !editor.sync().query().is_empty() {
        let _ = writeln!(
            out,
            "filter: {} of {} states visible",
            graph.visible_nodes().count(),
            graph.nodes().len()
        );
    }
    if let Some(selected) = editor.selection().selected() {
        let dirty = if editor.selection().is_dirty() { " (edited)" } else { "" };
        let _ = writeln!(out, "selected: {selected}{dirty}");
    }

    let _ = writeln!(out, "states:");
    for node in graph.visible_nodes() {
        let position = node.position();
        let _ = writeln!(
            out,
            "  {} {:?} @ ({}, {})",
            node.id(),
            node.payload().name,
            position.x,
            position.y
        );
    }
    let _ = writeln!(out, "actions:");
    for edge in graph.visible_edges() {
        let _ = writeln!(
            out,
            "  {} {} -> {} {:?} [{}]",
            edge.id(),
            edge.source(),
            edge.target(),
            edge.payload().name,
            edge.payload().action_type
        );
    }
    out
}

/// Small support bot used by `--demo`.
pub fn demo_bot() -> Bot {
    fn sid(value: &str) -> StateId {
        StateId::new(value).expect("state id")
    }

    let mut profile = BotProfile::new(BotId::new("demo").expect("bot id"), "Support demo");
    profile.set_description("Routes customers to billing or technical help");
    profile.set_initial_prompt(Some("You are a patient support agent."));

    let mut flow = ChatFlow::default();
    for (id, name, description) in [
        ("welcome", "Welcome", "Greet the customer and ask for the topic"),
        ("billing", "Billing", "Answer invoice and payment questions"),
        ("tech", "Technical", "Collect a description of the problem"),
        ("goodbye", "Goodbye", "Close the conversation"),
    ] {
        flow.insert_state(State::new(sid(id), name, description));
    }

    for (id, source, target, name, action_type) in [
        ("to-billing", "welcome", "billing", "Billing topic", ActionType::Core),
        ("to-tech", "welcome", "tech", "Technical topic", ActionType::Core),
        ("escalate", "tech", "tech", "Ask again", ActionType::Custom),
        ("billing-done", "billing", "goodbye", "Resolved", ActionType::Core),
        ("tech-done", "tech", "goodbye", "Resolved", ActionType::Core),
    ] {
        let action = Action::new_with(
            ActionId::new(id).expect("action id"),
            sid(source),
            sid(target),
            name,
            "",
            action_type,
        );
        flow.insert_action(action)
            .expect("demo actions reference demo states");
    }

    Bot::new(profile, flow)
}
