// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::bot::{Bot, BotProfile};
use super::chat_flow::{Action, ActionType, ChatFlow, State};
use super::ids::{ActionId, BotId, StateId};

pub(crate) fn sid(value: &str) -> StateId {
    StateId::new(value).expect("state id")
}

pub(crate) fn aid(value: &str) -> ActionId {
    ActionId::new(value).expect("action id")
}

fn add_action(flow: &mut ChatFlow, id: &str, source: &str, target: &str, name: &str) {
    flow.insert_action(Action::new_with(
        aid(id),
        sid(source),
        sid(target),
        name,
        "",
        ActionType::Core,
    ))
    .expect("fixture action endpoints exist");
}

/// Greeting bot: greet → ask ⟲ → answer, plus a shortcut greet → bye.
pub(crate) fn greeting_flow() -> ChatFlow {
    let mut flow = ChatFlow::default();

    flow.insert_state(State::new(sid("s:greet"), "Greet", "Say hello to the user"));
    flow.insert_state(State::new(sid("s:ask"), "Ask", "Ask what the user needs"));
    flow.insert_state(State::new(
        sid("s:answer"),
        "Answer",
        "Reply with a description of the product",
    ));
    flow.insert_state(State::new(sid("s:bye"), "Bye", "End the conversation"));

    add_action(&mut flow, "a:greet-ask", "s:greet", "s:ask", "Start");
    add_action(&mut flow, "a:ask-answer", "s:ask", "s:answer", "Understood");
    add_action(&mut flow, "a:retry", "s:ask", "s:ask", "Unclear");
    add_action(&mut flow, "a:greet-bye", "s:greet", "s:bye", "Not interested");

    flow
}

/// `s1 → s2`, `s3 → s1`, `s2 → s3`: every state has one incoming and one outgoing action.
pub(crate) fn triangle_flow() -> ChatFlow {
    let mut flow = ChatFlow::default();

    flow.insert_state(State::new(sid("s1"), "First", "a description"));
    flow.insert_state(State::new(sid("s2"), "Second", "plain"));
    flow.insert_state(State::new(sid("s3"), "Third", "plain"));

    add_action(&mut flow, "a1", "s1", "s2", "one-two");
    add_action(&mut flow, "a2", "s3", "s1", "three-one");
    add_action(&mut flow, "a3", "s2", "s3", "two-three");

    flow
}

pub(crate) fn greeting_bot() -> Bot {
    let mut profile = BotProfile::new(BotId::new("b:greeter").expect("bot id"), "Greeter");
    profile.set_description("Welcomes visitors and answers product questions");
    profile.set_initial_prompt(Some("You are a friendly shop assistant."));
    profile.push_document("faq.md").expect("document");
    Bot::new(profile, greeting_flow())
}
