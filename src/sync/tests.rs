// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use rstest::{fixture, rstest};

use crate::model::fixtures::{aid, greeting_flow, sid, triangle_flow};
use crate::model::{
    Action, ActionType, AllocationError, ChatFlow, ElementRef, IdAllocator, State, Uniquifier,
};
use crate::presentation::{PlaceholderLayout, Position, PositionMap};

use super::{project_from_domain, ActionPatch, StatePatch, SyncEngine, SyncError};

#[fixture]
fn triangle() -> SyncEngine {
    SyncEngine::new(triangle_flow(), PlaceholderLayout::default())
}

#[fixture]
fn greeting() -> SyncEngine {
    SyncEngine::new(greeting_flow(), PlaceholderLayout::default())
}

fn assert_models_agree(engine: &SyncEngine) {
    let flow = engine.flow();
    let graph = engine.graph();

    assert_eq!(
        flow.states().keys().collect::<Vec<_>>(),
        graph.nodes().keys().collect::<Vec<_>>()
    );
    assert_eq!(
        flow.actions().keys().collect::<Vec<_>>(),
        graph.edges().keys().collect::<Vec<_>>()
    );
    assert_eq!(&graph.to_chat_flow().expect("graph is consistent"), flow);
}

#[derive(Debug)]
struct Fixed(&'static str);

impl Uniquifier for Fixed {
    fn next_uniquifier(&mut self) -> String {
        self.0.to_owned()
    }
}

#[test]
fn projection_yields_one_node_per_state_and_one_edge_per_action() {
    let flow = greeting_flow();
    let graph = project_from_domain(&flow, &PositionMap::new(), &PlaceholderLayout::default());

    assert_eq!(graph.nodes().len(), 4);
    assert_eq!(graph.edges().len(), 4);

    let ask = graph.node(&sid("s:ask")).expect("ask node");
    assert_eq!(ask.payload().name, "Ask");
    assert_eq!(ask.payload().description, "Ask what the user needs");
    assert!(ask.visible());

    let retry = graph.edge(&aid("a:retry")).expect("retry edge");
    assert_eq!(retry.source(), &sid("s:ask"));
    assert_eq!(retry.target(), &sid("s:ask"));
    assert_eq!(retry.payload().name, "Unclear");
    assert_eq!(retry.payload().action_type, ActionType::Core);
}

#[test]
fn projection_round_trips_back_to_the_same_flow() {
    let flow = greeting_flow();
    let graph = project_from_domain(&flow, &PositionMap::new(), &PlaceholderLayout::default());

    assert_eq!(graph.to_chat_flow(), Ok(flow));
}

#[test]
fn projection_reuses_known_positions_and_places_new_states() {
    let flow = greeting_flow();
    let mut prior = PositionMap::new();
    prior.insert(sid("s:ask"), Position::new(-40.0, 512.5));

    let graph = project_from_domain(&flow, &prior, &PlaceholderLayout::default());

    assert_eq!(
        graph.node(&sid("s:ask")).map(|n| n.position()),
        Some(Position::new(-40.0, 512.5))
    );
    assert_eq!(
        graph.node(&sid("s:greet")).map(|n| n.position()),
        Some(Position::new(0.0, 0.0))
    );
    assert_eq!(
        graph.node(&sid("s:bye")).map(|n| n.position()),
        Some(Position::new(0.0, 150.0))
    );
}

#[rstest]
fn deleting_a_state_cascades_to_its_actions_in_both_models(mut triangle: SyncEngine) {
    let result = triangle.delete_element(&ElementRef::State(sid("s1")));

    assert!(!triangle.flow().contains_state(&sid("s1")));
    assert!(!triangle.flow().contains_action(&aid("a1")));
    assert!(!triangle.flow().contains_action(&aid("a2")));
    assert!(triangle.flow().contains_action(&aid("a3")));
    assert!(triangle.graph().edge(&aid("a3")).is_some());
    assert_models_agree(&triangle);

    assert_eq!(
        result.delta.removed,
        vec![
            ElementRef::State(sid("s1")),
            ElementRef::Action(aid("a1")),
            ElementRef::Action(aid("a2")),
        ]
    );
    assert_eq!(result.new_rev, 1);
}

#[rstest]
fn deleting_an_action_leaves_its_states(mut triangle: SyncEngine) {
    triangle.delete_element(&ElementRef::Action(aid("a3")));

    assert_eq!(triangle.flow().states().len(), 3);
    assert_eq!(triangle.flow().actions().len(), 2);
    assert!(triangle.graph().edge(&aid("a3")).is_none());
    assert_models_agree(&triangle);
}

#[rstest]
fn deleting_an_unknown_element_is_a_no_op(mut triangle: SyncEngine) {
    let before = triangle.flow().clone();

    let state = triangle.delete_element(&ElementRef::State(sid("ghost")));
    let action = triangle.delete_element(&ElementRef::Action(aid("ghost")));

    assert!(state.delta.is_empty());
    assert!(action.delta.is_empty());
    assert_eq!(triangle.rev(), 0);
    assert_eq!(triangle.flow(), &before);
}

#[rstest]
fn deleting_twice_is_idempotent(mut triangle: SyncEngine) {
    triangle.delete_element(&ElementRef::State(sid("s2")));
    let after_first = triangle.flow().clone();

    let second = triangle.delete_element(&ElementRef::State(sid("s2")));

    assert!(second.delta.is_empty());
    assert_eq!(triangle.flow(), &after_first);
}

#[rstest]
fn connect_creates_one_core_action_in_both_models(mut triangle: SyncEngine) {
    let result = triangle.connect(&sid("s1"), &sid("s2")).expect("connect");
    let action = result.value;

    assert_eq!(action.source(), &sid("s1"));
    assert_eq!(action.target(), &sid("s2"));
    assert_eq!(action.action_type(), ActionType::Core);
    assert_eq!(action.name(), "New action");
    assert_eq!(action.description(), "");
    assert!(!["a1", "a2", "a3", "s1", "s2", "s3"].contains(&action.id().as_str()));

    assert_eq!(triangle.flow().actions().len(), 4);
    let edge = triangle.graph().edge(action.id()).expect("edge");
    assert_eq!(edge.payload().name, "New action");
    assert_eq!(result.delta.added, vec![ElementRef::Action(action.id().clone())]);
    assert_models_agree(&triangle);
}

#[rstest]
fn connect_to_a_missing_state_changes_nothing(mut triangle: SyncEngine) {
    let before = triangle.graph().clone();

    let err = triangle
        .connect(&sid("s1"), &sid("sX"))
        .expect_err("missing target");

    assert_eq!(
        err,
        SyncError::InvalidConnection {
            source_id: sid("s1"),
            target_id: sid("sX"),
            missing: sid("sX"),
        }
    );
    assert_eq!(triangle.flow().actions().len(), 3);
    assert_eq!(triangle.graph(), &before);
    assert_eq!(triangle.rev(), 0);
}

#[rstest]
fn rejected_connection_names_the_endpoint_that_is_missing(mut triangle: SyncEngine) {
    let from_missing = triangle
        .connect(&sid("sX"), &sid("s2"))
        .expect_err("missing source");
    let both_missing = triangle
        .connect(&sid("sY"), &sid("sZ"))
        .expect_err("missing both");

    assert!(matches!(
        from_missing,
        SyncError::InvalidConnection { ref missing, .. } if missing == &sid("sX")
    ));
    assert!(matches!(
        both_missing,
        SyncError::InvalidConnection { ref missing, .. } if missing == &sid("sY")
    ));
    assert_eq!(
        from_missing.to_string(),
        "cannot connect sX -> s2: state sX does not exist"
    );

    let added = triangle.connect(&sid("s1"), &sid("s2")).expect("valid connect");
    assert_eq!(added.value.id().as_str(), "action-0");
}

#[rstest]
fn connect_allows_self_loops(mut triangle: SyncEngine) {
    let action = triangle.connect(&sid("s3"), &sid("s3")).expect("self loop").value;

    assert!(action.is_self_loop());
    assert_models_agree(&triangle);
}

#[rstest]
fn repeated_connects_never_reuse_ids(mut triangle: SyncEngine) {
    let first = triangle.connect(&sid("s1"), &sid("s2")).expect("first").value;
    let second = triangle.connect(&sid("s1"), &sid("s2")).expect("second").value;

    assert_ne!(first.id(), second.id());
    assert_eq!(triangle.flow().actions().len(), 5);
}

#[test]
fn allocation_collision_fails_before_any_mutation() {
    let mut flow = triangle_flow();
    flow.insert_state(State::new(sid("action-taken"), "Squatter", ""));
    let mut engine = SyncEngine::new(flow, PlaceholderLayout::default())
        .with_allocator(IdAllocator::with_uniquifier(Fixed("taken")));
    let before = engine.flow().clone();

    let err = engine
        .connect(&sid("s1"), &sid("s2"))
        .expect_err("collision");

    assert_eq!(
        err,
        SyncError::Allocation(AllocationError::Collision {
            id: "action-taken".to_owned()
        })
    );
    assert_eq!(engine.flow(), &before);
}

#[rstest]
fn add_state_uses_defaults_and_given_position(mut triangle: SyncEngine) {
    let result = triangle
        .add_state(Position::new(320.0, 48.0))
        .expect("add state");
    let state = result.value;

    assert_eq!(state.name(), "New state");
    assert_eq!(state.description(), "");
    assert!(triangle.flow().contains_state(state.id()));
    assert_eq!(
        triangle.graph().node(state.id()).map(|n| n.position()),
        Some(Position::new(320.0, 48.0))
    );
    assert_eq!(result.delta.added, vec![ElementRef::State(state.id().clone())]);
    assert_models_agree(&triangle);
}

#[rstest]
fn update_state_merges_patch_into_both_models(mut greeting: SyncEngine) {
    let patch = StatePatch {
        name: Some("Ask again".to_owned()),
        description: None,
    };

    let updated = greeting
        .update_state(&sid("s:ask"), &patch)
        .expect("update")
        .value;

    assert_eq!(updated.name(), "Ask again");
    assert_eq!(updated.description(), "Ask what the user needs");
    let node = greeting.graph().node(&sid("s:ask")).expect("node");
    assert_eq!(node.payload().name, "Ask again");
    assert_eq!(node.payload().description, "Ask what the user needs");
    assert_models_agree(&greeting);
}

#[rstest]
fn update_action_changes_type_in_both_models(mut greeting: SyncEngine) {
    let patch = ActionPatch {
        action_type: Some(ActionType::Custom),
        description: Some("Fallback when intent is unknown".to_owned()),
        ..ActionPatch::default()
    };

    greeting
        .update_action(&aid("a:retry"), &patch)
        .expect("update");

    let action = greeting.flow().action(&aid("a:retry")).expect("action");
    assert_eq!(action.action_type(), ActionType::Custom);
    assert_eq!(action.name(), "Unclear");
    let edge = greeting.graph().edge(&aid("a:retry")).expect("edge");
    assert_eq!(edge.payload().action_type, ActionType::Custom);
    assert_eq!(edge.payload().description, "Fallback when intent is unknown");
}

#[rstest]
fn updates_of_unknown_ids_report_not_found(mut greeting: SyncEngine) {
    let state_err = greeting
        .update_state(&sid("s:nope"), &StatePatch::default())
        .expect_err("unknown state");
    let action_err = greeting
        .update_action(&aid("a:nope"), &ActionPatch::default())
        .expect_err("unknown action");

    assert_eq!(
        state_err,
        SyncError::NotFound {
            element: ElementRef::State(sid("s:nope"))
        }
    );
    assert_eq!(
        action_err,
        SyncError::NotFound {
            element: ElementRef::Action(aid("a:nope"))
        }
    );
    assert_eq!(greeting.rev(), 0);
}

#[rstest]
fn moving_a_node_never_touches_the_flow(mut greeting: SyncEngine) {
    let before = greeting.flow().clone();

    greeting
        .move_node(&sid("s:bye"), Position::new(900.0, 10.0))
        .expect("move");

    assert_eq!(greeting.flow(), &before);
    assert_eq!(
        greeting.graph().node(&sid("s:bye")).map(|n| n.position()),
        Some(Position::new(900.0, 10.0))
    );
    assert!(matches!(
        greeting.move_node(&sid("s:nope"), Position::default()),
        Err(SyncError::NotFound { .. })
    ));
}

#[rstest]
fn reconcile_keeps_positions_and_reports_changes(mut greeting: SyncEngine) {
    greeting
        .move_node(&sid("s:ask"), Position::new(12.0, 34.0))
        .expect("move");

    let mut external = greeting.flow().clone();
    external.remove_state(&sid("s:bye"));
    external.insert_state(State::new(sid("s:handoff"), "Handoff", "Pass to a human"));
    external
        .state_mut(&sid("s:greet"))
        .expect("greet")
        .set_name("Hello");
    external
        .insert_action(Action::new(aid("a:handoff"), sid("s:ask"), sid("s:handoff")))
        .expect("action");

    let delta = greeting.reconcile(external);

    assert_eq!(
        greeting.graph().node(&sid("s:ask")).map(|n| n.position()),
        Some(Position::new(12.0, 34.0))
    );
    assert_eq!(
        delta.added,
        vec![
            ElementRef::State(sid("s:handoff")),
            ElementRef::Action(aid("a:handoff")),
        ]
    );
    assert_eq!(
        delta.removed,
        vec![
            ElementRef::State(sid("s:bye")),
            ElementRef::Action(aid("a:greet-bye")),
        ]
    );
    assert_eq!(delta.updated, vec![ElementRef::State(sid("s:greet"))]);
    assert_models_agree(&greeting);
}

#[rstest]
fn reconcile_reseeds_the_allocator(mut triangle: SyncEngine) {
    let mut external = ChatFlow::default();
    external.insert_state(State::new(sid("state-41"), "Imported", ""));
    triangle.reconcile(external);

    let added = triangle.add_state(Position::default()).expect("add").value;

    assert_eq!(added.id().as_str(), "state-42");
}

#[test]
fn allocation_keeps_working_after_the_largest_numeric_suffix() {
    let mut flow = ChatFlow::default();
    flow.insert_state(State::new(
        sid("legacy-18446744073709551614"),
        "Imported",
        "",
    ));
    let mut engine = SyncEngine::new(flow, PlaceholderLayout::default());

    let first = engine.add_state(Position::default()).expect("first state").value;
    let second = engine.add_state(Position::default()).expect("second state").value;
    assert_ne!(first.id(), second.id());

    let loop_a = engine.connect(first.id(), first.id()).expect("first connect").value;
    let loop_b = engine.connect(first.id(), first.id()).expect("second connect").value;
    assert_ne!(loop_a.id(), loop_b.id());

    assert_eq!(engine.flow().states().len(), 3);
    assert_eq!(engine.flow().actions().len(), 2);
    assert_models_agree(&engine);
}

#[rstest]
fn query_hides_nodes_and_derives_edge_visibility(mut triangle: SyncEngine) {
    let delta = triangle.set_query("desc");

    let graph = triangle.graph();
    assert!(graph.node(&sid("s1")).is_some_and(|n| n.visible()));
    assert!(graph.node(&sid("s2")).is_some_and(|n| !n.visible()));
    assert!(graph.edges().values().all(|e| !e.visible()));
    assert!(delta.updated.contains(&ElementRef::State(sid("s2"))));
    assert!(delta.updated.contains(&ElementRef::Action(aid("a1"))));

    triangle.set_query("");
    assert!(triangle.graph().nodes().values().all(|n| n.visible()));
    assert!(triangle.graph().edges().values().all(|e| e.visible()));
}

#[rstest]
fn active_query_applies_to_new_and_renamed_states(mut triangle: SyncEngine) {
    triangle.set_query("desc");

    let added = triangle.add_state(Position::default()).expect("add").value;
    assert!(triangle.graph().node(added.id()).is_some_and(|n| !n.visible()));

    let edge = triangle.connect(&sid("s1"), added.id()).expect("connect").value;
    assert!(triangle.graph().edge(edge.id()).is_some_and(|e| !e.visible()));

    let delta = triangle
        .update_state(
            added.id(),
            &StatePatch {
                description: Some("Describe the plan".to_owned()),
                ..StatePatch::default()
            },
        )
        .expect("update")
        .delta;

    assert!(triangle.graph().node(added.id()).is_some_and(|n| n.visible()));
    assert!(triangle.graph().edge(edge.id()).is_some_and(|e| e.visible()));
    assert!(delta.updated.contains(&ElementRef::Action(edge.id().clone())));
}
