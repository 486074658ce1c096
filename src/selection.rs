// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Single selection plus an editable draft of the selected element.
//!
//! The draft is a detached copy: edits never reach the chat flow until [`SelectionController::save`]
//! runs. Selecting something else or closing the panel drops unsaved edits.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::model::{ActionType, ElementRef, ParseActionTypeError};
use crate::sync::{ActionPatch, Delta, StatePatch, SyncEngine, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftField {
    Name,
    Description,
    Type,
}

impl DraftField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Description => "description",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for DraftField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DraftField {
    type Err = ParseDraftFieldError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "name" => Ok(Self::Name),
            "description" => Ok(Self::Description),
            "type" => Ok(Self::Type),
            _ => Err(ParseDraftFieldError {
                value: value.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDraftFieldError {
    value: String,
}

impl fmt::Display for ParseDraftFieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown field {:?} (expected name, description or type)",
            self.value
        )
    }
}

impl std::error::Error for ParseDraftFieldError {}

/// Editable fields of the selected element. `action_type` is `None` for states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    name: String,
    description: String,
    action_type: Option<ActionType>,
}

impl Draft {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn action_type(&self) -> Option<ActionType> {
        self.action_type
    }

    fn snapshot(element: &ElementRef, engine: &SyncEngine) -> Option<Self> {
        match element {
            ElementRef::State(state_id) => engine.flow().state(state_id).map(|state| Self {
                name: state.name().to_owned(),
                description: state.description().to_owned(),
                action_type: None,
            }),
            ElementRef::Action(action_id) => engine.flow().action(action_id).map(|action| Self {
                name: action.name().to_owned(),
                description: action.description().to_owned(),
                action_type: Some(action.action_type()),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    NothingSelected,
    FieldNotEditable { field: DraftField },
    InvalidActionType(ParseActionTypeError),
    Sync(SyncError),
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NothingSelected => write!(f, "nothing is selected"),
            Self::FieldNotEditable { field } => {
                write!(f, "field {field} is not editable on a state")
            }
            Self::InvalidActionType(err) => write!(f, "{err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for SelectionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidActionType(err) => Some(err),
            Self::Sync(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SyncError> for SelectionError {
    fn from(err: SyncError) -> Self {
        Self::Sync(err)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionController {
    rev: u64,
    selected: Option<Selected>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Selected {
    element: ElementRef,
    snapshot: Draft,
    draft: Draft,
}

impl SelectionController {
    /// Bumped whenever the selected element changes (not on draft edits).
    pub fn rev(&self) -> u64 {
        self.rev
    }

    pub fn selected(&self) -> Option<&ElementRef> {
        self.selected.as_ref().map(|selected| &selected.element)
    }

    pub fn draft(&self) -> Option<&Draft> {
        self.selected.as_ref().map(|selected| &selected.draft)
    }

    pub fn is_dirty(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|selected| selected.draft != selected.snapshot)
    }

    /// Selects `element` and snapshots its fields into a fresh draft.
    ///
    /// Any unsaved draft of the previous selection is discarded. An unknown element leaves the
    /// current selection as it is.
    pub fn select(
        &mut self,
        element: ElementRef,
        engine: &SyncEngine,
    ) -> Result<(), SelectionError> {
        let Some(snapshot) = Draft::snapshot(&element, engine) else {
            return Err(SyncError::NotFound { element }.into());
        };

        if self.is_dirty() {
            debug!(previous = ?self.selected(), "discarded unsaved draft");
        }
        self.selected = Some(Selected {
            element,
            draft: snapshot.clone(),
            snapshot,
        });
        self.rev = self.rev.wrapping_add(1);
        Ok(())
    }

    pub fn edit(&mut self, field: DraftField, value: &str) -> Result<(), SelectionError> {
        let Some(selected) = self.selected.as_mut() else {
            return Err(SelectionError::NothingSelected);
        };

        match field {
            DraftField::Name => selected.draft.name = value.to_owned(),
            DraftField::Description => selected.draft.description = value.to_owned(),
            DraftField::Type => {
                if !matches!(selected.element, ElementRef::Action(_)) {
                    return Err(SelectionError::FieldNotEditable { field });
                }
                let action_type = value
                    .parse::<ActionType>()
                    .map_err(SelectionError::InvalidActionType)?;
                selected.draft.action_type = Some(action_type);
            }
        }
        Ok(())
    }

    /// Commits the changed draft fields to both models. The element stays selected.
    pub fn save(&mut self, engine: &mut SyncEngine) -> Result<Delta, SelectionError> {
        let Some(selected) = self.selected.as_mut() else {
            return Err(SelectionError::NothingSelected);
        };
        if selected.draft == selected.snapshot {
            return Ok(Delta::default());
        }

        let changed = |draft: &String, snapshot: &String| (draft != snapshot).then(|| draft.clone());
        let name = changed(&selected.draft.name, &selected.snapshot.name);
        let description = changed(&selected.draft.description, &selected.snapshot.description);

        let delta = match &selected.element {
            ElementRef::State(state_id) => {
                engine
                    .update_state(state_id, &StatePatch { name, description })?
                    .delta
            }
            ElementRef::Action(action_id) => {
                let action_type = selected
                    .draft
                    .action_type
                    .filter(|_| selected.draft.action_type != selected.snapshot.action_type);
                engine
                    .update_action(
                        action_id,
                        &ActionPatch {
                            name,
                            description,
                            action_type,
                        },
                    )?
                    .delta
            }
        };

        selected.snapshot = selected.draft.clone();
        Ok(delta)
    }

    /// Clears the selection and drops the draft. Returns `false` if nothing was selected.
    pub fn close(&mut self) -> bool {
        if self.selected.take().is_none() {
            return false;
        }
        self.rev = self.rev.wrapping_add(1);
        true
    }

    /// Clears the selection if its element no longer exists in `engine`.
    ///
    /// Returns `true` if the selection was cleared.
    pub fn retain_existing(&mut self, engine: &SyncEngine) -> bool {
        let stale = self
            .selected()
            .is_some_and(|element| !engine.contains(element));
        stale && self.close()
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::{DraftField, SelectionController, SelectionError};
    use crate::model::fixtures::{aid, greeting_flow, sid};
    use crate::model::{ActionType, ElementRef};
    use crate::presentation::PlaceholderLayout;
    use crate::sync::{SyncEngine, SyncError};

    #[fixture]
    fn engine() -> SyncEngine {
        SyncEngine::new(greeting_flow(), PlaceholderLayout::default())
    }

    fn ask() -> ElementRef {
        ElementRef::State(sid("s:ask"))
    }

    fn retry() -> ElementRef {
        ElementRef::Action(aid("a:retry"))
    }

    #[rstest]
    fn selecting_snapshots_the_element_fields(engine: SyncEngine) {
        let mut selection = SelectionController::default();

        selection.select(retry(), &engine).expect("select");

        let draft = selection.draft().expect("draft");
        assert_eq!(draft.name(), "Unclear");
        assert_eq!(draft.description(), "");
        assert_eq!(draft.action_type(), Some(ActionType::Core));
        assert_eq!(selection.selected(), Some(&retry()));
        assert!(!selection.is_dirty());
        assert_eq!(selection.rev(), 1);
    }

    #[rstest]
    fn edits_stay_in_the_draft_until_saved(mut engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(ask(), &engine).expect("select");

        selection
            .edit(DraftField::Name, "Ask politely")
            .expect("edit");

        assert!(selection.is_dirty());
        assert_eq!(engine.flow().state(&sid("s:ask")).map(|s| s.name()), Some("Ask"));

        let delta = selection.save(&mut engine).expect("save");

        assert!(delta.updated.contains(&ask()));
        assert!(!selection.is_dirty());
        assert_eq!(selection.selected(), Some(&ask()));
        assert_eq!(
            engine.flow().state(&sid("s:ask")).map(|s| s.name()),
            Some("Ask politely")
        );
        assert_eq!(
            engine.graph().node(&sid("s:ask")).map(|n| n.payload().name.as_str()),
            Some("Ask politely")
        );
    }

    #[rstest]
    fn switching_selection_discards_the_unsaved_draft(mut engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(ask(), &engine).expect("select");
        selection
            .edit(DraftField::Description, "never saved")
            .expect("edit");

        selection.select(retry(), &engine).expect("select edge");
        selection.select(ask(), &engine).expect("reselect");

        assert_eq!(
            selection.draft().map(|d| d.description()),
            Some("Ask what the user needs")
        );
        assert!(selection.save(&mut engine).expect("save").is_empty());
        assert_eq!(engine.rev(), 0);
    }

    #[rstest]
    fn action_type_edits_are_validated(mut engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(retry(), &engine).expect("select");

        let err = selection
            .edit(DraftField::Type, "Custom")
            .expect_err("case matters");
        assert!(matches!(err, SelectionError::InvalidActionType(_)));

        selection.edit(DraftField::Type, "custom").expect("edit");
        selection.save(&mut engine).expect("save");

        assert_eq!(
            engine.flow().action(&aid("a:retry")).map(|a| a.action_type()),
            Some(ActionType::Custom)
        );
    }

    #[rstest]
    fn state_drafts_have_no_type(engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(ask(), &engine).expect("select");

        assert_eq!(
            selection.edit(DraftField::Type, "core"),
            Err(SelectionError::FieldNotEditable {
                field: DraftField::Type
            })
        );
    }

    #[rstest]
    fn editing_without_selection_is_rejected(mut engine: SyncEngine) {
        let mut selection = SelectionController::default();

        assert_eq!(
            selection.edit(DraftField::Name, "x"),
            Err(SelectionError::NothingSelected)
        );
        assert_eq!(
            selection.save(&mut engine),
            Err(SelectionError::NothingSelected)
        );
    }

    #[rstest]
    fn selecting_an_unknown_element_keeps_the_current_selection(engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(ask(), &engine).expect("select");

        let err = selection
            .select(ElementRef::State(sid("s:gone")), &engine)
            .expect_err("unknown");

        assert_eq!(
            err,
            SelectionError::Sync(SyncError::NotFound {
                element: ElementRef::State(sid("s:gone"))
            })
        );
        assert_eq!(selection.selected(), Some(&ask()));
    }

    #[rstest]
    fn close_clears_and_reports_whether_anything_was_selected(engine: SyncEngine) {
        let mut selection = SelectionController::default();
        assert!(!selection.close());

        selection.select(ask(), &engine).expect("select");
        assert!(selection.close());
        assert_eq!(selection.selected(), None);
        assert_eq!(selection.draft(), None);
        assert_eq!(selection.rev(), 2);
    }

    #[rstest]
    fn selection_of_a_deleted_element_is_cleared(mut engine: SyncEngine) {
        let mut selection = SelectionController::default();
        selection.select(retry(), &engine).expect("select");

        engine.delete_element(&ElementRef::State(sid("s:ask")));

        assert!(selection.retain_existing(&engine));
        assert_eq!(selection.selected(), None);
        assert!(!selection.retain_existing(&engine));
    }

    #[test]
    fn draft_fields_parse_from_lowercase_names() {
        assert_eq!("name".parse::<DraftField>(), Ok(DraftField::Name));
        assert_eq!("type".parse::<DraftField>(), Ok(DraftField::Type));
        assert!("Name".parse::<DraftField>().is_err());
    }
}
