// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::model::{ActionId, StateId};
use crate::presentation::Position;
use crate::selection::DraftField;

/// Interaction reported by the canvas, the properties panel or the search box.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorEvent {
    NodeClicked(StateId),
    EdgeClicked(ActionId),
    PaneClicked,
    ConnectDragged { source: StateId, target: StateId },
    NodeMoved { id: StateId, position: Position },
    /// `position` is already in canvas coordinates.
    AddState { position: Position },
    DeleteSelected,
    EditField { field: DraftField, value: String },
    SaveSelection,
    CloseSelection,
    QueryChanged(String),
}

impl EditorEvent {
    /// Returns `true` for events that change the bot or the canvas layout.
    pub fn is_mutating(&self) -> bool {
        matches!(
            self,
            Self::ConnectDragged { .. }
                | Self::NodeMoved { .. }
                | Self::AddState { .. }
                | Self::DeleteSelected
                | Self::EditField { .. }
                | Self::SaveSelection
        )
    }

    /// Returns `true` for events that open or edit the properties panel.
    pub fn is_selection(&self) -> bool {
        matches!(self, Self::NodeClicked(_) | Self::EdgeClicked(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NodeClicked(_) => "node_clicked",
            Self::EdgeClicked(_) => "edge_clicked",
            Self::PaneClicked => "pane_clicked",
            Self::ConnectDragged { .. } => "connect_dragged",
            Self::NodeMoved { .. } => "node_moved",
            Self::AddState { .. } => "add_state",
            Self::DeleteSelected => "delete_selected",
            Self::EditField { .. } => "edit_field",
            Self::SaveSelection => "save_selection",
            Self::CloseSelection => "close_selection",
            Self::QueryChanged(_) => "query_changed",
        }
    }
}
