// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use super::Position;

/// Where nodes without a known position are dropped.
///
/// This is not a layout: it only spreads new nodes over a grid so they do not all stack on the
/// same point. Users move them afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceholderLayout {
    pub origin: Position,
    pub columns: usize,
    pub spacing_x: f64,
    pub spacing_y: f64,
}

impl Default for PlaceholderLayout {
    fn default() -> Self {
        Self {
            origin: Position::new(0.0, 0.0),
            columns: 3,
            spacing_x: 200.0,
            spacing_y: 150.0,
        }
    }
}

impl PlaceholderLayout {
    pub fn position_for(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        let column = (index % columns) as f64;
        let row = (index / columns) as f64;
        Position::new(
            self.origin.x + column * self.spacing_x,
            self.origin.y + row * self.spacing_y,
        )
    }
}
