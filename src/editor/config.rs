// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use crate::presentation::PlaceholderLayout;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorConfig {
    /// View-only mode: filtering works, selection is ignored and every edit is refused.
    pub read_only: bool,
    pub placeholder: PlaceholderLayout,
}

impl EditorConfig {
    pub fn read_only() -> Self {
        Self {
            read_only: true,
            ..Self::default()
        }
    }
}
