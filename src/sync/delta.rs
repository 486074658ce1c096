// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::BTreeSet;

use crate::model::ElementRef;

/// Element refs added, removed, or updated by one operation.
///
/// The renderer reads the new state from the graph. `updated` includes visibility flips and
/// moves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Delta {
    pub added: Vec<ElementRef>,
    pub removed: Vec<ElementRef>,
    pub updated: Vec<ElementRef>,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.updated.is_empty()
    }

    pub fn touches(&self, element: &ElementRef) -> bool {
        self.added.contains(element)
            || self.removed.contains(element)
            || self.updated.contains(element)
    }
}

#[derive(Debug, Default)]
pub(crate) struct DeltaBuilder {
    added: BTreeSet<ElementRef>,
    removed: BTreeSet<ElementRef>,
    updated: BTreeSet<ElementRef>,
}

impl DeltaBuilder {
    pub(crate) fn record_added(&mut self, element: ElementRef) {
        self.removed.remove(&element);
        self.updated.remove(&element);
        self.added.insert(element);
    }

    pub(crate) fn record_removed(&mut self, element: ElementRef) {
        self.added.remove(&element);
        self.updated.remove(&element);
        self.removed.insert(element);
    }

    pub(crate) fn record_updated(&mut self, element: ElementRef) {
        if self.added.contains(&element) || self.removed.contains(&element) {
            return;
        }
        self.updated.insert(element);
    }

    pub(crate) fn record_all_updated(&mut self, elements: impl IntoIterator<Item = ElementRef>) {
        for element in elements {
            self.record_updated(element);
        }
    }

    pub(crate) fn finish(self) -> Delta {
        Delta {
            added: self.added.into_iter().collect(),
            removed: self.removed.into_iter().collect(),
            updated: self.updated.into_iter().collect(),
        }
    }
}
