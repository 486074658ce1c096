// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Botflow-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Botflow and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Read-only queries over the presentation graph.
//!
//! Filtering never touches the chat flow; it only decides which nodes and edges are shown.

pub mod filter;

pub use filter::{apply_filter, derive_edge_visibility, NodeQuery};
