// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Proteus-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Proteus and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Proteus: agent command bridge for a live parametric dataflow graph.
//!
//! A remote agent posts JSON commands over HTTP; each command is marshalled
//! onto the single thread that owns the live document, where it snapshots,
//! rewires, or recomputes components without the canvas ever observing a
//! half-updated node.

pub mod command;
pub mod doc;
pub mod extract;
pub mod graph;
pub mod model;
pub mod rewire;
pub mod script;
pub mod server;
pub mod uithread;
