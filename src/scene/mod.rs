// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene graph construction and incremental regeneration

mod builder;
mod graph;
mod session;

pub use builder::SceneBuilder;
pub use graph::{Leaf, ObjectId, ObjectKind, SceneGraph, SceneObject, Transform};
pub use session::{Scene, TemplateEntry, DEFAULT_MATERIAL};
