// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Support code for the `paramscene` command line tool

pub mod args;
pub mod reporter;

pub use args::{parse_assignment, parse_binding, parse_literal, Assignment};
pub use reporter::Reporter;
