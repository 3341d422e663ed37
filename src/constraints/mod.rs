// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Constraint checking over template parameters

mod validator;

pub use crate::schema::Severity;
pub use validator::{worst_severity, ConstraintValidator, Violation};
