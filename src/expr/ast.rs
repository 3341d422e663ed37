// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Formula AST definitions

use super::Value;

/// Parsed formula, evaluated against a [`Context`](super::Context).
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    /// `$name` reference; absent names evaluate to zero
    Variable(String),
    /// Bare identifier: a named constant or a numeric context binding
    Identifier(String),
    List(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Logical(LogicalOp, Box<Expr>, Box<Expr>),
    Conditional {
        condition: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    Call {
        name: String,
        args: Vec<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl Expr {
    /// Number of conditional nodes in the tree
    pub fn conditional_count(&self) -> usize {
        match self {
            Expr::Literal(_) | Expr::Variable(_) | Expr::Identifier(_) => 0,
            Expr::List(items) => items.iter().map(Expr::conditional_count).sum(),
            Expr::Unary(_, inner) => inner.conditional_count(),
            Expr::Binary(_, lhs, rhs) | Expr::Logical(_, lhs, rhs) => {
                lhs.conditional_count() + rhs.conditional_count()
            }
            Expr::Conditional {
                condition,
                then,
                otherwise,
            } => 1 + condition.conditional_count() + then.conditional_count() + otherwise.conditional_count(),
            Expr::Call { args, .. } => args.iter().map(Expr::conditional_count).sum(),
        }
    }
}
