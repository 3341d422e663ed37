// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Formula parser using pest

use super::ast::{BinaryOp, Expr, LogicalOp, UnaryOp};
use super::Value;
use crate::error::EvalError;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "expr/formula.pest"]
struct FormulaParser;

/// Maximum number of `if(c, a, b)` calls lowered to conditionals per formula.
/// Calls beyond the cap stay as plain calls and fail when evaluated.
pub const MAX_CONDITIONAL_REWRITES: usize = 10;

/// Parse a formula into an AST
pub fn parse_formula(source: &str) -> Result<Expr, EvalError> {
    let mut pairs = FormulaParser::parse(Rule::formula, source)
        .map_err(|e| EvalError::Syntax(e.to_string().replace('\n', " ")))?;

    let formula = pairs
        .next()
        .ok_or_else(|| EvalError::Syntax("empty formula".into()))?;
    let expr = formula
        .into_inner()
        .next()
        .ok_or_else(|| EvalError::Syntax("empty formula".into()))?;

    Lowering::default().node(expr)
}

/// Allow-list check applied before parsing
pub fn check_characters(source: &str) -> Result<(), EvalError> {
    let allowed = |c: char| {
        c.is_ascii_alphanumeric()
            || c.is_whitespace()
            || "_+-*/%.()<>!=&|,'\"?:#$[]".contains(c)
    };

    match source.chars().find(|c| !allowed(*c)) {
        Some(_) => Err(EvalError::UnsafeCharacters(source.to_string())),
        None => Ok(()),
    }
}

#[derive(Default)]
struct Lowering {
    conditionals: usize,
}

impl Lowering {
    fn node(&mut self, pair: Pair<Rule>) -> Result<Expr, EvalError> {
        match pair.as_rule() {
            Rule::expr => self.conditional(pair),
            Rule::disjunction
            | Rule::conjunction
            | Rule::equality
            | Rule::comparison
            | Rule::additive
            | Rule::term => self.chain(pair),
            Rule::unary => self.unary(pair),
            Rule::number => {
                let n: f64 = pair
                    .as_str()
                    .parse()
                    .map_err(|_| EvalError::Syntax(format!("bad number '{}'", pair.as_str())))?;
                Ok(Expr::Literal(Value::Number(n)))
            }
            Rule::string => {
                let text = pair
                    .into_inner()
                    .next()
                    .map(|inner| inner.as_str().to_string())
                    .unwrap_or_default();
                Ok(Expr::Literal(Value::Str(text)))
            }
            Rule::boolean => Ok(Expr::Literal(Value::Bool(pair.as_str() == "true"))),
            Rule::variable => {
                let name = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| EvalError::Syntax("dangling '$'".into()))?;
                Ok(Expr::Variable(name.as_str().to_string()))
            }
            Rule::identifier => Ok(Expr::Identifier(pair.as_str().to_string())),
            Rule::list => {
                let items = pair
                    .into_inner()
                    .map(|item| self.node(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Expr::List(items))
            }
            Rule::call => self.call(pair),
            other => Err(EvalError::Syntax(format!("unexpected {:?}", other))),
        }
    }

    fn conditional(&mut self, pair: Pair<Rule>) -> Result<Expr, EvalError> {
        let mut inner = pair.into_inner();
        let condition = self.next_node(&mut inner)?;

        match (inner.next(), inner.next()) {
            (Some(then), Some(otherwise)) => Ok(Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(self.node(then)?),
                otherwise: Box::new(self.node(otherwise)?),
            }),
            _ => Ok(condition),
        }
    }

    fn chain(&mut self, pair: Pair<Rule>) -> Result<Expr, EvalError> {
        let mut inner = pair.into_inner();
        let mut lhs = self.next_node(&mut inner)?;

        while let Some(op) = inner.next() {
            let rhs = self.next_node(&mut inner)?;
            lhs = match op.as_rule() {
                Rule::or_op => Expr::Logical(LogicalOp::Or, Box::new(lhs), Box::new(rhs)),
                Rule::and_op => Expr::Logical(LogicalOp::And, Box::new(lhs), Box::new(rhs)),
                _ => Expr::Binary(binary_op(op.as_str())?, Box::new(lhs), Box::new(rhs)),
            };
        }

        Ok(lhs)
    }

    fn unary(&mut self, pair: Pair<Rule>) -> Result<Expr, EvalError> {
        let mut ops = Vec::new();
        let mut operand = None;

        for inner in pair.into_inner() {
            if inner.as_rule() == Rule::prefix_op {
                ops.push(match inner.as_str() {
                    "!" => UnaryOp::Not,
                    "-" => UnaryOp::Neg,
                    _ => UnaryOp::Plus,
                });
            } else {
                operand = Some(self.node(inner)?);
            }
        }

        let mut expr = operand.ok_or_else(|| EvalError::Syntax("missing operand".into()))?;
        for op in ops.into_iter().rev() {
            expr = Expr::Unary(op, Box::new(expr));
        }
        Ok(expr)
    }

    fn call(&mut self, pair: Pair<Rule>) -> Result<Expr, EvalError> {
        let mut inner = pair.into_inner();
        let name = inner
            .next()
            .ok_or_else(|| EvalError::Syntax("missing function name".into()))?
            .as_str()
            .to_string();
        let arg_pairs: Vec<Pair<Rule>> = inner.collect();

        // Outer `if` calls are lowered before their arguments.
        if name == "if" && arg_pairs.len() == 3 && self.conditionals < MAX_CONDITIONAL_REWRITES {
            self.conditionals += 1;
            let mut args = arg_pairs.into_iter();
            let condition = self.next_node(&mut args)?;
            let then = self.next_node(&mut args)?;
            let otherwise = self.next_node(&mut args)?;
            return Ok(Expr::Conditional {
                condition: Box::new(condition),
                then: Box::new(then),
                otherwise: Box::new(otherwise),
            });
        }

        let args = arg_pairs
            .into_iter()
            .map(|arg| self.node(arg))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Expr::Call { name, args })
    }

    fn next_node<'i>(
        &mut self,
        pairs: &mut impl Iterator<Item = Pair<'i, Rule>>,
    ) -> Result<Expr, EvalError> {
        let pair = pairs
            .next()
            .ok_or_else(|| EvalError::Syntax("missing operand".into()))?;
        self.node(pair)
    }
}

fn binary_op(symbol: &str) -> Result<BinaryOp, EvalError> {
    Ok(match symbol {
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        "%" => BinaryOp::Rem,
        "==" | "===" => BinaryOp::Eq,
        "!=" | "!==" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        other => return Err(EvalError::Syntax(format!("unknown operator '{}'", other))),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_precedence() {
        let expr = parse_formula("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary(BinaryOp::Add, _, rhs) => {
                assert!(matches!(*rhs, Expr::Binary(BinaryOp::Mul, _, _)));
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_parse_variable_and_call() {
        let expr = parse_formula("clamp($width * 0.05, 0.02, 0.1)").unwrap();
        match expr {
            Expr::Call { name, args } => {
                assert_eq!(name, "clamp");
                assert_eq!(args.len(), 3);
            }
            other => panic!("unexpected tree: {:?}", other),
        }
    }

    #[test]
    fn test_if_lowered_to_conditional() {
        let expr = parse_formula("if($a > 1, 10, if($a > 0, 5, 0))").unwrap();
        assert_eq!(expr.conditional_count(), 2);
    }

    #[test]
    fn test_if_rewrites_are_capped() {
        let mut source = String::from("0");
        for i in 0..12 {
            source = format!("if($x == {}, {}, {})", i, i, source);
        }
        let expr = parse_formula(&source).unwrap();
        assert_eq!(expr.conditional_count(), MAX_CONDITIONAL_REWRITES);
    }

    #[test]
    fn test_if_with_wrong_arity_stays_a_call() {
        let expr = parse_formula("if(1, 2)").unwrap();
        assert!(matches!(expr, Expr::Call { ref name, .. } if name == "if"));
    }

    #[test]
    fn test_string_literals() {
        assert_eq!(
            parse_formula("'wood'").unwrap(),
            Expr::Literal(Value::Str("wood".into()))
        );
        assert_eq!(
            parse_formula("\"glass\"").unwrap(),
            Expr::Literal(Value::Str("glass".into()))
        );
    }

    #[test]
    fn test_unbalanced_input_is_a_syntax_error() {
        assert!(matches!(parse_formula("(1 + 2"), Err(EvalError::Syntax(_))));
        assert!(matches!(parse_formula("1 +"), Err(EvalError::Syntax(_))));
    }

    #[test]
    fn test_character_allow_list() {
        assert!(check_characters("$w * 2 >= 1 && hsv_to_hex(0, 1, 1) == \"#ff0000\"").is_ok());
        assert!(check_characters("1; drop").is_err());
        assert!(check_characters("a @ b").is_err());
        assert!(check_characters("`x`").is_err());
    }
}
