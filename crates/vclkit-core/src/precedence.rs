// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The operator table shared by the parser and the printer.
//!
//! The parser climbs precedence with [`infix_binding_power`]; the printer
//! decides where parentheses go with [`operand_needs_parens`] and
//! [`unary_operand_needs_parens`]. The parser consults the same two
//! functions to drop a grouping the printer would re-add, so
//! `print(parse(s))` re-parses to the same tree.
//!
//! # Precedence Levels (from lowest to highest)
//!
//! | Level | Operators                          | Associativity |
//! |-------|------------------------------------|---------------|
//! | 10    | `\|\|`                             | Left          |
//! | 20    | `&&`                               | Left          |
//! | 30    | `==` `!=` `~` `!~` `<` `>` `<=` `>=` | Left        |

use crate::ast::{BinaryOperator, Expression, ExpressionKind, LogicalOperator};

/// An operator that sits between two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfixOperator {
    Binary(BinaryOperator),
    Logical(LogicalOperator),
}

impl InfixOperator {
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        BinaryOperator::from_symbol(symbol)
            .map(Self::Binary)
            .or_else(|| LogicalOperator::from_symbol(symbol).map(Self::Logical))
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Binary(op) => op.as_str(),
            Self::Logical(op) => op.as_str(),
        }
    }
}

/// Binding power for Pratt parsing.
///
/// Left-associative operators bind slightly tighter on the right, so
/// `a == b == c` groups as `(a == b) == c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingPower {
    pub left: u8,
    pub right: u8,
}

impl BindingPower {
    const fn left_assoc(precedence: u8) -> Self {
        Self {
            left: precedence,
            right: precedence + 1,
        }
    }
}

#[must_use]
pub const fn infix_binding_power(op: InfixOperator) -> BindingPower {
    match op {
        InfixOperator::Logical(LogicalOperator::Or) => BindingPower::left_assoc(10),
        InfixOperator::Logical(LogicalOperator::And) => BindingPower::left_assoc(20),
        InfixOperator::Binary(_) => BindingPower::left_assoc(30),
    }
}

/// Which operand of an infix expression is being considered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Returns `true` when the printer wraps `operand` in parentheses as the
/// `side` operand of `parent`.
///
/// - a binary operand of a binary parent is always wrapped on the left, and
///   on the right because comparisons associate left
/// - an `&&` operand of an `||` parent is wrapped on either side
/// - otherwise an operand is wrapped only when the grammar would re-associate
///   it: lower precedence, or equal precedence on the right
///
/// Parsed trees only hit the last case through a source grouping, which
/// the parser folds away, so it exists for trees assembled by rewrites.
#[must_use]
pub fn operand_needs_parens(parent: InfixOperator, operand: &Expression, side: Side) -> bool {
    let Some(child) = infix_operator_of(operand) else {
        return false;
    };
    match (parent, child) {
        (InfixOperator::Binary(_), InfixOperator::Binary(_))
        | (
            InfixOperator::Logical(LogicalOperator::Or),
            InfixOperator::Logical(LogicalOperator::And),
        ) => true,
        _ => {
            let parent_power = infix_binding_power(parent).left;
            let child_power = infix_binding_power(child).left;
            child_power < parent_power || (side == Side::Right && child_power == parent_power)
        }
    }
}

fn infix_operator_of(expr: &Expression) -> Option<InfixOperator> {
    match &expr.kind {
        ExpressionKind::Binary { operator, .. } => Some(InfixOperator::Binary(*operator)),
        ExpressionKind::Logical { operator, .. } => Some(InfixOperator::Logical(*operator)),
        _ => None,
    }
}

/// Returns `true` when the printer wraps the operand of a prefix operator.
/// Only compound expressions need it: `!(a == b)`.
#[must_use]
pub const fn unary_operand_needs_parens(operand: &Expression) -> bool {
    matches!(
        operand.kind,
        ExpressionKind::Binary { .. }
            | ExpressionKind::Logical { .. }
            | ExpressionKind::Concat { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn logical(operator: LogicalOperator) -> Expression {
        Expression::new(ExpressionKind::Logical {
            left: Box::new(Expression::identifier("a")),
            operator,
            right: Box::new(Expression::identifier("b")),
        })
    }

    fn comparison() -> Expression {
        Expression::new(ExpressionKind::Binary {
            left: Box::new(Expression::identifier("a")),
            operator: BinaryOperator::Equal,
            right: Box::new(Expression::identifier("b")),
        })
    }

    #[test]
    fn and_binds_tighter_than_or() {
        let and = infix_binding_power(InfixOperator::Logical(LogicalOperator::And));
        let or = infix_binding_power(InfixOperator::Logical(LogicalOperator::Or));
        let eq = infix_binding_power(InfixOperator::Binary(BinaryOperator::Equal));
        assert!(and.left > or.left);
        assert!(eq.left > and.left);
        assert!(eq.right > eq.left, "left-associative");
    }

    #[test]
    fn from_symbol_covers_both_families() {
        assert_eq!(
            InfixOperator::from_symbol("~"),
            Some(InfixOperator::Binary(BinaryOperator::Match))
        );
        assert_eq!(
            InfixOperator::from_symbol("||"),
            Some(InfixOperator::Logical(LogicalOperator::Or))
        );
        assert_eq!(InfixOperator::from_symbol("="), None);
    }

    #[test]
    fn binary_operand_of_binary_is_wrapped() {
        let parent = InfixOperator::Binary(BinaryOperator::NotEqual);
        assert!(operand_needs_parens(parent, &comparison(), Side::Left));
        assert!(operand_needs_parens(parent, &comparison(), Side::Right));
    }

    #[test]
    fn and_under_or_is_wrapped_on_either_side() {
        let or = InfixOperator::Logical(LogicalOperator::Or);
        let and = logical(LogicalOperator::And);
        assert!(operand_needs_parens(or, &and, Side::Left));
        assert!(operand_needs_parens(or, &and, Side::Right));
    }

    #[test]
    fn left_associative_chains_are_not_wrapped() {
        let and = InfixOperator::Logical(LogicalOperator::And);
        let or = InfixOperator::Logical(LogicalOperator::Or);
        assert!(!operand_needs_parens(and, &logical(LogicalOperator::And), Side::Left));
        assert!(!operand_needs_parens(or, &logical(LogicalOperator::Or), Side::Left));
        assert!(!operand_needs_parens(and, &comparison(), Side::Left));
        assert!(!operand_needs_parens(or, &comparison(), Side::Right));
    }

    #[test]
    fn reassociating_operands_are_wrapped() {
        let and = InfixOperator::Logical(LogicalOperator::And);
        let eq = InfixOperator::Binary(BinaryOperator::Equal);
        assert!(operand_needs_parens(and, &logical(LogicalOperator::Or), Side::Left));
        assert!(operand_needs_parens(and, &logical(LogicalOperator::And), Side::Right));
        assert!(operand_needs_parens(eq, &logical(LogicalOperator::And), Side::Left));
        assert!(!operand_needs_parens(and, &Expression::identifier("x"), Side::Right));
    }

    #[test]
    fn unary_wraps_compound_operands() {
        assert!(unary_operand_needs_parens(&comparison()));
        assert!(unary_operand_needs_parens(&logical(LogicalOperator::Or)));
        assert!(!unary_operand_needs_parens(&Expression::identifier("a")));
    }
}
