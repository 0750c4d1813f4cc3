// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Expression parsing.
//!
//! From loosest to tightest:
//!
//! 1. infix operators, by precedence climbing over [`crate::precedence`]
//! 2. implicit concatenation of juxtaposed operands (`"a" req.url "b"`)
//! 3. prefix `!` and `-`
//! 4. postfix member access, value pairs and calls
//! 5. literals, identifiers and parenthesized groups

use ecow::{EcoString, eco_format};

use crate::ast::{Expression, ExpressionKind, UnaryOperator};
use crate::precedence::{
    InfixOperator, Side, infix_binding_power, operand_needs_parens, unary_operand_needs_parens,
};
use crate::source_analysis::{Location, SyntaxError, TokenKind};

use super::Parser;

/// Unit suffixes that make a number a duration, longest first so `ms` wins
/// over `m`.
const DURATION_UNITS: &[&str] = &["ms", "s", "m", "h", "d", "y"];

impl Parser {
    /// Parses a full expression.
    pub(super) fn parse_expression(&mut self) -> Result<Expression, SyntaxError> {
        self.nested(|p| p.parse_infix(0))
    }

    /// Precedence climbing: consumes operators that bind at least as
    /// tightly as `min_power`.
    fn parse_infix(&mut self, min_power: u8) -> Result<Expression, SyntaxError> {
        let mut left = self.parse_concat()?;
        loop {
            let operator = match self.current_kind() {
                TokenKind::Operator(symbol) => InfixOperator::from_symbol(symbol),
                _ => None,
            };
            let Some(operator) = operator else {
                break;
            };
            let power = infix_binding_power(operator);
            if power.left < min_power {
                break;
            }
            self.advance();
            let right = self.parse_infix(power.right)?;
            left = build_infix(operator, left, right);
        }
        Ok(left)
    }

    /// Parses one or more juxtaposed operands. A second operand is only
    /// taken if it parses completely; otherwise the cursor is rewound and
    /// the sequence ends.
    fn parse_concat(&mut self) -> Result<Expression, SyntaxError> {
        let mut members = vec![self.parse_unary()?];
        while !self.check(&TokenKind::Semicolon) {
            let Some(next) = self.speculate(|p| {
                p.match_operator("+");
                p.parse_unary()
            }) else {
                break;
            };
            members.push(next);
        }

        match <[Expression; 1]>::try_from(members) {
            Ok([single]) => Ok(single),
            Err(members) => {
                let loc = span(members.first(), members.last());
                Ok(Expression {
                    kind: ExpressionKind::Concat { body: members },
                    loc,
                })
            }
        }
    }

    /// Parses `!operand`, `-operand` or a postfix expression.
    pub(super) fn parse_unary(&mut self) -> Result<Expression, SyntaxError> {
        let operator = match self.current_kind() {
            TokenKind::Operator(symbol) => UnaryOperator::from_symbol(symbol),
            _ => None,
        };
        let Some(operator) = operator else {
            return self.parse_postfix();
        };

        let start = self.current;
        self.advance();
        let argument = self.nested(Self::parse_unary)?;
        let argument = unwrap_group_if(argument, unary_operand_needs_parens);
        Ok(Expression::with_location(
            ExpressionKind::Unary {
                operator,
                argument: Box::new(argument),
            },
            self.location_from(start),
        ))
    }

    /// Parses a primary followed by `.name`, `:name` and `(args)` suffixes.
    ///
    /// Suffixes only apply to identifiers and member chains, and a call's
    /// `(` must follow the callee directly: `f (x)` is a concatenation.
    pub(super) fn parse_postfix(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.current;
        let mut expr = self.parse_primary()?;

        while is_path(&expr) {
            match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let name = self.expect_identifier("a property name after `.`")?;
                    let property = if expr.segment_name().is_some_and(|segment| segment == "http") {
                        ExpressionKind::Header { name }
                    } else {
                        ExpressionKind::Identifier { name }
                    };
                    let property = Expression::with_location(property, self.previous_location());
                    expr = Expression::with_location(
                        ExpressionKind::Member {
                            base: Box::new(expr),
                            property: Box::new(property),
                        },
                        self.location_from(start),
                    );
                }
                TokenKind::Colon => {
                    self.advance();
                    let name = self.expect_identifier("a name after `:`")?;
                    let name = Expression::with_location(
                        ExpressionKind::Identifier { name },
                        self.previous_location(),
                    );
                    expr = Expression::with_location(
                        ExpressionKind::ValuePair {
                            base: Box::new(expr),
                            name: Box::new(name),
                        },
                        self.location_from(start),
                    );
                }
                TokenKind::LeftParen if !self.current_token().has_leading_trivia() => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::with_location(
                        ExpressionKind::FunctionCall {
                            callee: Box::new(expr),
                            arguments,
                        },
                        self.location_from(start),
                    );
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    /// Parses `(arg, arg, ...)`; a trailing comma is allowed.
    fn parse_arguments(&mut self) -> Result<Vec<Expression>, SyntaxError> {
        self.advance();
        let mut arguments = Vec::new();
        while !self.check(&TokenKind::RightParen) {
            arguments.push(self.parse_expression()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.expect(&TokenKind::RightParen, "`)` to close the argument list")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> Result<Expression, SyntaxError> {
        if self.check(&TokenKind::LeftParen) {
            return self.parse_group();
        }
        let loc = self.current_token().location();
        let kind = match self.current_kind() {
            TokenKind::Number(raw) => {
                classify_number(raw).map_err(|message| SyntaxError::new(message, loc))?
            }
            TokenKind::String(value) => ExpressionKind::StringLiteral {
                value: value.clone(),
            },
            TokenKind::LongString(value) => ExpressionKind::MultilineLiteral {
                value: value.clone(),
            },
            TokenKind::Identifier(name) if name == "true" || name == "false" => {
                ExpressionKind::BooleanLiteral { value: name.clone() }
            }
            TokenKind::Identifier(name) => ExpressionKind::Identifier { name: name.clone() },
            _ => return Err(self.unexpected("an expression")),
        };
        self.advance();
        Ok(Expression::with_location(kind, loc))
    }

    fn parse_group(&mut self) -> Result<Expression, SyntaxError> {
        let start = self.current;
        self.advance();
        let body = self.parse_expression()?;
        self.expect(&TokenKind::RightParen, "`)`")?;
        Ok(Expression::with_location(
            ExpressionKind::BooleanGroup {
                body: Box::new(body),
            },
            self.location_from(start),
        ))
    }
}

/// Builds an infix node, folding away source parentheses around an operand
/// that the printer would parenthesize anyway.
fn build_infix(operator: InfixOperator, left: Expression, right: Expression) -> Expression {
    let left = unwrap_group_if(left, |inner| operand_needs_parens(operator, inner, Side::Left));
    let right = unwrap_group_if(right, |inner| operand_needs_parens(operator, inner, Side::Right));
    let loc = span(Some(&left), Some(&right));
    let (left, right) = (Box::new(left), Box::new(right));
    let kind = match operator {
        InfixOperator::Binary(operator) => ExpressionKind::Binary {
            left,
            operator,
            right,
        },
        InfixOperator::Logical(operator) => ExpressionKind::Logical {
            left,
            operator,
            right,
        },
    };
    Expression { kind, loc }
}

fn unwrap_group_if(expr: Expression, redundant: impl Fn(&Expression) -> bool) -> Expression {
    match expr.kind {
        ExpressionKind::BooleanGroup { body } if redundant(body.as_ref()) => *body,
        kind => Expression {
            kind,
            loc: expr.loc,
        },
    }
}

fn is_path(expr: &Expression) -> bool {
    matches!(
        expr.kind,
        ExpressionKind::Identifier { .. } | ExpressionKind::Member { .. }
    )
}

fn span(first: Option<&Expression>, last: Option<&Expression>) -> Option<Location> {
    match (first.and_then(|e| e.loc), last.and_then(|e| e.loc)) {
        (Some(start), Some(end)) => Some(start.to(end)),
        (start, end) => start.or(end),
    }
}

/// Sorts a number token into a plain numeric or a duration literal.
fn classify_number(raw: &EcoString) -> Result<ExpressionKind, EcoString> {
    let digits_end = raw
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(raw.len());
    let (number, suffix) = raw.split_at(digits_end);

    if suffix.is_empty() {
        let integer = number.split('.').next().unwrap_or(number);
        if integer.len() > 1 && integer.starts_with('0') {
            return Err(eco_format!("numeric literal `{raw}` has a leading zero"));
        }
        Ok(ExpressionKind::NumericLiteral { value: raw.clone() })
    } else if DURATION_UNITS.contains(&suffix) {
        Ok(ExpressionKind::DurationLiteral { value: raw.clone() })
    } else {
        Err(eco_format!("invalid numeric literal `{raw}`"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_plain_numbers() {
        for raw in ["0", "7", "42", "0.5", "10.25"] {
            assert!(
                matches!(classify_number(&raw.into()), Ok(ExpressionKind::NumericLiteral { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn classify_durations() {
        for raw in ["1ms", "35s", "5m", "2h", "7d", "1y", "0.5s"] {
            assert!(
                matches!(classify_number(&raw.into()), Ok(ExpressionKind::DurationLiteral { .. })),
                "{raw}"
            );
        }
    }

    #[test]
    fn classify_rejects_bad_numbers() {
        assert!(classify_number(&"035".into()).is_err());
        assert!(classify_number(&"00".into()).is_err());
        assert!(classify_number(&"5w".into()).is_err());
        assert!(classify_number(&"5sec".into()).is_err());
    }

    #[test]
    fn group_is_unwrapped_only_when_redundant() {
        let group = Expression::new(ExpressionKind::BooleanGroup {
            body: Box::new(Expression::identifier("a")),
        });
        assert_eq!(unwrap_group_if(group.clone(), |_| false), group);
        assert_eq!(unwrap_group_if(group, |_| true), Expression::identifier("a"));
    }
}
