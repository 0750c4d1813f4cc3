// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Property-based tests for the unparser.
//!
//! Programs are generated as source text from a small grammar covering
//! operators, groupings, nested conditionals, comments and blank lines.
//!
//! 1. **Round trip** - printed output parses back to the same tree
//! 2. **Idempotence** - printing the reparsed tree gives the same text
//! 3. **Narrow widths** - heavily broken output still parses back
//! 4. **Precedence** - built operator trees survive printing

use proptest::prelude::*;

use super::{FormatOptions, unparse_expression, unparse_program, unparse_program_with};
use crate::ast::{BinaryOperator, Expression, ExpressionKind, LogicalOperator, Program};
use crate::parse_source;

// ============================================================================
// Generators
// ============================================================================

const LEAVES: &[&str] = &[
    "a",
    "b",
    "req.url",
    "req.http.Host",
    "client.ip",
    "\"x\"",
    "\"^/static/\"",
    "1",
    "10s",
    "true",
    "f(a)",
    "std.tolower(req.url)",
    "req.http.Cookie:session",
];

const INFIX: &[&str] = &["==", "!=", "~", "!~", "<", ">=", "&&", "||"];

const SIMPLE: &[&str] = &[
    "esi;",
    "restart;",
    "return(pass);",
    "unset req.http.Cookie;",
    "error 404 \"nope\";",
    "set req.http.Y = \"a\" req.url \"b\";",
    "set req.http.Z = regsub(req.url, \"^/old/\", \"/new/\");",
];

fn expression() -> impl Strategy<Value = String> {
    prop::sample::select(LEAVES)
        .prop_map(str::to_string)
        .prop_recursive(4, 24, 2, |inner| {
            prop_oneof![
                (inner.clone(), prop::sample::select(INFIX), inner.clone())
                    .prop_map(|(left, op, right)| format!("{left} {op} {right}")),
                inner.clone().prop_map(|e| format!("!{e}")),
                inner.prop_map(|e| format!("({e})")),
            ]
        })
}

fn simple_statement() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(SIMPLE).prop_map(str::to_string),
        expression().prop_map(|e| format!("set req.http.X-Result = {e};")),
        expression().prop_map(|e| format!("log {e};")),
    ]
}

/// Adds an optional blank line, leading comment and trailing comment.
fn decorated(statement: impl Strategy<Value = String>) -> impl Strategy<Value = String> {
    (
        statement,
        any::<bool>(),
        any::<bool>(),
        any::<bool>(),
        "[ \t]{0,3}",
    )
        .prop_map(|(statement, blank, leading, trailing, blanks)| {
            let mut out = String::new();
            if blank {
                out.push('\n');
            }
            if leading {
                out.push_str(&format!("# note{blanks}\n"));
            }
            out.push_str(&statement);
            if trailing {
                out.push_str(&format!(" # why{blanks}"));
            }
            out
        })
}

fn statement() -> impl Strategy<Value = String> {
    simple_statement().prop_recursive(3, 16, 4, |inner| {
        let body = prop::collection::vec(decorated(inner), 0..4)
            .prop_map(|s| s.join("\n"))
            .boxed();
        prop_oneof![
            (expression(), body.clone())
                .prop_map(|(test, body)| format!("if ({test}) {{\n{body}\n}}")),
            (expression(), body.clone(), body.clone()).prop_map(|(test, then, otherwise)| {
                format!("if ({test}) {{\n{then}\n}} else {{\n{otherwise}\n}}")
            }),
            (expression(), expression(), body.clone(), body).prop_map(
                |(first, second, then, otherwise)| {
                    format!("if ({first}) {{\n{then}\n}} elsif ({second}) {{\n{otherwise}\n}}")
                }
            ),
        ]
    })
}

fn program() -> impl Strategy<Value = String> {
    (prop::collection::vec(decorated(statement()), 0..5), any::<bool>()).prop_map(
        |(statements, wrap)| {
            let body = statements.join("\n");
            if wrap {
                format!("sub vcl_recv {{\n{body}\n}}\n")
            } else {
                body
            }
        },
    )
}

fn parse_located(source: &str) -> Result<Program, TestCaseError> {
    parse_source(source)
        .map_err(|err| TestCaseError::fail(format!("{source:?} failed to parse: {err}")))
}

fn parse_stripped(source: &str) -> Result<Program, TestCaseError> {
    let mut program = parse_located(source)?;
    program.strip_locations();
    Ok(program)
}

fn comparison(operator: BinaryOperator) -> impl Strategy<Value = Expression> {
    (
        prop::sample::select(&["a", "b", "c"][..]),
        prop::sample::select(&["x", "y"][..]),
    )
        .prop_map(move |(left, right)| {
            Expression::new(ExpressionKind::Binary {
                left: Box::new(Expression::identifier(left)),
                operator,
                right: Box::new(Expression::identifier(right)),
            })
        })
}

/// Logical trees of arbitrary shape, with no groupings.
fn logical_tree() -> impl Strategy<Value = Expression> {
    prop_oneof![
        comparison(BinaryOperator::Equal),
        comparison(BinaryOperator::Match),
    ]
    .prop_recursive(4, 16, 2, |inner| {
        (inner.clone(), any::<bool>(), inner).prop_map(|(left, and, right)| {
            Expression::new(ExpressionKind::Logical {
                left: Box::new(left),
                operator: if and {
                    LogicalOperator::And
                } else {
                    LogicalOperator::Or
                },
                right: Box::new(right),
            })
        })
    })
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// Properties 1 and 2: output reparses to the same tree and is stable.
    #[test]
    fn printed_program_round_trips(source in program()) {
        let located = parse_located(&source)?;
        let printed = unparse_program(&located);
        let reparsed = parse_located(&printed)?;
        prop_assert_eq!(unparse_program(&reparsed), printed.clone());
        prop_assert_eq!(
            &parse_stripped(&printed)?,
            &parse_stripped(&source)?,
            "printed:\n{}",
            printed
        );
    }

    /// Property 3: breaking every group still yields the same tree.
    #[test]
    fn narrow_output_round_trips(source in program(), line_width in 1usize..30) {
        let original = parse_stripped(&source)?;
        let options = FormatOptions { line_width, ..FormatOptions::default() };
        let printed = unparse_program_with(&original, &options);
        let reparsed = parse_stripped(&printed)?;
        prop_assert_eq!(&reparsed, &original, "printed:\n{}", printed);
    }

    /// Property 4: a logical tree built without groupings keeps its shape.
    #[test]
    fn built_logical_trees_survive(expr in logical_tree()) {
        let printed = unparse_expression(&expr);
        let source = format!("set req.http.X = {printed};");
        let program = parse_stripped(&source)?;
        let Some(statement) = program.body.first() else {
            return Err(TestCaseError::fail("no statement"));
        };
        let crate::ast::StatementKind::Set { value, .. } = &statement.kind else {
            return Err(TestCaseError::fail("not a set statement"));
        };
        prop_assert_eq!(value, &expr, "printed: {}", printed);
    }
}
