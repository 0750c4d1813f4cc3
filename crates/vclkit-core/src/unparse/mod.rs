// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! AST unparser: converts a VCL [`Program`] back to formatted source text.
//!
//! The unparser builds a [`Document`] from the tree, then renders it at the
//! configured line width. It is the inverse of the parser: printing a parsed
//! program and parsing the output gives back the same tree, locations aside.
//!
//! # Vertical Spacing
//!
//! Statements and comments keep the blank lines they had in the source. The
//! number of newlines before an item is its start line minus the end line of
//! the previous item, and at least one. An item without a location (built by
//! a rewrite) gets a single newline and leaves the line counter alone.
//!
//! # Comment Handling
//!
//! - **Leading comments** appear one per line immediately before a statement.
//! - **Trailing comment** appears after the statement on the same line.
//! - A block's opening comment stays on the `{` line; its closing comments
//!   go before the `}`.
//! - Comments in [`Program::unattached_comments`] are not printed. Each call
//!   reports them with a `warn!` event.
//!
//! # Parentheses
//!
//! Operands are parenthesized by [`crate::precedence`], the same table the
//! parser uses to fold redundant groupings.

pub mod document;

#[cfg(test)]
mod property_tests;

use tracing::{debug, warn};

use crate::ast::{
    AclEntry, Alternative, BackendDefinition, BackendValue, Block, Comment, Expression,
    ExpressionKind, IfStatement, Program, Statement, StatementKind, TableEntry,
};
use crate::docvec;
use crate::precedence::{InfixOperator, Side, operand_needs_parens, unary_operand_needs_parens};
use document::{
    Document, Documentable, concat, group, hardline, if_break, join, nest, nil, softbreak,
    softline,
};

/// Layout settings for the printer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Target maximum line width.
    pub line_width: usize,
    /// Spaces per indentation level.
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            line_width: 80,
            indent: 2,
        }
    }
}

// --- Public entry points ---

/// Unparses a [`Program`] with the default [`FormatOptions`].
///
/// The output ends with a newline unless the program is empty.
#[must_use]
pub fn unparse_program(program: &Program) -> String {
    unparse_program_with(program, &FormatOptions::default())
}

/// Unparses a [`Program`] with explicit [`FormatOptions`].
#[must_use]
pub fn unparse_program_with(program: &Program, options: &FormatOptions) -> String {
    debug!(
        statements = program.body.len(),
        line_width = options.line_width,
        "unparsing program"
    );
    report_unattached_comments(program);

    let printer = Printer::new(options);
    let mut output = printer.program(program).to_pretty_string(options.line_width);
    if !output.is_empty() {
        output.push('\n');
    }
    output
}

/// Unparses a single expression with the default options.
#[must_use]
pub fn unparse_expression(expr: &Expression) -> String {
    let options = FormatOptions::default();
    Printer::new(&options)
        .expression(expr)
        .to_pretty_string(options.line_width)
}

fn report_unattached_comments(program: &Program) {
    if program.unattached_comments.is_empty() {
        return;
    }
    let lines: Vec<u32> = program
        .unattached_comments
        .iter()
        .filter_map(|comment| comment.loc.map(|loc| loc.start.line))
        .collect();
    warn!(
        count = program.unattached_comments.len(),
        ?lines,
        "comments inside expressions or definitions are not printed"
    );
}

// --- Document builders ---

struct Printer {
    indent: isize,
}

impl Printer {
    fn new(options: &FormatOptions) -> Self {
        Self {
            indent: isize::try_from(options.indent).unwrap_or(2),
        }
    }

    fn program(&self, program: &Program) -> Document<'static> {
        concat(self.statement_list(&program.body, &program.trailing_comments))
    }

    /// Statements followed by comments, each separated by as many newlines
    /// as the source had.
    fn statement_list(
        &self,
        statements: &[Statement],
        closing: &[Comment],
    ) -> Vec<Document<'static>> {
        let mut spacing = Spacing::default();
        let mut docs = Vec::new();
        for stmt in statements {
            for comment in &stmt.comments.leading {
                spacing.separate(&mut docs, comment.loc.map(|loc| (loc.start.line, loc.end.line)));
                docs.push(comment_doc(comment));
            }
            spacing.separate(&mut docs, stmt.loc.map(|loc| (loc.start.line, loc.end.line)));
            docs.push(self.statement(stmt));
        }
        for comment in closing {
            spacing.separate(&mut docs, comment.loc.map(|loc| (loc.start.line, loc.end.line)));
            docs.push(comment_doc(comment));
        }
        docs
    }

    fn statement(&self, stmt: &Statement) -> Document<'static> {
        let body = self.statement_kind(&stmt.kind);
        match &stmt.comments.trailing {
            Some(comment) => docvec![body, " ", comment_doc(comment)],
            None => body,
        }
    }

    fn statement_kind(&self, kind: &StatementKind) -> Document<'static> {
        match kind {
            StatementKind::Expression { body } => docvec![self.expression(body), ";"],
            StatementKind::Include { module } => docvec!["include ", self.expression(module), ";"],
            StatementKind::Import { module } => docvec!["import ", module.clone(), ";"],
            StatementKind::Call { subroutine } => docvec!["call ", subroutine.clone(), ";"],
            StatementKind::Declare { id, value_type } => docvec![
                "declare local ",
                self.expression(id),
                " ",
                value_type.clone(),
                ";"
            ],
            StatementKind::Add {
                target,
                operator,
                value,
            } => docvec![
                "add ",
                self.expression(target),
                " ",
                operator.as_str(),
                " ",
                self.expression(value),
                ";"
            ],
            StatementKind::Set {
                target,
                operator,
                value,
            } => docvec![
                "set ",
                self.expression(target),
                " ",
                operator.as_str(),
                " ",
                self.expression(value),
                ";"
            ],
            StatementKind::Unset { target } => docvec!["unset ", self.expression(target), ";"],
            StatementKind::Return { action: None } => Document::Str("return;"),
            StatementKind::Return {
                action: Some(action),
            } => docvec!["return(", action.clone(), ");"],
            StatementKind::Error { status, message } => {
                let message = match message {
                    Some(message) => docvec![" ", self.expression(message)],
                    None => nil(),
                };
                docvec!["error ", self.expression(status), message, ";"]
            }
            StatementKind::Restart => Document::Str("restart;"),
            StatementKind::Synthetic { response, base64 } => docvec![
                if *base64 { "synthetic.base64 " } else { "synthetic " },
                self.expression(response),
                ";"
            ],
            StatementKind::Log { content } => docvec!["log ", self.expression(content), ";"],
            StatementKind::If(conditional) => self.conditional(conditional),
            StatementKind::Subroutine { name, body } => {
                docvec!["sub ", name.clone(), " ", self.block(body)]
            }
            StatementKind::Acl { name, entries } => docvec![
                "acl ",
                name.clone(),
                " ",
                self.braced(entries.iter().map(|entry| self.acl_entry(entry)).collect())
            ],
            StatementKind::Backend { name, definitions } => {
                docvec!["backend ", name.clone(), " ", self.backend_definitions(definitions)]
            }
            StatementKind::Table {
                name,
                value_type,
                entries,
            } => {
                let value_type = match value_type {
                    Some(value_type) => docvec![" ", value_type.clone()],
                    None => nil(),
                };
                let entries = entries.iter().map(|entry| self.table_entry(entry)).collect();
                docvec!["table ", name.clone(), value_type, " ", self.braced(entries)]
            }
        }
    }

    /// `if (test) { ... }` plus any `else if`/`else` chain.
    fn conditional(&self, conditional: &IfStatement) -> Document<'static> {
        let mut docs = vec![self.conditional_link(conditional)];
        let mut alternative = &conditional.alternative;
        while let Some(next) = alternative {
            match next {
                Alternative::ElseIf(chained) => {
                    docs.push(docvec![" else ", self.conditional_link(chained)]);
                    alternative = &chained.alternative;
                }
                Alternative::Else(block) => {
                    docs.push(docvec![" else ", self.block(block)]);
                    break;
                }
            }
        }
        concat(docs)
    }

    /// One `if (test) { ... }` link of a chain.
    fn conditional_link(&self, conditional: &IfStatement) -> Document<'static> {
        let test = group(docvec![
            "(",
            nest(self.indent, docvec![softline(), self.expression(&conditional.test)]),
            softline(),
            ")"
        ]);
        docvec!["if ", test, " ", self.block(&conditional.consequent)]
    }

    fn block(&self, block: &Block) -> Document<'static> {
        let body = self.statement_list(&block.statements, &block.closing_comments);
        let open_comment = match &block.open_comment {
            Some(comment) => docvec![" ", comment_doc(comment)],
            None => nil(),
        };
        if body.is_empty() {
            return match block.open_comment {
                Some(_) => docvec!["{", open_comment, hardline(), "}"],
                None => Document::Str("{}"),
            };
        }
        docvec![
            "{",
            open_comment,
            nest(self.indent, docvec![hardline(), concat(body)]),
            hardline(),
            "}"
        ]
    }

    /// Entries one per line between braces; `{}` when empty.
    fn braced(&self, entries: Vec<Document<'static>>) -> Document<'static> {
        if entries.is_empty() {
            return Document::Str("{}");
        }
        docvec![
            "{",
            nest(self.indent, docvec![hardline(), join(entries, &hardline())]),
            hardline(),
            "}"
        ]
    }

    fn backend_definitions(&self, definitions: &[BackendDefinition]) -> Document<'static> {
        self.braced(
            definitions
                .iter()
                .map(|definition| self.backend_definition(definition))
                .collect(),
        )
    }

    fn backend_definition(&self, definition: &BackendDefinition) -> Document<'static> {
        let value = match &definition.value {
            BackendValue::Expression(value) => docvec![self.expression(value), ";"],
            BackendValue::Nested(nested) => self.backend_definitions(nested),
        };
        docvec![".", definition.key.clone(), " = ", value]
    }

    fn acl_entry(&self, entry: &AclEntry) -> Document<'static> {
        let negation = if entry.negated { "!" } else { "" };
        docvec![negation, self.expression(&entry.address), ";"]
    }

    fn table_entry(&self, entry: &TableEntry) -> Document<'static> {
        docvec![entry.key.clone(), ": ", self.expression(&entry.value), ","]
    }

    // --- Expressions ---

    fn expression(&self, expr: &Expression) -> Document<'static> {
        stacker::maybe_grow(32 * 1024, 256 * 1024, || self.expression_kind(expr))
    }

    fn expression_kind(&self, expr: &Expression) -> Document<'static> {
        match &expr.kind {
            ExpressionKind::BooleanLiteral { value }
            | ExpressionKind::StringLiteral { value }
            | ExpressionKind::MultilineLiteral { value }
            | ExpressionKind::DurationLiteral { value }
            | ExpressionKind::NumericLiteral { value } => value.clone().to_doc(),
            ExpressionKind::Identifier { name } | ExpressionKind::Header { name } => {
                name.clone().to_doc()
            }
            ExpressionKind::Member { .. } => self.member_chain(expr),
            ExpressionKind::Ip { address, cidr } => match cidr {
                Some(cidr) => docvec![address.clone(), "/", cidr.clone()],
                None => address.clone().to_doc(),
            },
            ExpressionKind::BooleanGroup { body } => docvec!["(", self.expression(body), ")"],
            ExpressionKind::Unary { operator, argument } => {
                let argument = if unary_operand_needs_parens(argument) {
                    self.parenthesized(argument)
                } else {
                    self.expression(argument)
                };
                docvec![operator.as_str(), argument]
            }
            ExpressionKind::FunctionCall { callee, arguments } => {
                docvec![self.expression(callee), self.arguments(arguments)]
            }
            ExpressionKind::Concat { body } => self.concatenation(body),
            ExpressionKind::Binary {
                left,
                operator,
                right,
            } => self.infix(InfixOperator::Binary(*operator), left, right),
            ExpressionKind::Logical {
                left,
                operator,
                right,
            } => self.infix(InfixOperator::Logical(*operator), left, right),
            ExpressionKind::ValuePair { base, name } => {
                docvec![self.expression(base), ":", self.expression(name)]
            }
        }
    }

    fn parenthesized(&self, expr: &Expression) -> Document<'static> {
        docvec!["(", self.expression(expr), ")"]
    }

    fn infix(
        &self,
        operator: InfixOperator,
        left: &Expression,
        right: &Expression,
    ) -> Document<'static> {
        let operand = |expr: &Expression, side| {
            if operand_needs_parens(operator, expr, side) {
                self.parenthesized(expr)
            } else {
                self.expression(expr)
            }
        };
        docvec![
            operand(left, Side::Left),
            " ",
            operator.as_str(),
            " ",
            operand(right, Side::Right)
        ]
    }

    /// `a.b.c` as one group with a soft line before each `.property`, so
    /// the chain breaks as a unit. A single `base.property` whose base is
    /// not a member itself never breaks.
    fn member_chain(&self, expr: &Expression) -> Document<'static> {
        let mut properties = Vec::new();
        let mut base = expr;
        while let ExpressionKind::Member {
            base: inner,
            property,
        } = &base.kind
        {
            properties.push(property.as_ref());
            base = inner.as_ref();
        }
        if let [property] = properties.as_slice() {
            return docvec![self.expression(base), ".", self.expression(property)];
        }
        let segments = properties
            .into_iter()
            .rev()
            .map(|property| docvec![softline(), ".", self.expression(property)]);
        group(docvec![self.expression(base), nest(self.indent, concat(segments))])
    }

    /// `(a, b)`; broken one argument per line with a trailing comma.
    fn arguments(&self, arguments: &[Expression]) -> Document<'static> {
        if arguments.is_empty() {
            return Document::Str("()");
        }
        let separator = docvec![",", softbreak()];
        let arguments = join(arguments.iter().map(|arg| self.expression(arg)), &separator);
        group(docvec![
            "(",
            nest(
                self.indent,
                docvec![softline(), arguments, if_break(Document::Str(","), nil())]
            ),
            softline(),
            ")"
        ])
    }

    /// Juxtaposed members joined by soft breaks in an indented group.
    fn concatenation(&self, members: &[Expression]) -> Document<'static> {
        let mut members = members.iter().map(|member| {
            if unary_operand_needs_parens(member) {
                self.parenthesized(member)
            } else {
                self.expression(member)
            }
        });
        let Some(first) = members.next() else {
            return nil();
        };
        let rest = members.map(|member| docvec![softbreak(), member]);
        group(docvec![first, nest(self.indent, concat(rest))])
    }
}

fn comment_doc(comment: &Comment) -> Document<'static> {
    comment.text.clone().to_doc()
}

/// Tracks the last source line printed to reproduce blank lines.
#[derive(Debug, Default)]
struct Spacing {
    previous_end: Option<u32>,
}

impl Spacing {
    /// Pushes the newlines that go before an item spanning `lines`
    /// (start, end), unless it is the first item.
    fn separate(&mut self, docs: &mut Vec<Document<'static>>, lines: Option<(u32, u32)>) {
        let breaks = match (self.previous_end, lines) {
            (Some(previous_end), Some((start, _))) => start.saturating_sub(previous_end).max(1),
            _ => 1,
        };
        if !docs.is_empty() {
            docs.extend((0..breaks).map(|_| hardline()));
        }
        if let Some((_, end)) = lines {
            self.previous_end = Some(end);
        }
    }
}
