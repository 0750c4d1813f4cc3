// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parser for VCL source code.
//!
//! This module implements a recursive descent parser that converts a token
//! stream into an AST. Statements dispatch on their leading keyword; binary
//! and logical operators use Pratt parsing over the shared table in
//! [`crate::precedence`].
//!
//! # Error Handling
//!
//! The parser stops at the first problem and returns a [`SyntaxError`]
//! pointing at the offending token. The one place an error is swallowed is
//! the speculative operand attempt of implicit concatenation (see
//! [`Parser::speculate`]).
//!
//! # Comments
//!
//! A statement claims the comments in the leading trivia of its first token
//! and the same-line comment after its last token. A block claims the
//! comment after its `{` and the comments before its `}`. Anything else ends
//! up in [`Program::unattached_comments`].
//!
//! # Module Structure
//!
//! - [`statements`] - statement dispatch, blocks and declarations
//! - [`expressions`] - precedence climbing, concatenation, postfix and
//!   primary expressions

use std::collections::HashSet;

use ecow::{EcoString, eco_format};
use tracing::{debug, trace};

use crate::ast::{Comment, CommentKind, Program};

use super::{Location, SyntaxError, Token, TokenKind, Trivia};

mod expressions;
mod statements;


/// Maximum nesting depth for expressions and blocks before the parser bails
/// out.
///
/// Prevents stack overflow on deeply nested input (e.g. `(((((...)))))`).
/// As a second line of defence, `stacker::maybe_grow` is used at the
/// recursive entry points so the stack is extended on the heap if needed.
const MAX_NESTING_DEPTH: usize = 128;

/// Parse a sequence of tokens into a program.
///
/// The token stream should end with [`TokenKind::Eof`]; one is appended if
/// it is missing.
///
/// # Examples
///
/// ```
/// use vclkit_core::source_analysis::{lex_with_eof, parse};
///
/// let program = parse(lex_with_eof("set req.http.X = \"a\" \"b\";")).unwrap();
/// assert_eq!(program.body.len(), 1);
/// ```
pub fn parse(tokens: Vec<Token>) -> Result<Program, SyntaxError> {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program()?;
    debug!(
        statements = program.body.len(),
        unattached_comments = program.unattached_comments.len(),
        "parsed program"
    );
    Ok(program)
}

/// The parser state.
pub(super) struct Parser {
    /// The tokens being parsed; never empty, always ends with EOF.
    tokens: Vec<Token>,
    /// Current token index.
    current: usize,
    /// Current expression/block nesting depth.
    nesting_depth: usize,
    /// Tokens whose leading comments have been attached to a node.
    claimed_leading: HashSet<usize>,
    /// Tokens whose trailing comment has been attached to a node.
    claimed_trailing: HashSet<usize>,
}

impl Parser {
    fn new(mut tokens: Vec<Token>) -> Self {
        if !tokens.last().is_some_and(|token| token.kind().is_eof()) {
            let end = tokens
                .last()
                .map(|token| Location::point(token.location().end))
                .unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, end));
        }
        Self {
            tokens,
            current: 0,
            nesting_depth: 0,
            claimed_leading: HashSet::new(),
            claimed_trailing: HashSet::new(),
        }
    }

    fn parse_program(&mut self) -> Result<Program, SyntaxError> {
        let mut body = Vec::new();
        while !self.is_at_end() {
            body.push(self.parse_statement()?);
        }
        let trailing_comments = self.claim_leading_comments();
        let loc = self.location_from(0);
        let unattached_comments = self.unclaimed_comments();
        Ok(Program {
            body,
            trailing_comments,
            unattached_comments,
            loc: Some(loc),
        })
    }

    // ========================================================================
    // Token Management
    // ========================================================================

    pub(super) fn current_token(&self) -> &Token {
        &self.tokens[self.current.min(self.tokens.len() - 1)]
    }

    pub(super) fn current_kind(&self) -> &TokenKind {
        self.current_token().kind()
    }

    /// Peeks `offset` tokens ahead; clamps to EOF.
    pub(super) fn peek_at(&self, offset: usize) -> &TokenKind {
        let index = (self.current + offset).min(self.tokens.len() - 1);
        self.tokens[index].kind()
    }

    pub(super) fn is_at_end(&self) -> bool {
        self.current_kind().is_eof()
    }

    /// Advances to the next token and returns the previous one.
    pub(super) fn advance(&mut self) -> Token {
        let token = self.current_token().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Checks if the current token has the same kind as `kind`, ignoring
    /// any payload.
    pub(super) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.current_kind()) == std::mem::discriminant(kind)
    }

    pub(super) fn check_keyword(&self, word: &str) -> bool {
        self.current_kind().is_keyword(word)
    }

    pub(super) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub(super) fn match_operator(&mut self, op: &str) -> bool {
        if self.current_kind().is_operator(op) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Expects the current token to match `kind`, advancing if it does.
    pub(super) fn expect(
        &mut self,
        kind: &TokenKind,
        expected: &str,
    ) -> Result<Token, SyntaxError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(expected))
        }
    }

    pub(super) fn expect_identifier(&mut self, expected: &str) -> Result<EcoString, SyntaxError> {
        match self.current_kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(expected)),
        }
    }

    pub(super) fn expect_keyword(&mut self, word: &str) -> Result<(), SyntaxError> {
        if self.check_keyword(word) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&format!("`{word}`")))
        }
    }

    /// Location of the most recently consumed token.
    pub(super) fn previous_location(&self) -> Location {
        self.tokens[self.current.saturating_sub(1)].location()
    }

    /// Location from the token at `start` through the last consumed token.
    pub(super) fn location_from(&self, start: usize) -> Location {
        let first = self.tokens[start.min(self.tokens.len() - 1)].location();
        if self.current > start {
            first.to(self.previous_location())
        } else {
            Location::point(first.start)
        }
    }

    // ========================================================================
    // Errors, Backtracking & Nesting
    // ========================================================================

    /// Builds an error for the current token. Lexer error tokens report
    /// their own message.
    pub(super) fn unexpected(&self, expected: &str) -> SyntaxError {
        let token = self.current_token();
        let message = match token.kind() {
            TokenKind::Error(message) => message.clone(),
            TokenKind::Eof => eco_format!("unexpected end of input, expected {expected}"),
            kind => eco_format!("expected {expected}, found `{kind}`"),
        };
        SyntaxError::new(message, token.location())
    }

    /// Runs `attempt`; on failure rewinds the cursor to where it started and
    /// discards the error.
    ///
    /// Only the implicit-concatenation loop uses this. Nothing inside an
    /// expression claims comments, so the token index is the only state to
    /// restore.
    pub(super) fn speculate<T>(
        &mut self,
        attempt: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Option<T> {
        let checkpoint = self.current;
        match attempt(self) {
            Ok(value) => Some(value),
            Err(error) => {
                trace!(%error, token = checkpoint, "rolled back speculative operand");
                self.current = checkpoint;
                None
            }
        }
    }

    /// Runs `f` one nesting level deeper, growing the stack on the heap if
    /// needed.
    pub(super) fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, SyntaxError>,
    ) -> Result<T, SyntaxError> {
        self.nesting_depth += 1;
        let result = if self.nesting_depth > MAX_NESTING_DEPTH {
            Err(SyntaxError::new(
                format!("nesting is too deep (maximum {MAX_NESTING_DEPTH} levels)"),
                self.current_token().location(),
            ))
        } else {
            // 32 KiB red zone, 256 KiB new segment.
            stacker::maybe_grow(32 * 1024, 256 * 1024, || f(self))
        };
        self.nesting_depth -= 1;
        result
    }

    // ========================================================================
    // Comment Attachment
    // ========================================================================

    /// Takes the comments before the current token.
    pub(super) fn claim_leading_comments(&mut self) -> Vec<Comment> {
        let index = self.current.min(self.tokens.len() - 1);
        self.claimed_leading.insert(index);
        self.tokens[index]
            .leading_trivia()
            .iter()
            .filter_map(comment_from_trivia)
            .collect()
    }

    /// Takes the same-line comment after the last consumed token.
    pub(super) fn claim_trailing_comment(&mut self) -> Option<Comment> {
        if self.current == 0 {
            return None;
        }
        let index = self.current - 1;
        self.claimed_trailing.insert(index);
        self.tokens[index]
            .trailing_trivia()
            .iter()
            .find_map(comment_from_trivia)
    }

    fn unclaimed_comments(&self) -> Vec<Comment> {
        let mut comments = Vec::new();
        for (index, token) in self.tokens.iter().enumerate() {
            if !self.claimed_leading.contains(&index) {
                comments.extend(token.leading_trivia().iter().filter_map(comment_from_trivia));
            }
            if !self.claimed_trailing.contains(&index) {
                comments.extend(token.trailing_trivia().iter().filter_map(comment_from_trivia));
            }
        }
        comments
    }
}

fn comment_from_trivia(trivia: &Trivia) -> Option<Comment> {
    let (text, kind, loc) = match trivia {
        Trivia::Whitespace(_) => return None,
        Trivia::LineComment(text, loc) => (text, CommentKind::Line, loc),
        Trivia::BlockComment(text, loc) => (text, CommentKind::Block, loc),
    };
    Some(Comment {
        text: text.clone(),
        kind,
        loc: Some(*loc),
    })
}
