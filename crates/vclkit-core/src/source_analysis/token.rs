// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Token types for VCL lexical analysis.
//!
//! This module defines the token types produced by the lexer, including
//! support for trivia (whitespace and comments) so the formatter can carry
//! comments through a parse/print round-trip.
//!
//! # Token Structure
//!
//! Each token consists of:
//! - A [`TokenKind`] indicating the type of token and its lexeme
//! - A [`Location`] indicating its position in source
//! - Leading and trailing [`Trivia`]

use ecow::EcoString;

use super::Location;

/// The kind of token, not including source location or trivia.
///
/// Literal-bearing kinds keep the raw source text, quotes included, so the
/// printer can reproduce them byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Literals ===
    /// An identifier or keyword: `set`, `req`, `X-Forwarded-For`
    Identifier(EcoString),

    /// A number, possibly with a unit suffix: `42`, `0.5`, `3600s`
    Number(EcoString),

    /// A single-line string, quotes included: `"hello"`
    String(EcoString),

    /// A long string, delimiters included: `{"multi\nline"}`
    LongString(EcoString),

    /// A comparison, logical, unary or assignment operator: `==`, `&&`, `!`, `+=`
    Operator(EcoString),

    // === Delimiters ===
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `(`
    LeftParen,
    /// `)`
    RightParen,

    // === Punctuation ===
    /// Statement terminator: `;`
    Semicolon,
    /// Argument and table entry separator: `,`
    Comma,
    /// Member access and backend property prefix: `.`
    Dot,
    /// Value-pair and table entry separator: `:`
    Colon,
    /// CIDR separator in ACL entries: `/`
    Slash,

    // === Special ===
    /// End of file
    Eof,

    /// Invalid input, carrying a description of what went wrong
    Error(EcoString),
}

impl TokenKind {
    /// Returns `true` if this token is an identifier.
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        matches!(self, Self::Identifier(_))
    }

    /// Returns `true` if this token is the identifier `word`.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        matches!(self, Self::Identifier(name) if name == word)
    }

    /// Returns `true` if this token is the operator `op`.
    #[must_use]
    pub fn is_operator(&self, op: &str) -> bool {
        matches!(self, Self::Operator(text) if text == op)
    }

    /// Returns `true` if this is the end-of-file marker.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /// Returns `true` if this is an error token.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Identifier(s)
            | Self::Number(s)
            | Self::String(s)
            | Self::LongString(s)
            | Self::Operator(s) => write!(f, "{s}"),
            Self::Error(s) => write!(f, "<error: {s}>"),
            Self::LeftBrace => write!(f, "{{"),
            Self::RightBrace => write!(f, "}}"),
            Self::LeftParen => write!(f, "("),
            Self::RightParen => write!(f, ")"),
            Self::Semicolon => write!(f, ";"),
            Self::Comma => write!(f, ","),
            Self::Dot => write!(f, "."),
            Self::Colon => write!(f, ":"),
            Self::Slash => write!(f, "/"),
            Self::Eof => write!(f, "<eof>"),
        }
    }
}

/// Trivia represents non-semantic content like whitespace and comments.
///
/// Comments keep their delimiters (`#`, `//`, `/* */`) and their location,
/// which the printer uses to reproduce blank lines around them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trivia {
    /// Whitespace (spaces, tabs, newlines)
    Whitespace(EcoString),

    /// A line comment: `# text` or `// text`
    LineComment(EcoString, Location),

    /// A block comment: `/* text */`
    BlockComment(EcoString, Location),
}

impl Trivia {
    /// Returns the raw text of this trivia.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Whitespace(s) | Self::LineComment(s, _) | Self::BlockComment(s, _) => s,
        }
    }

    /// Returns `true` if this trivia contains a newline.
    #[must_use]
    pub fn contains_newline(&self) -> bool {
        self.as_str().contains('\n')
    }

    /// Returns `true` if this is a comment.
    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self, Self::LineComment(..) | Self::BlockComment(..))
    }

    /// Location of a comment; whitespace has none.
    #[must_use]
    pub const fn location(&self) -> Option<Location> {
        match self {
            Self::Whitespace(_) => None,
            Self::LineComment(_, loc) | Self::BlockComment(_, loc) => Some(*loc),
        }
    }
}

/// A token with its source location and surrounding trivia.
///
/// # Examples
///
/// ```
/// use vclkit_core::source_analysis::{Location, Token, TokenKind};
///
/// let token = Token::new(TokenKind::Identifier("set".into()), Location::default());
/// assert!(token.kind().is_keyword("set"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    location: Location,
    leading_trivia: Vec<Trivia>,
    trailing_trivia: Vec<Trivia>,
}

impl Token {
    /// Creates a new token with no trivia.
    #[must_use]
    pub fn new(kind: TokenKind, location: Location) -> Self {
        Self {
            kind,
            location,
            leading_trivia: Vec::new(),
            trailing_trivia: Vec::new(),
        }
    }

    /// Creates a new token with trivia.
    #[must_use]
    pub fn with_trivia(
        kind: TokenKind,
        location: Location,
        leading_trivia: Vec<Trivia>,
        trailing_trivia: Vec<Trivia>,
    ) -> Self {
        Self {
            kind,
            location,
            leading_trivia,
            trailing_trivia,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &TokenKind {
        &self.kind
    }

    #[must_use]
    pub fn into_kind(self) -> TokenKind {
        self.kind
    }

    /// Returns the source location of this token (excluding trivia).
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    #[must_use]
    pub fn leading_trivia(&self) -> &[Trivia] {
        &self.leading_trivia
    }

    #[must_use]
    pub fn trailing_trivia(&self) -> &[Trivia] {
        &self.trailing_trivia
    }

    /// Returns `true` if any whitespace or comment precedes this token.
    ///
    /// Used to tell a call `f(x)` apart from a concatenation `f (x)`.
    #[must_use]
    pub fn has_leading_trivia(&self) -> bool {
        !self.leading_trivia.is_empty()
    }

    #[must_use]
    pub fn has_leading_comment(&self) -> bool {
        self.leading_trivia.iter().any(Trivia::is_comment)
    }

    #[must_use]
    pub fn has_trailing_comment(&self) -> bool {
        self.trailing_trivia.iter().any(Trivia::is_comment)
    }
}
