// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Parsing infrastructure for VCL source code.
//!
//! This module contains the lexer, the token types and the parser.
//!
//! # Lexical Analysis
//!
//! The [`Lexer`] converts source text into a stream of [`Token`]s. Each token
//! carries its source location via [`Location`] and the whitespace and
//! comments around it as [`Trivia`].
//!
//! ```
//! use vclkit_core::source_analysis::{Lexer, TokenKind};
//!
//! let tokens: Vec<_> = Lexer::new("set x = 1;").collect();
//! assert_eq!(tokens.len(), 5); // set, x, =, 1, ;
//! ```
//!
//! # Parsing
//!
//! The [`parse`] function converts tokens into a [`Program`](crate::ast::Program).
//! Infix precedence uses Pratt parsing (see [`crate::precedence`]).
//!
//! # Error Handling
//!
//! The lexer never fails: invalid input becomes a [`TokenKind::Error`] token.
//! The parser reports the first problem, including an error token, as a
//! [`SyntaxError`].

mod error;
mod lexer;
mod location;
mod parser;
mod token;

#[cfg(test)]
mod lexer_property_tests;

pub use error::SyntaxError;
pub use lexer::{Lexer, lex, lex_with_eof};
pub use location::{Location, Position};
pub use parser::parse;
pub use token::{Token, TokenKind, Trivia};
