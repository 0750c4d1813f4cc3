// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! VCL toolkit core.
//!
//! This crate contains everything needed to read, rewrite and re-emit
//! Fastly-style VCL policy scripts:
//! - Lexical analysis (tokenization with comment trivia)
//! - Parsing (AST construction)
//! - Traversal (mutable pre-order walk with ancestor context)
//! - Unparsing (width-aware pretty-printing)
//!
//! ```
//! let program = vclkit_core::parse_source("set req.http.X = \"a\"  \"b\";").unwrap();
//! assert_eq!(vclkit_core::unparse::unparse_program(&program), "set req.http.X = \"a\" \"b\";\n");
//! ```

pub mod ast;
pub mod ast_walker;
pub mod precedence;
pub mod source_analysis;
pub mod unparse;

use source_analysis::{SyntaxError, lex_with_eof, parse};

/// Lexes and parses VCL source text.
///
/// # Errors
///
/// Returns the first [`SyntaxError`] encountered.
pub fn parse_source(source: &str) -> Result<ast::Program, SyntaxError> {
    parse(lex_with_eof(source))
}

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::ast::{Block, Expression, ExpressionKind, Program, Statement, StatementKind};
    pub use crate::ast_walker::{Ancestor, NodeKind, NodeMut, Visitor, traverse};
    pub use crate::parse_source;
    pub use crate::source_analysis::{Location, SyntaxError};
    pub use crate::unparse::{FormatOptions, unparse_program, unparse_program_with};
}
