// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! The syntax error raised by the lexer/parser pipeline.
//!
//! There is exactly one error kind. It carries a message and the source
//! location of the offending span, and integrates with [`miette`] so the
//! CLI can render it against the original file.

// Spurious warnings from miette derive macro expansion
#![allow(unused_assignments)]

use ecow::EcoString;
use miette::Diagnostic;
use thiserror::Error;

use super::Location;

/// A fatal parse error.
///
/// Displays as `"{message} (line L, column C)"` with 1-based line and column.
///
/// ```
/// use vclkit_core::parse_source;
///
/// let err = parse_source("set x = 035;").unwrap_err();
/// assert_eq!(err.location.start.line, 1);
/// assert!(err.to_string().contains("(line 1, column 9)"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("{message} (line {}, column {})", .location.start.line, .location.start.column)]
#[diagnostic(code(vclkit::syntax))]
pub struct SyntaxError {
    pub message: EcoString,
    #[label("here")]
    pub location: Location,
}

impl SyntaxError {
    #[must_use]
    pub fn new(message: impl Into<EcoString>, location: Location) -> Self {
        Self {
            message: message.into(),
            location,
        }
    }
}
