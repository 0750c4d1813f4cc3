// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Syntax errors rendered against their source file.
//!
//! Wraps a core [`SyntaxError`] with the file name and text so miette can
//! show the offending line with an arrow under the span.

// Suppress unused_assignments for struct fields used by derive macros
#![allow(unused_assignments)]

use miette::{Diagnostic, SourceSpan};
use vclkit_core::source_analysis::SyntaxError;

/// A syntax error with its source attached.
#[derive(Debug, Diagnostic, thiserror::Error)]
#[error("{message}")]
#[diagnostic(code(vclkit::syntax))]
pub struct SourceDiagnostic {
    /// The error as displayed by the core, line and column included
    pub message: String,
    /// Source code for context
    #[source_code]
    pub src: miette::NamedSource<String>,
    /// Location of the error
    #[label("{label}")]
    pub span: SourceSpan,
    /// Label for the error span (interpolated by miette derive macro)
    pub label: String,
}

impl SourceDiagnostic {
    pub fn from_syntax_error(error: &SyntaxError, source_path: &str, source: &str) -> Self {
        Self {
            message: error.to_string(),
            src: miette::NamedSource::new(source_path, source.to_string()),
            span: error.location.into(),
            label: error.message.to_string(),
        }
    }
}
