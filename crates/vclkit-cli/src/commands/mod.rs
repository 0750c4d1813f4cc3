// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! CLI command implementations.

pub mod fmt;
pub mod parse;

use camino::Utf8Path;
use miette::{IntoDiagnostic, Result, WrapErr};
use vclkit_core::ast::Program;
use vclkit_core::parse_source;

use crate::diagnostic::SourceDiagnostic;

/// Reads a source file as UTF-8.
pub fn read_source(path: &Utf8Path) -> Result<String> {
    std::fs::read_to_string(path.as_std_path())
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read '{path}'"))
}

/// Parses `source`, rendering a syntax error against the file.
pub fn parse_file(path: &Utf8Path, source: &str) -> Result<Program> {
    parse_source(source).map_err(|error| {
        miette::Report::new(SourceDiagnostic::from_syntax_error(
            &error,
            path.as_str(),
            source,
        ))
    })
}
