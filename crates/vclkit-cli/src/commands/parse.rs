// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `vclkit parse`: print the syntax tree of a file.

use camino::Utf8Path;
use miette::{IntoDiagnostic, Result};
use tracing::debug;
use vclkit_core::ast::Program;

use super::{parse_file, read_source};

/// Parses `path` and prints its tree to stdout.
pub fn run_parse(path: &str, json: bool) -> Result<()> {
    let path = Utf8Path::new(path);
    let source = read_source(path)?;
    let program = parse_file(path, &source)?;
    debug!(statements = program.body.len(), "parsed {path}");
    println!("{}", render_tree(&program, json)?);
    Ok(())
}

fn render_tree(program: &Program, json: bool) -> Result<String> {
    if json {
        serde_json::to_string_pretty(program).into_diagnostic()
    } else {
        Ok(format!("{program:#?}"))
    }
}
