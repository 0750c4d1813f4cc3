// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! `vclkit fmt` and `vclkit fmt --check`: format VCL source files.
//!
//! `vclkit fmt <path>...` parses each `.vcl` file, runs the unparser, and
//! writes the formatted output back in place. Files that are already
//! formatted are left untouched.
//!
//! With `--check` nothing is written. A unified diff is printed for every
//! file that would change, and the command fails if any file would change
//! or could not be parsed.

use std::collections::HashSet;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use miette::{IntoDiagnostic, Result, WrapErr};
use similar::TextDiff;
use tracing::{debug, info};
use vclkit_core::unparse::{FormatOptions, unparse_program_with};

use super::{parse_file, read_source};

/// File extension of VCL sources.
const SOURCE_EXTENSION: &str = "vcl";

/// Format (or check formatting of) the given paths.
///
/// Files that fail to parse are reported and skipped; in check mode they
/// also make the command fail.
pub fn run_fmt(paths: &[String], check_only: bool, options: &FormatOptions) -> Result<()> {
    let source_files = collect_source_files(paths)?;

    let mut changed_files: Vec<Utf8PathBuf> = Vec::new();
    let mut skipped_files: Vec<Utf8PathBuf> = Vec::new();

    for file in &source_files {
        let original = read_source(file)?;

        let program = match parse_file(file, &original) {
            Ok(program) => program,
            Err(report) => {
                eprintln!("{report:?}");
                eprintln!("warning: skipping '{file}' (has syntax errors)");
                skipped_files.push(file.clone());
                continue;
            }
        };

        let formatted = unparse_program_with(&program, options);
        if formatted == original {
            debug!(file = %file, "already formatted");
            continue;
        }

        changed_files.push(file.clone());

        if check_only {
            print_unified_diff(file.as_str(), &original, &formatted);
        } else {
            fs::write(file.as_std_path(), &formatted)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write '{file}'"))?;
            info!(file = %file, "formatted");
        }
    }

    if check_only {
        let mut parts: Vec<String> = Vec::new();
        if !changed_files.is_empty() {
            let count = changed_files.len();
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!("{count} file{plural} would be reformatted"));
        }
        if !skipped_files.is_empty() {
            let count = skipped_files.len();
            let plural = if count == 1 { "" } else { "s" };
            parts.push(format!(
                "{count} file{plural} could not be checked (syntax errors)"
            ));
        }
        if !parts.is_empty() {
            miette::bail!("{}", parts.join("; "));
        }
    }

    Ok(())
}

/// Expands the command-line paths into a deduplicated list of `.vcl` files.
fn collect_source_files(paths: &[String]) -> Result<Vec<Utf8PathBuf>> {
    let mut seen = HashSet::new();
    let mut source_files = Vec::new();

    for path in paths {
        let source_path = Utf8PathBuf::from(path);

        if source_path.is_file() {
            if source_path.extension() == Some(SOURCE_EXTENSION) {
                if seen.insert(source_path.clone()) {
                    source_files.push(source_path);
                }
            } else {
                miette::bail!("File '{}' is not a .vcl source file", path);
            }
        } else if source_path.is_dir() {
            let mut found = Vec::new();
            collect_vcl_files_recursive(&source_path, &mut found)?;
            for file in found {
                if seen.insert(file.clone()) {
                    source_files.push(file);
                }
            }
        } else {
            miette::bail!("Path '{}' does not exist", path);
        }
    }

    if source_files.is_empty() {
        miette::bail!("No .vcl source files found");
    }
    Ok(source_files)
}

/// Recursively collect all `.vcl` files from a directory tree.
///
/// Symlinks are skipped to avoid infinite recursion through circular links.
fn collect_vcl_files_recursive(dir: &Utf8Path, files: &mut Vec<Utf8PathBuf>) -> Result<()> {
    let mut entries = fs::read_dir(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read directory '{dir}'"))?
        .collect::<std::io::Result<Vec<_>>>()
        .into_diagnostic()?;
    entries.sort_by_key(std::fs::DirEntry::path);

    for entry in entries {
        let file_type = entry.file_type().into_diagnostic()?;
        if file_type.is_symlink() {
            continue;
        }
        let entry_path = Utf8PathBuf::from_path_buf(entry.path())
            .map_err(|_| miette::miette!("Non-UTF-8 path"))?;

        if file_type.is_dir() {
            collect_vcl_files_recursive(&entry_path, files)?;
        } else if file_type.is_file() && entry_path.extension() == Some(SOURCE_EXTENSION) {
            files.push(entry_path);
        }
    }
    Ok(())
}

/// Print a unified diff between `original` and `formatted` for the given file
/// path. Output goes to stdout so it can be captured and piped.
fn print_unified_diff(path: &str, original: &str, formatted: &str) {
    let diff = TextDiff::from_lines(original, formatted);
    print!(
        "{}",
        diff.unified_diff()
            .header(&format!("a/{path}"), &format!("b/{path}"))
    );
}
