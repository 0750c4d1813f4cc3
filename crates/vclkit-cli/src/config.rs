// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Project configuration parsing.
//!
//! Reads `vclkit.toml` from the working directory. Only the `[format]`
//! table is recognised; every key in it is optional.
//!
//! ```toml
//! [format]
//! line_width = 100
//! indent = 4
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use miette::{Context, IntoDiagnostic, Result};
use serde::Deserialize;
use std::fs;
use tracing::debug;
use vclkit_core::unparse::FormatOptions;

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "vclkit.toml";

/// The top-level structure parsed from `vclkit.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub format: FormatConfig,
}

/// The `[format]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatConfig {
    pub line_width: Option<usize>,
    pub indent: Option<usize>,
}

impl Config {
    /// Printer options from this file, with `line_width` taking precedence.
    pub fn format_options(&self, line_width: Option<usize>) -> FormatOptions {
        let defaults = FormatOptions::default();
        FormatOptions {
            line_width: line_width
                .or(self.format.line_width)
                .unwrap_or(defaults.line_width),
            indent: self.format.indent.unwrap_or(defaults.indent),
        }
    }
}

/// Parse a `vclkit.toml` file.
pub fn parse_config(path: &Utf8Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read config '{path}'"))?;

    toml::from_str(&content)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to parse config '{path}'"))
}

/// Look for `vclkit.toml` in the given directory and parse it if found.
///
/// Returns `None` if no file exists, and an error if it is malformed.
pub fn find_config(dir: &Utf8Path) -> Result<Option<Config>> {
    let config_path = dir.join(CONFIG_FILE);
    if config_path
        .try_exists()
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to stat config '{config_path}'"))?
    {
        debug!(path = %config_path, "loading configuration");
        parse_config(&config_path).map(Some)
    } else {
        Ok(None)
    }
}

/// Printer options for the current directory.
pub fn load_format_options(line_width: Option<usize>) -> Result<FormatOptions> {
    let cwd = std::env::current_dir()
        .into_diagnostic()
        .wrap_err("Failed to read the current directory")?;
    let cwd = Utf8PathBuf::from_path_buf(cwd)
        .map_err(|path| miette::miette!("Non-UTF-8 working directory '{}'", path.display()))?;
    let config = find_config(&cwd)?.unwrap_or_default();
    Ok(config.format_options(line_width))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, content: &str) -> Utf8PathBuf {
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8 path");
        fs::write(path.join(CONFIG_FILE), content).expect("write config");
        path
    }

    #[test]
    fn full_format_table() {
        let temp = TempDir::new().expect("temp dir");
        let dir = write_config(&temp, "[format]\nline_width = 100\nindent = 4\n");
        let config = find_config(&dir).expect("valid").expect("present");
        assert_eq!(
            config.format_options(None),
            FormatOptions {
                line_width: 100,
                indent: 4
            }
        );
    }

    #[test]
    fn missing_keys_use_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let dir = write_config(&temp, "[format]\nindent = 8\n");
        let config = find_config(&dir).expect("valid").expect("present");
        assert_eq!(config.format_options(None).line_width, 80);
        assert_eq!(config.format_options(None).indent, 8);

        let dir = write_config(&temp, "");
        let config = find_config(&dir).expect("valid").expect("present");
        assert_eq!(config.format_options(None), FormatOptions::default());
    }

    #[test]
    fn flag_overrides_file() {
        let temp = TempDir::new().expect("temp dir");
        let dir = write_config(&temp, "[format]\nline_width = 100\n");
        let config = find_config(&dir).expect("valid").expect("present");
        assert_eq!(config.format_options(Some(60)).line_width, 60);
    }

    #[test]
    fn absent_file_is_none() {
        let temp = TempDir::new().expect("temp dir");
        let dir = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf8 path");
        assert!(find_config(&dir).expect("no error").is_none());
    }

    #[test]
    fn malformed_file_names_the_path() {
        let temp = TempDir::new().expect("temp dir");
        let dir = write_config(&temp, "[format]\nline_width = \"wide\"\n");
        let err = find_config(&dir).expect_err("type error");
        let msg = format!("{err}");
        assert!(msg.contains(CONFIG_FILE), "got: {msg:?}");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let temp = TempDir::new().expect("temp dir");
        let dir = write_config(&temp, "[format]\ntab_width = 4\n");
        assert!(find_config(&dir).is_err());
    }
}
