// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! VCL toolkit command-line interface.
//!
//! This is the main entry point for the `vclkit` command.

use clap::{ArgAction, Parser, Subcommand};
use miette::Result;

mod commands;
mod config;
mod diagnostic;

/// vclkit: format and inspect VCL policy scripts
#[derive(Debug, Parser)]
#[command(name = "vclkit")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Format `.vcl` files in place
    Fmt {
        /// Files or directories to format
        #[arg(default_value = ".")]
        paths: Vec<String>,

        /// Print a diff and fail instead of writing files
        #[arg(long)]
        check: bool,

        /// Maximum line width (overrides `vclkit.toml`)
        #[arg(long)]
        line_width: Option<usize>,
    },

    /// Parse a file and print its syntax tree
    Parse {
        /// Source file to parse
        path: String,

        /// Print the tree as JSON instead of the debug form
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Install miette's fancy error handler
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Fmt {
            paths,
            check,
            line_width,
        } => config::load_format_options(line_width)
            .and_then(|options| commands::fmt::run_fmt(&paths, check, &options)),
        Command::Parse { path, json } => commands::parse::run_parse(&path, json),
    };

    // Exit with appropriate code
    match result {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("{e:?}");
            std::process::exit(1);
        }
    }
}

/// Logs go to stderr so `parse` output stays clean on stdout.
fn init_logging(verbose: u8) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default_directive = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .init();
}
