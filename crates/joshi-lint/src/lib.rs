//! Library interface for the `joshi-lint` CLI.
//!
//! Exposes the argument parser and command structure as a library so
//! integration tests can exercise them directly. The entry point is in
//! `main.rs`.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                        Log filter (e.g., debug, joshi_lint=trace)
    JOSHI_LINT_RULE__MIN_INTERVAL   Rule option override
    JOSHI_LINT_RULE__STRICT         Rule option override
";

/// Command-line interface definition for joshi-lint.
#[derive(Parser)]
#[command(name = "joshi-lint")]
#[command(about = "Find repeated Japanese particles (助詞) in prose", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Check files for repeated particles
    Check(commands::check::CheckArgs),
}
