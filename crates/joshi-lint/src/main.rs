//! joshi-lint CLI
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use joshi_lint::{Cli, Commands, commands};
use joshi_lint_core::config::ConfigLoader;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.color.apply();

    // arg_required_else_help ensures a subcommand is present
    let Some(command) = cli.command else {
        return Ok(());
    };

    let cwd = std::env::current_dir().context("failed to determine current directory")?;
    let cwd = camino::Utf8PathBuf::try_from(cwd).map_err(|e| {
        anyhow::anyhow!(
            "current directory is not valid UTF-8: {}",
            e.into_path_buf().display()
        )
    })?;
    let mut loader = ConfigLoader::new().with_project_search(&cwd);
    if let Some(ref config_path) = cli.config {
        let config_path = camino::Utf8PathBuf::try_from(config_path.clone()).map_err(|e| {
            anyhow::anyhow!(
                "config path is not valid UTF-8: {}",
                e.into_path_buf().display()
            )
        })?;
        loader = loader.with_file(&config_path);
    }
    let config = loader.load().context("failed to load configuration")?;

    init_tracing(cli.quiet, cli.verbose, config.log_level.as_str());
    debug!(cwd = %cwd, "starting");

    match command {
        Commands::Check(args) => commands::check::cmd_check(args, &config),
    }
}

/// Wire up the subscriber: `RUST_LOG` wins, then the CLI verbosity flags,
/// then the configured level.
fn init_tracing(quiet: bool, verbose: u8, config_level: &str) {
    let default_level = if quiet {
        "error"
    } else {
        match verbose {
            0 => config_level,
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
