//! Check command — find repeated particles in files.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use joshi_lint_core::tokenizer::LinderaTokenizer;
use joshi_lint_core::{Config, Diagnostic, ParticleChecker, RuleConfig};

use super::read_input_file;

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Files to check. `.md` files are parsed as markdown (inline code is
    /// masked, code blocks are skipped); everything else is plain text.
    #[arg(required = true)]
    pub files: Vec<Utf8PathBuf>,

    /// Emit diagnostics as JSON
    #[arg(long)]
    pub json: bool,

    /// Minimum countable-token interval (overrides config)
    #[arg(long, value_name = "N")]
    pub min_interval: Option<usize>,

    /// Count only particles and disable exception patterns
    #[arg(long)]
    pub strict: bool,

    /// Allow a particle surface to repeat (repeatable)
    #[arg(long, value_name = "SURFACE")]
    pub allow: Vec<String>,
}

/// Diagnostics for one checked file.
#[derive(Debug, Serialize)]
struct FileReport {
    file: Utf8PathBuf,
    diagnostics: Vec<Diagnostic>,
}

/// Check files for repeated particles.
///
/// Flag-level settings override config-level ones. Exits non-zero when
/// any diagnostic is found.
#[instrument(name = "cmd_check", skip_all, fields(files = args.files.len()))]
pub fn cmd_check(args: CheckArgs, config: &Config) -> anyhow::Result<()> {
    let rule = resolve_rule(&args, config);
    debug!(
        min_interval = rule.min_interval,
        strict = rule.strict,
        "resolved rule options"
    );

    let tokenizer = LinderaTokenizer::shared().context("failed to load the IPADIC dictionary")?;
    let checker = ParticleChecker::new(rule, tokenizer)?;

    let mut reports = Vec::new();
    let mut total = 0;
    for file in &args.files {
        let content = read_input_file(file)?;
        let diagnostics = if file.extension() == Some("md") {
            checker.check_markdown(&content)
        } else {
            checker.check_text(&content)
        }
        .with_context(|| format!("failed to analyze {file}"))?;

        total += diagnostics.len();
        if !args.json {
            print_human(file, &content, &diagnostics);
        }
        reports.push(FileReport {
            file: file.clone(),
            diagnostics,
        });
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if total > 0 {
        bail!("found {total} repeated particle(s)");
    }
    Ok(())
}

/// Apply flag overrides on top of the configured rule options.
fn resolve_rule(args: &CheckArgs, config: &Config) -> RuleConfig {
    let mut rule = config.rule.clone();
    if let Some(min_interval) = args.min_interval {
        rule.min_interval = min_interval;
    }
    if args.strict {
        rule.strict = true;
    }
    rule.allow.extend(args.allow.iter().cloned());
    rule
}

fn print_human(file: &Utf8PathBuf, content: &str, diagnostics: &[Diagnostic]) {
    if diagnostics.is_empty() {
        println!("{} {}", "OK:".green(), file);
        return;
    }
    for diagnostic in diagnostics {
        let (line, column) = diagnostic.line_column(content);
        let headline = diagnostic.message.lines().next().unwrap_or_default();
        println!(
            "{}:{}:{} {} {}",
            file.bold(),
            line,
            column,
            diagnostic.particle.red().bold(),
            headline,
        );
    }
}
