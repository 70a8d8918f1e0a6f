//! Command implementations.

pub mod check;

use anyhow::Context;
use camino::Utf8Path;

/// Read a file to lint, with a readable error on failure.
pub fn read_input_file(path: &Utf8Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))
}
