//! Core library for joshi-lint.
//!
//! Detects the same Japanese particle (助詞) used twice within a short
//! span of one sentence, which degrades readability:
//!
//! ```text
//! 私は彼は好きだ
//!   ^   ^ 係助詞「は」が1語も空けずに繰り返されている
//! ```
//!
//! # Modules
//!
//! - [`analyzer`] - The per-paragraph analysis pipeline
//! - [`config`] - Rule options, loading and discovery
//! - [`diagnostic`] - Emitted findings
//! - [`error`] - Error types and result aliases
//! - [`exceptions`] - Idiomatic repetition patterns that are not flagged
//! - [`scanner`] - Interval scanning over the countable token stream
//! - [`segmenter`] - Sentence segmentation
//! - [`source`] - Masked analysis text with original-offset mapping
//! - [`token`] - Token model, classification, merging, canonical keys
//! - [`tokenizer`] - Morphological analysis interface and backends
//!
//! # Quick Start
//!
//! ```no_run
//! use joshi_lint_core::{LinderaTokenizer, ParticleChecker, RuleConfig};
//!
//! let tokenizer = LinderaTokenizer::shared().expect("dictionary loads");
//! let checker = ParticleChecker::new(RuleConfig::default(), tokenizer)
//!     .expect("default options are valid");
//! for diagnostic in checker.check_text("私は彼は好きだ").unwrap() {
//!     println!("{}: {}", diagnostic.particle, diagnostic.message);
//! }
//! ```
#![deny(unsafe_code)]

pub mod analyzer;
pub mod config;
pub mod diagnostic;
pub mod error;
pub mod exceptions;
pub mod scanner;
pub mod segmenter;
pub mod source;
pub mod token;
pub mod tokenizer;

pub use analyzer::ParticleChecker;
pub use config::{Config, ConfigLoader, LogLevel, RuleConfig};
pub use diagnostic::Diagnostic;
pub use error::{AnalysisError, AnalysisResult, ConfigError, ConfigResult};
#[cfg(feature = "lindera")]
pub use tokenizer::LinderaTokenizer;
pub use tokenizer::MorphologicalTokenizer;
