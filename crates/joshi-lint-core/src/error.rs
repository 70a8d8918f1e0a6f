//! Error types for joshi-lint-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,

    /// `min_interval` must be a positive token distance.
    #[error("min_interval must be 1 or greater (got {value})")]
    InvalidMinInterval {
        /// The rejected value.
        value: usize,
    },
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during particle analysis.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The morphological analyzer could not be initialized.
    #[error("tokenizer initialization failed: {0}")]
    TokenizerInit(String),

    /// The morphological analyzer failed on a sentence.
    #[error("tokenization failed: {0}")]
    Tokenize(String),
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
