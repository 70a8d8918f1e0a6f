//! Configuration loading and discovery.
//!
//! Rule options mirror the detection pipeline: minimum countable interval,
//! strict mode, unconditional allow-list, and the character sets that
//! define sentence terminators and pause marks.
//!
//! Discovery walks up from a search root looking for project config files,
//! merges a user config from the XDG config directory beneath them, and
//! applies `JOSHI_LINT_*` environment overrides on top.
//!
//! # Supported formats
//!
//! TOML (`.toml`), YAML (`.yaml`, `.yml`), and JSON (`.json`).
//!
//! # Config file locations (in order of precedence, highest first):
//! - `joshi-lint.<ext>` in the search root or any parent
//! - `.joshi-lint.<ext>` in the search root or any parent
//! - `~/.config/joshi-lint/config.<ext>` (user config)
//!
//! # Example
//! ```no_run
//! use camino::Utf8PathBuf;
//! use joshi_lint_core::config::ConfigLoader;
//!
//! let cwd = std::env::current_dir().unwrap();
//! let cwd = Utf8PathBuf::try_from(cwd).expect("current directory is not valid UTF-8");
//! let config = ConfigLoader::new().with_project_search(&cwd).load().unwrap();
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Options for the repeated-particle rule.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(default)]
pub struct RuleConfig {
    /// Minimum countable-token interval between two occurrences of the
    /// same particle. Occurrences separated by this many countable tokens
    /// or fewer are reported. Must be 1 or greater; the default of 1 flags
    /// the classic back-to-back case.
    pub min_interval: usize,
    /// Count only particles toward the interval and disable the built-in
    /// exception patterns. Default: `false`.
    pub strict: bool,
    /// Particle surface forms that may repeat unconditionally, e.g.
    /// `["も", "や"]`. Checked before any other filtering.
    pub allow: Vec<String>,
    /// Characters that terminate a sentence (句点 and friends).
    pub separator_characters: Vec<String>,
    /// Characters treated as pause marks (読点).
    pub comma_characters: Vec<String>,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            min_interval: 1,
            strict: false,
            allow: Vec::new(),
            separator_characters: [".", "．", "。", "?", "!", "？", "！"]
                .map(str::to_string)
                .to_vec(),
            comma_characters: ["、", "，"].map(str::to_string).to_vec(),
        }
    }
}

impl RuleConfig {
    /// Validate option values that serde cannot reject on its own.
    ///
    /// Fails fast, before any tokenization: a non-positive `min_interval`
    /// is a configuration error, never silently clamped.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.min_interval == 0 {
            return Err(ConfigError::InvalidMinInterval {
                value: self.min_interval,
            });
        }
        Ok(())
    }
}

/// Log level configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Verbose output for debugging and development.
    Debug,
    /// Standard operational information (default).
    #[default]
    Info,
    /// Warnings about potential issues.
    Warn,
    /// Errors that indicate failures.
    Error,
}

impl LogLevel {
    /// Returns the log level as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// The configuration for joshi-lint.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Log level for the application.
    pub log_level: LogLevel,
    /// Rule options.
    pub rule: RuleConfig,
}

/// Supported configuration file extensions (in order of preference).
const CONFIG_EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Application name for XDG directory lookup and config file names.
const APP_NAME: &str = "joshi-lint";

/// Builder for loading configuration from multiple sources.
#[derive(Debug, Default)]
pub struct ConfigLoader {
    /// Starting directory for project config search.
    project_search_root: Option<Utf8PathBuf>,
    /// Whether to include user config from the XDG directory.
    include_user_config: bool,
    /// Stop searching when a directory contains this file/dir.
    boundary_marker: Option<String>,
    /// Explicit config files to load (for `--config` or tests).
    explicit_files: Vec<Utf8PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader with default settings.
    pub fn new() -> Self {
        Self {
            project_search_root: None,
            include_user_config: true,
            boundary_marker: Some(".git".to_string()),
            explicit_files: Vec::new(),
        }
    }

    /// Set the starting directory for project config search.
    pub fn with_project_search<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.project_search_root = Some(path.as_ref().to_path_buf());
        self
    }

    /// Set whether to include user config from `~/.config/joshi-lint/`.
    pub const fn with_user_config(mut self, include: bool) -> Self {
        self.include_user_config = include;
        self
    }

    /// Add an explicit config file to load.
    ///
    /// Files are loaded in order, with later files taking precedence.
    /// Explicit files are loaded after discovered files.
    pub fn with_file<P: AsRef<Utf8Path>>(mut self, path: P) -> Self {
        self.explicit_files.push(path.as_ref().to_path_buf());
        self
    }

    /// Load configuration, merging all discovered sources.
    ///
    /// Precedence (highest to lowest):
    /// 1. `JOSHI_LINT_*` environment variables
    /// 2. Explicit files (in order added via `with_file`)
    /// 3. Project config (closest to the search root)
    /// 4. User config (`~/.config/joshi-lint/config.<ext>`)
    /// 5. Default values
    ///
    /// The merged rule options are validated before being returned.
    #[tracing::instrument(skip(self), fields(search_root = ?self.project_search_root))]
    pub fn load(self) -> ConfigResult<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if self.include_user_config
            && let Some(user_config) = Self::find_user_config()
        {
            figment = Self::merge_file(figment, &user_config);
        }

        if let Some(ref root) = self.project_search_root {
            for pc in self.find_project_configs(root) {
                figment = Self::merge_file(figment, &pc);
            }
        }

        for file in &self.explicit_files {
            figment = Self::merge_file(figment, file);
        }

        // JOSHI_LINT_RULE__MIN_INTERVAL=2, JOSHI_LINT_LOG_LEVEL=debug, etc.
        figment = figment.merge(Env::prefixed("JOSHI_LINT_").split("__").lowercase(true));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::Deserialize(Box::new(e)))?;
        config.rule.validate()?;
        tracing::debug!(
            min_interval = config.rule.min_interval,
            strict = config.rule.strict,
            "configuration loaded"
        );
        Ok(config)
    }

    /// Find project config files by walking up from the given directory.
    ///
    /// Returns all matching config files from the closest directory that
    /// has any match, ordered low-to-high precedence (dotfiles before
    /// regular files).
    fn find_project_configs(&self, start: &Utf8Path) -> Vec<Utf8PathBuf> {
        let mut current = Some(start.to_path_buf());

        while let Some(dir) = current {
            let mut found = Vec::new();

            for ext in CONFIG_EXTENSIONS {
                let dotfile = dir.join(format!(".{APP_NAME}.{ext}"));
                if dotfile.is_file() {
                    found.push(dotfile);
                }
            }
            for ext in CONFIG_EXTENSIONS {
                let regular = dir.join(format!("{APP_NAME}.{ext}"));
                if regular.is_file() {
                    found.push(regular);
                }
            }

            if !found.is_empty() {
                return found;
            }

            // Boundary check comes after the config check, so a config in
            // the same directory as the marker is still found.
            if let Some(ref marker) = self.boundary_marker
                && dir.join(marker).exists()
                && dir != start
            {
                break;
            }

            current = dir.parent().map(Utf8Path::to_path_buf);
        }

        Vec::new()
    }

    /// Find user config in the XDG config directory.
    fn find_user_config() -> Option<Utf8PathBuf> {
        let proj_dirs = directories::ProjectDirs::from("", "", APP_NAME)?;
        let config_dir = proj_dirs.config_dir();

        for ext in CONFIG_EXTENSIONS {
            let config_path = config_dir.join(format!("config.{ext}"));
            if config_path.is_file() {
                return Utf8PathBuf::from_path_buf(config_path).ok();
            }
        }

        None
    }

    /// Merge a config file into the figment, detecting format by extension.
    fn merge_file(figment: Figment, path: &Utf8Path) -> Figment {
        match path.extension() {
            Some("yaml" | "yml") => figment.merge(Yaml::file_exact(path.as_str())),
            Some("json") => figment.merge(Json::file_exact(path.as_str())),
            _ => figment.merge(Toml::file_exact(path.as_str())),
        }
    }
}
