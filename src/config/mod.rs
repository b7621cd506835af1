//! Configuration management for `tocprune.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [build] and [filter]
//! ├── types/         # ConfigError, ConfigDiagnostics, FieldPath
//! ├── util.rs        # config discovery, path expansion
//! └── mod.rs         # Config (this file)
//! ```
//!
//! The config file is optional. Without one, the defaults match a
//! Material for MkDocs build in `./site`.

mod section;
mod types;
mod util;

pub use section::{BuildConfig, FilterConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use util::{find_config_file, resolve_config_path};

use crate::{
    cli::{Cli, Commands, FilterArgs},
    log,
};
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name looked up when `--config` is not given.
pub const DEFAULT_CONFIG_NAME: &str = "tocprune.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tocprune.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Absolute path to the config file, `None` when running on defaults
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Project root directory: parent of the config file, or cwd
    #[serde(skip)]
    pub root: PathBuf,

    /// Filter settings
    #[serde(default)]
    pub filter: FilterConfig,

    /// Build directory settings
    #[serde(default)]
    pub build: BuildConfig,
}

impl Config {
    /// Load configuration for the given CLI invocation.
    ///
    /// Searches upward from cwd for the config file. A missing default config
    /// is fine; a missing explicitly named config is an error.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let config_path = find_config_file(&cli.config, &cwd);
        let mut config = match &config_path {
            Some(path) => Self::from_path(path)?,
            None if cli.config != Path::new(DEFAULT_CONFIG_NAME) => {
                bail!("Config file '{}' not found", cli.config.display());
            }
            None => Self::default(),
        };

        let root = config_path
            .as_deref()
            .and_then(Path::parent)
            .map(Path::to_path_buf)
            .unwrap_or(cwd);

        config.config_path = config_path.map(|p| crate::utils::path::normalize_path(&p));
        config.finalize(cli, &root);
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Apply CLI overrides and make directories absolute.
    fn finalize(&mut self, cli: &Cli, root: &Path) {
        self.root = crate::utils::path::normalize_path(root);
        self.apply_filter_args(cli.filter_args());

        if let Commands::Apply {
            output: Some(output),
            ..
        } = &cli.command
        {
            self.build.output = Some(output.clone());
        }

        self.normalize_paths();
    }

    /// Apply arguments shared by all commands.
    fn apply_filter_args(&mut self, args: &FilterArgs) {
        Self::update_option(&mut self.build.input, args.input.as_ref());
        Self::update_option(&mut self.filter.match_mode, args.match_mode.as_ref());
        if let Some(url) = &args.site_url {
            self.build.site_url = Some(url.clone());
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Resolve input/output directories against the project root.
    fn normalize_paths(&mut self) {
        let root = self.root.clone();
        self.build.input =
            crate::utils::path::normalize_path(&resolve_config_path(&self.build.input, &root));
        if let Some(output) = self.build.output.take() {
            self.build.output = Some(crate::utils::path::normalize_path(&resolve_config_path(
                &output, &root,
            )));
        }
    }

    /// Get path relative to the project root, for display.
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate every section, reporting all problems at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.filter.validate(&mut diag);
        self.build.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Defaults rooted at `root`, with `input` resolved beneath it.
#[cfg(test)]
pub fn test_config_at(root: &Path) -> Config {
    let mut config = Config {
        root: root.to_path_buf(),
        ..Config::default()
    };
    config.build.input = root.join("site");
    config
}

// ============================================================================
// tests
// ============================================================================
