//! Editor configuration management for `cards-editor.toml`.
//!
//! # Sections
//!
//! | Section     | Purpose                                           |
//! |-------------|---------------------------------------------------|
//! | `[data]`    | cards.js location and the local image mirror      |
//! | `[serve]`   | Editor server (interface, port)                   |
//! | `[sync]`    | Remote snapshot source (repo, branch, members)    |
//!
//! The file is optional. Values are layered: built-in defaults, then the
//! TOML file, then CLI flags and environment variables (`CARDS_PATH`,
//! `CARDS_GITHUB_REPO`, `CARDS_GITHUB_BRANCH`, ...). The result is built once
//! in `main` and passed by reference everywhere.
//!
//! # Example
//!
//! ```toml
//! [data]
//! path = "SERVER/data/cards.js"
//!
//! [serve]
//! port = 8080
//!
//! [sync]
//! branch = "dev"
//! ```

mod data;
pub mod defaults;
mod error;
mod serve;
mod sync;

pub use data::DataConfig;
pub use error::ConfigError;
pub use serve::ServeConfig;
pub use sync::SyncConfig;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result, bail};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure representing cards-editor.toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct EditorConfig {
    /// Absolute root directory (set after loading)
    #[serde(skip)]
    pub root: PathBuf,

    /// Absolute path to the config file (set after loading)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Data file and image mirror
    #[serde(default)]
    pub data: DataConfig,

    /// Editor server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Remote sync settings
    #[serde(default)]
    pub sync: SyncConfig,
}

impl EditorConfig {
    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let config: EditorConfig = toml::from_str(content).context("malformed editor config")?;
        Ok(config)
    }

    /// Load configuration from file path
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }

    /// Build the final configuration for a CLI invocation.
    ///
    /// A missing config file is not an error; defaults are used instead.
    pub fn load(cli: &Cli) -> Result<Self> {
        let root = cli.root.as_deref().unwrap_or(Path::new("./"));
        let config_path = root.join(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            Self::default()
        };
        config.update_with_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Update configuration with CLI arguments
    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = Self::normalize_path(cli.root.as_deref().unwrap_or(Path::new("./")));
        self.config_path = Self::normalize_path(&root.join(&cli.config));

        Self::update_option(&mut self.data.path, cli.file.as_ref());
        Self::update_option(&mut self.data.assets, cli.assets.as_ref());
        Self::update_option(&mut self.sync.repo, cli.repo.as_ref());
        Self::update_option(&mut self.sync.branch, cli.branch.as_ref());

        if let Some(Commands::Serve { interface, port }) = &cli.command {
            Self::update_option(&mut self.serve.interface, interface.as_ref());
            Self::update_option(&mut self.serve.port, port.as_ref());
        }

        self.data.path = Self::normalize_path(&root.join(&self.data.path));
        self.data.assets = Self::normalize_path(&root.join(&self.data.assets));
        self.root = root;
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize a path to absolute, using canonicalize if the path exists
    fn normalize_path(path: &Path) -> PathBuf {
        path.canonicalize().unwrap_or_else(|_| {
            // For non-existent paths, manually make them absolute
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                std::env::current_dir()
                    .map(|cwd| cwd.join(path))
                    .unwrap_or_else(|_| path.to_path_buf())
            }
        })
    }

    /// Validate configuration values that would otherwise fail at request time
    pub fn validate(&self) -> Result<()> {
        let sync = &self.sync;

        if sync.repo.trim().is_empty() {
            bail!(ConfigError::Invalid("[sync.repo] must not be empty".into()));
        }
        if sync.branch.trim().is_empty() {
            bail!(ConfigError::Invalid("[sync.branch] must not be empty".into()));
        }
        if !sync.archive_url.contains("{repo}") || !sync.archive_url.contains("{branch}") {
            bail!(ConfigError::Invalid(
                "[sync.archive_url] must contain {repo} and {branch}".into()
            ));
        }
        if !sync.archive_url.starts_with("http") {
            bail!(ConfigError::Invalid(
                "[sync.archive_url] must start with http:// or https://".into()
            ));
        }
        if sync.timeout_secs == 0 {
            bail!(ConfigError::Invalid(
                "[sync.timeout_secs] must be greater than zero".into()
            ));
        }

        for (field, member) in [
            ("[sync.data_member]", &sync.data_member),
            ("[sync.assets_member]", &sync.assets_member),
        ] {
            if !is_relative_member(member) {
                bail!(ConfigError::Invalid(format!(
                    "{field} must be a relative path without `..`"
                )));
            }
        }

        if self.data.path.is_dir() {
            bail!(ConfigError::Invalid(format!(
                "[data.path] `{}` is a directory",
                self.data.path.display()
            )));
        }

        Ok(())
    }
}

/// Archive member paths are joined onto the archive root, so they must stay inside it.
fn is_relative_member(member: &str) -> bool {
    let path = Path::new(member.trim_end_matches('/'));
    !member.trim().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
}

// ============================================================================
// Tests
// ============================================================================
