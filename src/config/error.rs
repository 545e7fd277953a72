//! Configuration error types.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors raised while loading `cards-editor.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("cannot read editor config `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed TOML or an unknown key.
    #[error("malformed editor config `{}`: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Well-formed but unusable value, e.g. an empty repository.
    #[error("invalid editor config: {0}")]
    Invalid(String),
}
