//! Patch-set loading: TOML text in, validated [`PatchConfig`] out.
//!
//! Errors carry where the set came from (built in, a file, or an inline
//! string) and, once the TOML parsed, the set's name.

use crate::config::schema::{PatchConfig, ValidationError};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a patch set was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchSetOrigin {
    /// Compiled into the binary
    Builtin,
    /// Read from a TOML file (`--patches`)
    File(PathBuf),
    /// Passed as a string
    Inline,
}

impl fmt::Display for PatchSetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchSetOrigin::Builtin => write!(f, "built-in"),
            PatchSetOrigin::File(path) => write!(f, "{}", path.display()),
            PatchSetOrigin::Inline => write!(f, "inline"),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read patch set {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("patch set ({origin}) is not valid TOML: {source}")]
    Parse {
        origin: PatchSetOrigin,
        source: toml_edit::de::Error,
    },

    #[error("patch set '{name}' ({origin}) is invalid: {source}")]
    Invalid {
        name: String,
        origin: PatchSetOrigin,
        source: ValidationError,
    },
}

impl ConfigError {
    pub fn origin(&self) -> PatchSetOrigin {
        match self {
            ConfigError::Read { path, .. } => PatchSetOrigin::File(path.clone()),
            ConfigError::Parse { origin, .. } | ConfigError::Invalid { origin, .. } => {
                origin.clone()
            }
        }
    }
}

/// Parse and validate a patch set, tagging any error with `origin`.
pub fn load(input: &str, origin: PatchSetOrigin) -> Result<PatchConfig, ConfigError> {
    let config: PatchConfig = match toml_edit::de::from_str(input) {
        Ok(config) => config,
        Err(source) => return Err(ConfigError::Parse { origin, source }),
    };

    if let Err(source) = config.validate() {
        // Unnamed sets are identified by what they patch
        let name = if config.meta.name.trim().is_empty() {
            config.meta.target.clone()
        } else {
            config.meta.name.clone()
        };
        return Err(ConfigError::Invalid {
            name,
            origin,
            source,
        });
    }

    Ok(config)
}

pub fn load_from_str(input: &str) -> Result<PatchConfig, ConfigError> {
    load(input, PatchSetOrigin::Inline)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<PatchConfig, ConfigError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load(&contents, PatchSetOrigin::File(path.to_path_buf()))
}
