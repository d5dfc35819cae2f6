use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the preferences store's file and configuration boundary.
///
/// Typed reads and writes never fail; only opening, reloading, flushing and
/// locating a suite do.
#[derive(Debug, Error)]
pub enum PrefsError {
    /// Reading, writing or removing the suite file failed
    #[error("I/O error on preferences file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The suite file exists but is not valid TOML
    #[error("malformed preferences file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml_edit::TomlError,
    },
    /// A stored value has no TOML representation
    #[error("cannot encode preference `{key}`: {reason}")]
    Encode { key: String, reason: String },
    #[error("invalid preferences suite name `{0}`")]
    InvalidSuiteName(String),
    #[error("no configuration directory available; set SOVRAN_KEYMAP_DIR")]
    NoConfigDir,
}

impl PrefsError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        PrefsError::Io {
            path: path.into(),
            source,
        }
    }
}
