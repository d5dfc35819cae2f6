use crate::error::PrefsError;
use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the directory that holds suite files.
pub const DIR_ENV_VAR: &str = "SOVRAN_KEYMAP_DIR";

const APP_DIR_NAME: &str = "sovran-keymap";
const SUITE_EXTENSION: &str = "toml";

/// Where a [`Preferences`](crate::Preferences) suite lives and how it is written.
///
/// ```
/// use sovran_keymap::PreferencesConfig;
///
/// let config = PreferencesConfig::in_directory("/tmp/prefs", "settings")?
///     .auto_flush(false);
///
/// assert_eq!(config.path(), std::path::Path::new("/tmp/prefs/settings.toml"));
/// # Ok::<(), sovran_keymap::PrefsError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferencesConfig {
    directory: PathBuf,
    suite: String,
    auto_flush: bool,
}

impl PreferencesConfig {
    /// Configuration for `suite` in the default directory.
    ///
    /// The directory is `$SOVRAN_KEYMAP_DIR` when set, otherwise
    /// `sovran-keymap` under the platform configuration directory.
    ///
    /// # Errors
    ///
    /// - `PrefsError::InvalidSuiteName` if `suite` cannot be used as a file name
    /// - `PrefsError::NoConfigDir` if no directory can be determined
    pub fn new(suite: impl Into<String>) -> Result<Self, PrefsError> {
        let suite = validate_suite_name(suite.into())?;
        let directory = default_directory().ok_or(PrefsError::NoConfigDir)?;
        Ok(Self {
            directory,
            suite,
            auto_flush: true,
        })
    }

    /// Configuration for `suite` in an explicit directory.
    pub fn in_directory(
        directory: impl Into<PathBuf>,
        suite: impl Into<String>,
    ) -> Result<Self, PrefsError> {
        let suite = validate_suite_name(suite.into())?;
        Ok(Self {
            directory: directory.into(),
            suite,
            auto_flush: true,
        })
    }

    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Whether every write is persisted immediately. Defaults to `true`.
    pub fn auto_flush(mut self, enabled: bool) -> Self {
        self.auto_flush = enabled;
        self
    }

    pub fn suite(&self) -> &str {
        &self.suite
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn is_auto_flush(&self) -> bool {
        self.auto_flush
    }

    /// The suite file: `<directory>/<suite>.toml`
    pub fn path(&self) -> PathBuf {
        self.directory
            .join(format!("{}.{}", self.suite, SUITE_EXTENSION))
    }
}

fn default_directory() -> Option<PathBuf> {
    match env::var_os(DIR_ENV_VAR) {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME)),
    }
}

pub(crate) fn validate_suite_name(suite: String) -> Result<String, PrefsError> {
    let invalid = suite.is_empty()
        || suite == "."
        || suite == ".."
        || suite.contains(['/', '\\', '\0']);
    if invalid {
        return Err(PrefsError::InvalidSuiteName(suite));
    }
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_names() {
        for ok in ["settings", "com.example.app", "with space", "ünïcode"] {
            assert!(validate_suite_name(ok.to_string()).is_ok(), "{}", ok);
        }
        for bad in ["", ".", "..", "a/b", "a\\b", "nul\0"] {
            match validate_suite_name(bad.to_string()) {
                Err(PrefsError::InvalidSuiteName(name)) => assert_eq!(name, bad),
                other => panic!("expected InvalidSuiteName for {:?}, got {:?}", bad, other),
            }
        }
    }

    #[test]
    fn test_builder() -> Result<(), PrefsError> {
        let config = PreferencesConfig::in_directory("/var/prefs", "app")?.auto_flush(false);

        assert_eq!(config.suite(), "app");
        assert_eq!(config.directory(), Path::new("/var/prefs"));
        assert!(!config.is_auto_flush());
        assert_eq!(config.path(), Path::new("/var/prefs/app.toml"));

        let moved = config.with_directory("/srv");
        assert_eq!(moved.path(), Path::new("/srv/app.toml"));
        Ok(())
    }
}
