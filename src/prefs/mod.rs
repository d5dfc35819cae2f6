//! A durable, string-keyed preferences store.
//!
//! [`Preferences`] keeps two layers. Explicit values are written by
//! [`DependentMap::set`] and persisted to a per-suite TOML file. Registered
//! defaults live only in memory and answer reads for keys that have no
//! explicit value. Removing an explicit value therefore lets a registered
//! default show through again.

mod config;
mod value;

pub use config::{PreferencesConfig, DIR_ENV_VAR};
pub use value::PrefValue;

use crate::error::PrefsError;
use crate::key::TypedKey;
use crate::semantics::{DependentMap, Narrow};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

/// A typed key into [`Preferences`].
pub type PrefKey<V> = TypedKey<Preferences, Cow<'static, str>, V>;

/// A preferences suite with explicit values and registered defaults.
///
/// # Examples
///
/// ```
/// use sovran_keymap::{DependentMapExt, PrefKey, Preferences};
///
/// const GREETING: PrefKey<String> = PrefKey::from_static("greeting");
///
/// let mut prefs = Preferences::in_memory("example")?;
/// prefs.register_default("hello".to_string(), &GREETING);
/// assert_eq!(prefs.lookup(&GREETING).as_deref(), Some("hello"));
///
/// prefs.assign(&GREETING, "howdy".to_string());
/// assert_eq!(prefs.lookup(&GREETING).as_deref(), Some("howdy"));
///
/// // Removing the explicit value uncovers the default again.
/// prefs.assign(&GREETING, None);
/// assert_eq!(prefs.lookup(&GREETING).as_deref(), Some("hello"));
/// # Ok::<(), sovran_keymap::PrefsError>(())
/// ```
#[derive(Debug)]
pub struct Preferences {
    suite: String,
    path: Option<PathBuf>,
    auto_flush: bool,
    explicit: BTreeMap<String, PrefValue>,
    registered: HashMap<String, PrefValue>,
    dirty: bool,
}

impl Preferences {
    /// Opens the suite described by `config`, loading its file if it exists.
    ///
    /// A missing file is an empty suite; it is created on the first flush.
    ///
    /// # Errors
    ///
    /// - Returns `PrefsError::Io` if the file exists but cannot be read
    /// - Returns `PrefsError::Parse` if the file is not valid TOML
    pub fn open(config: &PreferencesConfig) -> Result<Self, PrefsError> {
        let path = config.path();
        let explicit = load(&path)?;
        log::debug!(
            "opened preferences suite {} with {} entries from {}",
            config.suite(),
            explicit.len(),
            path.display()
        );
        Ok(Self {
            suite: config.suite().to_owned(),
            path: Some(path),
            auto_flush: config.is_auto_flush(),
            explicit,
            registered: HashMap::new(),
            dirty: false,
        })
    }

    /// Opens `suite` in the default directory.
    ///
    /// See [`PreferencesConfig::new`] for how the directory is chosen.
    pub fn suite(suite: &str) -> Result<Self, PrefsError> {
        Self::open(&PreferencesConfig::new(suite)?)
    }

    /// A suite that is never written to disk.
    ///
    /// # Errors
    ///
    /// Returns `PrefsError::InvalidSuiteName` for names `open` would reject.
    pub fn in_memory(suite: &str) -> Result<Self, PrefsError> {
        let suite = config::validate_suite_name(suite.to_owned())?;
        Ok(Self {
            suite,
            path: None,
            auto_flush: false,
            explicit: BTreeMap::new(),
            registered: HashMap::new(),
            dirty: false,
        })
    }

    pub fn suite_name(&self) -> &str {
        &self.suite
    }

    /// The suite file, or `None` for an in-memory suite
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// True when explicit values changed since the last load or flush
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Registers `value` as the default for `key`.
    ///
    /// Defaults answer reads only while the key has no explicit value. They
    /// are never persisted and never listed by [`keys`](Self::keys).
    pub fn register_default<V>(&mut self, value: V, key: &PrefKey<V>)
    where
        V: Narrow<PrefValue>,
    {
        self.registered
            .insert(key.raw_value().to_string(), value.erase());
    }

    /// Registers several untyped defaults at once.
    pub fn register_defaults<I, K>(&mut self, defaults: I)
    where
        I: IntoIterator<Item = (K, PrefValue)>,
        K: Into<String>,
    {
        self.registered
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v)));
    }

    /// Untyped layered lookup: the explicit value, else the registered default.
    pub fn object(&self, key: &str) -> Option<&PrefValue> {
        self.explicit.get(key).or_else(|| self.registered.get(key))
    }

    /// True if `key` has an explicit value. Registered defaults do not count.
    pub fn contains_key(&self, key: &str) -> bool {
        self.explicit.contains_key(key)
    }

    /// Keys with explicit values, in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.explicit.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.explicit.len()
    }

    pub fn is_empty(&self) -> bool {
        self.explicit.is_empty()
    }

    /// Writes explicit values to the suite file if anything changed.
    ///
    /// The file is replaced atomically. In-memory suites do nothing.
    ///
    /// # Errors
    ///
    /// - Returns `PrefsError::Encode` if a value has no TOML representation.
    ///   Every other value is still written, and the store stays dirty.
    /// - Returns `PrefsError::Io` if the directory or file cannot be written
    pub fn flush(&mut self) -> Result<(), PrefsError> {
        let Some(path) = self.path.as_deref() else {
            self.dirty = false;
            return Ok(());
        };
        if !self.dirty {
            return Ok(());
        }
        store(path, &self.explicit)?;
        log::debug!(
            "flushed {} preferences to {}",
            self.explicit.len(),
            path.display()
        );
        self.dirty = false;
        Ok(())
    }

    /// Discards unflushed changes and re-reads the suite file.
    ///
    /// # Errors
    ///
    /// Same as [`open`](Self::open).
    pub fn reload(&mut self) -> Result<(), PrefsError> {
        if let Some(path) = self.path.as_deref() {
            self.explicit = load(path)?;
        } else {
            self.explicit.clear();
        }
        self.dirty = false;
        Ok(())
    }

    /// Removes every explicit value and deletes the suite file.
    ///
    /// Registered defaults are kept.
    ///
    /// # Errors
    ///
    /// Returns `PrefsError::Io` if the file exists but cannot be removed.
    pub fn remove_persistent_domain(&mut self) -> Result<(), PrefsError> {
        self.explicit.clear();
        self.dirty = false;
        if let Some(path) = self.path.as_deref() {
            match fs::remove_file(path) {
                Ok(()) => log::debug!("removed preferences file {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(PrefsError::io(path, e)),
            }
        }
        Ok(())
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
        if self.auto_flush {
            if let Err(e) = self.flush() {
                log::warn!("failed to persist preferences suite {}: {}", self.suite, e);
            }
        }
    }
}

impl DependentMap for Preferences {
    type RawKey = Cow<'static, str>;
    type Payload = PrefValue;

    fn value_for<V>(&self, key: &PrefKey<V>) -> Option<V>
    where
        V: Narrow<PrefValue>,
    {
        self.object(key.raw_value()).and_then(V::narrow)
    }

    fn set<V>(&mut self, value: Option<V>, key: &PrefKey<V>)
    where
        V: Narrow<PrefValue>,
    {
        let raw: &str = key.raw_value();
        let changed = match value {
            Some(value) => {
                let value = value.erase();
                if self.explicit.get(raw).is_some_and(|old| old.same_as(&value)) {
                    false
                } else {
                    self.explicit.insert(raw.to_owned(), value);
                    true
                }
            }
            None => self.explicit.remove(raw).is_some(),
        };
        if changed {
            self.mark_dirty();
        }
    }
}

impl Drop for Preferences {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.flush() {
                log::warn!("dropping unsaved preferences suite {}: {}", self.suite, e);
            }
        }
    }
}

fn load(path: &Path) -> Result<BTreeMap<String, PrefValue>, PrefsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(PrefsError::io(path, e)),
    };
    let document = text
        .parse::<DocumentMut>()
        .map_err(|source| PrefsError::Parse {
            path: path.to_owned(),
            source,
        })?;

    let mut entries = BTreeMap::new();
    for (key, item) in document.iter() {
        match item.as_value().and_then(PrefValue::from_toml) {
            Some(value) => {
                log::trace!("loaded {} `{}`", value.kind(), key);
                entries.insert(key.to_owned(), value);
            }
            None => log::warn!(
                "skipping unsupported entry `{}` in {}",
                key,
                path.display()
            ),
        }
    }
    Ok(entries)
}

/// Writes every encodable entry. An entry with no TOML form is left out of
/// the file and reported once the rest is on disk.
fn store(path: &Path, entries: &BTreeMap<String, PrefValue>) -> Result<(), PrefsError> {
    let mut document = DocumentMut::new();
    let mut unencodable = None;
    for (key, value) in entries {
        match value.to_toml() {
            Ok(encoded) => {
                document.insert(key, toml_edit::value(encoded));
            }
            Err(reason) => {
                log::warn!("leaving `{}` out of {}: {}", key, path.display(), reason);
                unencodable.get_or_insert_with(|| PrefsError::Encode {
                    key: key.clone(),
                    reason,
                });
            }
        }
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|e| PrefsError::io(dir, e))?;
    }
    let staging = path.with_extension("toml.tmp");
    fs::write(&staging, document.to_string()).map_err(|e| PrefsError::io(&staging, e))?;
    fs::rename(&staging, path).map_err(|e| PrefsError::io(path, e))?;

    unencodable.map_or(Ok(()), Err)
}
