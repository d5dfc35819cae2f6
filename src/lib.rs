//! # sovran-keymap
//!
//! Type-safe keys for heterogeneous key-value containers.
//!
//! Many containers map one kind of key to values of many kinds: a
//! `HashMap<String, Box<dyn Any>>`, a settings file, a shared registry. Reading
//! from them normally means a manual downcast, and nothing stops a caller from
//! storing the wrong type under a key. `sovran-keymap` moves the value type
//! into the key itself: a [`TypedKey`] names the raw key, the container it
//! belongs to, and the type stored under it, and the compiler checks every
//! read and write against that declaration.
//!
//! ## Key Features
//!
//! - **Typed keys**: declare a key once as a `const`, use it everywhere
//! - **Zero-cost tags**: a key is exactly as large as its raw key
//! - **One contract**: any container implementing [`DependentMap`] gets
//!   [`lookup`](DependentMapExt::lookup), [`assign`](DependentMapExt::assign)
//!   and [`slot`](DependentMapExt::slot) for free
//! - **Ready-made containers**: `HashMap<K, AnyValue>`, the thread-safe
//!   [`SharedMap`], and the file-backed [`Preferences`] store
//!
//! ## Usage Examples
//!
//! ### Basic Usage
//!
//! ```rust
//! use sovran_keymap::{AnyKey, AnyMap, DependentMapExt};
//!
//! const PORT: AnyKey<&str, u16> = AnyKey::new("port");
//! const HOST: AnyKey<&str, String> = AnyKey::new("host");
//!
//! let mut config = AnyMap::new();
//! config.assign(&PORT, 8080);
//! config.assign(&HOST, "localhost".to_string());
//!
//! // The value type comes from the key; no turbofish, no downcast.
//! let port: Option<u16> = config.lookup(&PORT);
//! assert_eq!(port, Some(8080));
//!
//! // Writing None removes the entry.
//! config.assign(&HOST, None);
//! assert_eq!(config.lookup(&HOST), None);
//! ```
//!
//! ### Missing and Mismatched Values
//!
//! A read returns `None` both when nothing is stored and when the stored value
//! has another type. Declaring two keys with the same raw value but different
//! value types is therefore a caller error that the library cannot detect: the
//! last write decides which of the two keys can see the entry.
//!
//! ```rust
//! use sovran_keymap::{AnyKey, AnyMap, DependentMapExt};
//!
//! const AS_NUMBER: AnyKey<&str, i32> = AnyKey::new("value");
//! const AS_TEXT: AnyKey<&str, String> = AnyKey::new("value");
//!
//! let mut map = AnyMap::new();
//! map.assign(&AS_TEXT, "forty-two".to_string());
//!
//! assert_eq!(map.lookup(&AS_NUMBER), None);
//! assert_eq!(map.lookup(&AS_TEXT).as_deref(), Some("forty-two"));
//! ```
//!
//! ### Preferences With Defaults
//!
//! ```rust,no_run
//! use sovran_keymap::{DependentMapExt, PrefKey, Preferences, PrefsError};
//! use std::time::SystemTime;
//!
//! const DARK_MODE: PrefKey<bool> = PrefKey::from_static("darkMode");
//! const LAST_LAUNCH: PrefKey<SystemTime> = PrefKey::from_static("previousLaunchDate");
//!
//! fn main() -> Result<(), PrefsError> {
//!     let mut prefs = Preferences::suite("my-app")?;
//!     prefs.register_default(false, &DARK_MODE);
//!
//!     if let Some(when) = prefs.lookup(&LAST_LAUNCH) {
//!         println!("last launched at {:?}", when);
//!     }
//!     prefs.assign(&LAST_LAUNCH, SystemTime::now());
//!
//!     let dark = prefs.lookup(&DARK_MODE).unwrap_or_default();
//!     println!("dark mode: {}", dark);
//!
//!     prefs.flush()
//! }
//! ```
//!
//! ### Implementing the Contract
//!
//! Any container can opt in by describing how to look up, store and remove a
//! raw key. The accessor methods come with it.
//!
//! ```rust
//! use sovran_keymap::{AnyValue, DependentMap, DependentMapExt, Narrow, TypedKey};
//!
//! #[derive(Default)]
//! struct Registers(Vec<(u8, AnyValue)>);
//!
//! impl DependentMap for Registers {
//!     type RawKey = u8;
//!     type Payload = AnyValue;
//!
//!     fn value_for<V: Narrow<AnyValue>>(&self, key: &TypedKey<Self, u8, V>) -> Option<V> {
//!         self.0
//!             .iter()
//!             .find(|(raw, _)| raw == key.raw_value())
//!             .and_then(|(_, value)| V::narrow(value))
//!     }
//!
//!     fn set<V: Narrow<AnyValue>>(&mut self, value: Option<V>, key: &TypedKey<Self, u8, V>) {
//!         self.0.retain(|(raw, _)| raw != key.raw_value());
//!         if let Some(value) = value {
//!             self.0.push((*key.raw_value(), value.erase()));
//!         }
//!     }
//! }
//!
//! const ACCUMULATOR: TypedKey<Registers, u8, i64> = TypedKey::new(0);
//!
//! let mut registers = Registers::default();
//! registers.slot(&ACCUMULATOR).update(|acc| Some(acc.unwrap_or(0) + 5));
//! assert_eq!(registers.lookup(&ACCUMULATOR), Some(5));
//! ```

mod accessor;
mod any_value;
mod error;
mod key;
mod map;
mod prefs;
mod semantics;
mod shared;

pub use accessor::{DependentMapExt, Slot};
pub use any_value::AnyValue;
pub use error::PrefsError;
pub use key::TypedKey;
pub use map::{AnyKey, AnyMap};
pub use prefs::{PrefKey, PrefValue, Preferences, PreferencesConfig, DIR_ENV_VAR};
pub use semantics::{DependentMap, Narrow};
pub use shared::SharedMap;
