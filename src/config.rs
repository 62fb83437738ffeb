//! Configuration input, defaults, and resolution into an [`Environment`].
//!
//! User configuration is merged over the built-in defaults, derived request-independent keys
//! are merged over that, and every top-level string value then receives one placeholder pass
//! (see [`template::substitute`]) against the merged snapshot.

pub mod duration;
pub mod environment;
pub mod template;

pub use duration::*;
pub use environment::*;
pub use template::substitute;

// std
use std::{fs, path::Path};
// self
use crate::{_prelude::*, context::RequestOrigin, error::ConfigError};

/// Salt shipped with the crate; resolving an environment that still uses it raises
/// [`ConfigWarning::DefaultSalt`].
pub const DEFAULT_SECURITY_SALT: &str = "auth-relay-default-salt-Vq3Xk9LmT2bR7wZp5NcY8dHf4Gs6JeAu";
/// Default number of keyed-hash rounds.
pub const DEFAULT_SECURITY_ITERATION: u32 = 300;
/// Default freshness window for callback envelopes.
pub const DEFAULT_SECURITY_TIMEOUT: &str = "2 minutes";
/// Key holding the strategy map.
pub const STRATEGY_KEY: &str = "Strategy";

/// Ordered user configuration; a JSON object of recognized and arbitrary keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Config(Map<String, Value>);
impl Config {
	/// Creates an empty configuration (defaults only).
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps an existing JSON object.
	pub fn from_map(map: Map<String, Value>) -> Self {
		Self(map)
	}

	/// Parses a JSON object, reporting the failing path on error.
	pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
		let de = &mut serde_json::Deserializer::from_str(json);

		Ok(serde_path_to_error::deserialize(de)?)
	}

	/// Reads and parses a JSON configuration file.
	pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		let path = path.as_ref();
		let json = fs::read_to_string(path)
			.map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

		Self::from_json_str(&json)
	}

	/// Sets (or replaces) a key.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}

	/// Returns the raw value for a key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	/// Returns the underlying map.
	pub fn as_map(&self) -> &Map<String, Value> {
		&self.0
	}
}
impl From<Map<String, Value>> for Config {
	fn from(map: Map<String, Value>) -> Self {
		Self(map)
	}
}

/// Built-in defaults; `host` is derived from the request origin.
pub fn defaults(origin: &RequestOrigin) -> Map<String, Value> {
	let mut map = Map::new();

	map.insert("host".into(), Value::from(origin.base_url()));
	map.insert("path".into(), Value::from("/"));
	map.insert("callback_url".into(), Value::from("{path}callback"));
	map.insert("callback_transport".into(), Value::from("session"));
	map.insert("debug".into(), Value::from(false));
	map.insert("security_salt".into(), Value::from(DEFAULT_SECURITY_SALT));
	map.insert("security_iteration".into(), Value::from(DEFAULT_SECURITY_ITERATION));
	map.insert("security_timeout".into(), Value::from(DEFAULT_SECURITY_TIMEOUT));

	map
}

/// Merges `config` over [`defaults`], then the derived keys over that, and runs the
/// placeholder pass. Derived keys win over user keys with the same name.
///
/// Values are substituted in insertion order against the map as it is being resolved, so a
/// value sees every earlier value in its substituted form.
pub(crate) fn merge_and_substitute(
	config: &Config,
	origin: &RequestOrigin,
) -> Result<Map<String, Value>, ConfigError> {
	let mut merged = defaults(origin);

	for (key, value) in config.as_map() {
		merged.insert(key.clone(), value.clone());
	}

	let complete_path = format!(
		"{}{}",
		environment::required_str(&merged, "host")?,
		environment::required_str(&merged, "path")?
	);
	let lib_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/src/");

	merged.insert("request_uri".into(), Value::from(origin.request_uri.as_str()));
	merged.insert("complete_path".into(), Value::from(complete_path));
	merged.insert("lib_dir".into(), Value::from(lib_dir));
	merged.insert("strategy_dir".into(), Value::from(format!("{lib_dir}strategy/")));

	let keys = merged.keys().cloned().collect::<Vec<_>>();

	for key in keys {
		let Some(Value::String(text)) = merged.get(&key) else {
			continue;
		};
		let resolved = substitute(text, &merged);

		merged.insert(key, Value::String(resolved));
	}

	Ok(merged)
}
