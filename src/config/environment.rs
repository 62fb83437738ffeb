//! Resolved, read-only environment shared by every request.

// std
use std::num::NonZeroU32;
// self
use crate::{
	_prelude::*,
	config::{self, Config, DEFAULT_SECURITY_SALT, STRATEGY_KEY},
	context::RequestOrigin,
	error::ConfigError,
	obs,
	security::{Salt, SecuritySettings},
};

/// Non-fatal configuration hygiene findings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigWarning {
	/// `security_salt` still equals the shipped default.
	DefaultSalt,
}
impl ConfigWarning {
	/// Returns a stable label suitable for log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConfigWarning::DefaultSalt => "default_salt",
		}
	}
}
impl Display for ConfigWarning {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			ConfigWarning::DefaultSalt => f.write_str(
				"Change the value of `security_salt` to a salt specific to your application.",
			),
		}
	}
}

/// Resolved configuration plus derived request-independent values.
///
/// Typed accessors cover the recognized keys; [`Environment::get`] exposes every resolved
/// value (including unknown keys) for strategies that read their own settings.
#[derive(Clone)]
pub struct Environment {
	/// Scheme and host prefix, e.g. `https://auth.example.com`.
	pub host: String,
	/// Base path the front controller is mounted under (with trailing `/`).
	pub path: String,
	/// Callback URL after placeholder substitution.
	pub callback_url: String,
	/// Raw callback transport name; validated when a callback is handled.
	pub callback_transport: String,
	/// Whether debug dumps are enabled.
	pub debug: bool,
	/// Envelope signing and freshness settings.
	pub security: SecuritySettings,
	/// Request URI observed at resolution time.
	pub request_uri: String,
	/// `host` followed by `path`.
	pub complete_path: String,
	/// Library source directory.
	pub lib_dir: String,
	/// Directory conventionally holding strategy sources.
	pub strategy_dir: String,
	/// Hygiene findings raised during resolution.
	pub warnings: Vec<ConfigWarning>,
	values: Map<String, Value>,
}
impl Environment {
	/// Merges `config` over the defaults, adds derived keys, substitutes placeholders, and
	/// extracts the typed settings.
	pub fn resolve(config: &Config, origin: &RequestOrigin) -> Result<Self, ConfigError> {
		let values = config::merge_and_substitute(config, origin)?;
		let salt = Salt::new(required_str(&values, "security_salt")?);
		let security = SecuritySettings {
			iteration: iteration(&values)?,
			timeout: timeout(&values)?,
			salt,
		};
		let mut warnings = Vec::new();

		if security.salt.expose() == DEFAULT_SECURITY_SALT {
			warnings.push(ConfigWarning::DefaultSalt);
		}

		let env = Self {
			host: required_str(&values, "host")?,
			path: required_str(&values, "path")?,
			callback_url: required_str(&values, "callback_url")?,
			callback_transport: required_str(&values, "callback_transport")?,
			debug: flag(&values, "debug")?,
			security,
			request_uri: required_str(&values, "request_uri")?,
			complete_path: required_str(&values, "complete_path")?,
			lib_dir: required_str(&values, "lib_dir")?,
			strategy_dir: required_str(&values, "strategy_dir")?,
			warnings,
			values,
		};

		for warning in &env.warnings {
			obs::config_warning(*warning);
		}

		Ok(env)
	}

	/// Returns a resolved value by key.
	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	/// Returns the raw strategy collection, if configured.
	pub fn strategies(&self) -> Option<&Value> {
		self.get(STRATEGY_KEY)
	}

	/// Returns true when the shipped default salt is still in use.
	pub fn uses_default_salt(&self) -> bool {
		self.warnings.contains(&ConfigWarning::DefaultSalt)
	}

	/// Callback URL joined onto `host` (relative callback URLs become absolute).
	pub fn callback_endpoint(&self) -> Result<Url, ConfigError> {
		let base = Url::parse(&self.host)
			.map_err(|source| ConfigError::InvalidUrl { value: self.host.clone(), source })?;

		base.join(&self.callback_url)
			.map_err(|source| ConfigError::InvalidUrl { value: self.callback_url.clone(), source })
	}

	/// Pretty JSON rendering of `value` when `debug` is enabled; `None` otherwise.
	pub fn debug_dump<T>(&self, value: &T) -> Option<String>
	where
		T: ?Sized + Serialize,
	{
		if !self.debug {
			return None;
		}

		serde_json::to_string_pretty(value).ok()
	}
}
impl Debug for Environment {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Environment")
			.field("host", &self.host)
			.field("path", &self.path)
			.field("callback_url", &self.callback_url)
			.field("callback_transport", &self.callback_transport)
			.field("debug", &self.debug)
			.field("security", &self.security)
			.field("request_uri", &self.request_uri)
			.field("complete_path", &self.complete_path)
			.field("warnings", &self.warnings)
			.finish_non_exhaustive()
	}
}

pub(crate) fn required_str(values: &Map<String, Value>, key: &str) -> Result<String, ConfigError> {
	match values.get(key) {
		Some(Value::String(s)) => Ok(s.clone()),
		_ => Err(ConfigError::InvalidValue { key: key.into(), expected: "string" }),
	}
}

fn flag(values: &Map<String, Value>, key: &str) -> Result<bool, ConfigError> {
	match values.get(key) {
		Some(Value::Bool(b)) => Ok(*b),
		Some(Value::Null) | None => Ok(false),
		_ => Err(ConfigError::InvalidValue { key: key.into(), expected: "boolean" }),
	}
}

fn iteration(values: &Map<String, Value>) -> Result<NonZeroU32, ConfigError> {
	let raw = match values.get("security_iteration") {
		Some(Value::Number(n)) => n.as_u64(),
		Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
		_ => None,
	};

	raw.and_then(|n| u32::try_from(n).ok())
		.and_then(NonZeroU32::new)
		.ok_or(ConfigError::InvalidIteration)
}

fn timeout(values: &Map<String, Value>) -> Result<Duration, ConfigError> {
	match values.get("security_timeout") {
		Some(Value::String(s)) => config::parse_duration(s),
		Some(Value::Number(n)) => n
			.as_i64()
			.filter(|secs| *secs >= 0)
			.map(Duration::seconds)
			.ok_or_else(|| ConfigError::InvalidDuration { value: n.to_string() }),
		_ => Err(ConfigError::InvalidValue { key: "security_timeout".into(), expected: "duration string" }),
	}
}
