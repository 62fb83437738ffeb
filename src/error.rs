//! Fatal error types shared across configuration, registry, and dispatch.
//!
//! Recoverable callback failures (expired or forged envelopes, missing components,
//! provider-side errors, unsupported transports) are never surfaced here; they are reported
//! as [`CallbackReport`](crate::callback::CallbackReport) values instead.

// std
use std::path::PathBuf;
// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Boxed error produced by external strategy handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Deployment-time configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Request path named a strategy the registry does not know.
	#[error(transparent)]
	Routing(#[from] RoutingError),
	/// A strategy handler failed while running an action.
	#[error("Strategy `{strategy}` failed while handling the request.")]
	Handler {
		/// Canonical name of the failing strategy.
		strategy: String,
		/// Handler-supplied failure.
		#[source]
		source: BoxError,
	},
	/// An envelope timestamp could not be rendered as RFC 3339.
	#[error("Envelope timestamp could not be formatted.")]
	TimestampFormat(#[from] time::error::Format),
}

/// Configuration and registration failures; these indicate a misdeployed system.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The `Strategy` key is absent, empty, or not a collection.
	#[error("No strategies are defined.")]
	NoStrategies,
	/// A `Strategy` entry has an unusable shape.
	#[error("Strategy entry `{name}` is invalid.")]
	InvalidStrategyEntry {
		/// Entry key (or rendered value) that failed validation.
		name: String,
	},
	/// A recognized key holds a value of the wrong type.
	#[error("Configuration key `{key}` must be a {expected}.")]
	InvalidValue {
		/// Offending configuration key.
		key: String,
		/// Human-readable description of the expected type.
		expected: &'static str,
	},
	/// `security_timeout` is not a recognized duration string.
	#[error("Duration `{value}` is not recognized.")]
	InvalidDuration {
		/// Raw duration string.
		value: String,
	},
	/// `security_iteration` is zero, negative, or out of range.
	#[error("The security_iteration value must be a positive 32-bit integer.")]
	InvalidIteration,
	/// A registered strategy points at a handler identifier with no factory.
	#[error("Strategy `{strategy}` uses handler `{handler_id}`, which is not registered.")]
	UnknownHandler {
		/// Canonical strategy name.
		strategy: String,
		/// Handler identifier that failed lookup.
		handler_id: String,
	},
	/// A URL derived from configuration cannot be parsed.
	#[error("Configured URL `{value}` is invalid.")]
	InvalidUrl {
		/// Raw URL text.
		value: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// JSON configuration could not be parsed.
	#[error("Configuration is not a valid JSON object.")]
	Parse(#[from] serde_path_to_error::Error<serde_json::Error>),
	/// Configuration file could not be read.
	#[error("Configuration file {} could not be read.", .path.display())]
	Read {
		/// File that failed to load.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
}

/// Routing failures raised after the registry has been built.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum RoutingError {
	/// The strategy slug does not match any registered strategy.
	#[error("Unsupported or undefined strategy `{slug}`.")]
	UnsupportedStrategy {
		/// Slug taken from the request path.
		slug: String,
	},
}
