//! Strategy descriptors (data), the slug registry, and the handler capability (behavior).
//!
//! `registry` validates the configured `Strategy` collection and indexes it by URL slug.
//! `handler` defines [`StrategyHandler`], the capability external provider integrations
//! implement, and the [`HandlerTable`] that maps handler identifiers to factories.

pub mod handler;
pub mod registry;

pub use handler::*;
pub use registry::*;

// self
use crate::_prelude::*;

/// Option key overriding the handler identifier (defaults to the strategy name).
pub const HANDLER_ID_OPTION: &str = "handler_id";
/// Option key overriding the URL slug (defaults to the lower-cased strategy name).
pub const URL_SLUG_OPTION: &str = "url_slug";
/// Option key the registry fills with the canonical strategy name.
pub const NAME_OPTION: &str = "strategy_name";

/// Registered strategy, immutable after startup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyDescriptor {
	/// Name as written in configuration, e.g. `Google`.
	pub canonical_name: String,
	/// URL-friendly slug routed to this strategy, e.g. `google`.
	pub url_slug: String,
	/// Identifier used to look up the handler factory.
	pub handler_id: String,
	/// Provider options, including the resolved `handler_id`, `url_slug`, and
	/// `strategy_name` keys.
	pub options: Map<String, Value>,
}
impl StrategyDescriptor {
	/// Builds a descriptor from a configuration entry, applying the identifier defaults.
	pub fn from_entry(name: impl Into<String>, mut options: Map<String, Value>) -> Self {
		let canonical_name = name.into();
		let handler_id = match options.get(HANDLER_ID_OPTION) {
			Some(Value::String(id)) if !id.is_empty() => id.clone(),
			_ => canonical_name.clone(),
		};
		let url_slug = match options.get(URL_SLUG_OPTION) {
			Some(Value::String(slug)) if !slug.is_empty() => slug.clone(),
			_ => canonical_name.to_lowercase(),
		};

		options.insert(HANDLER_ID_OPTION.into(), Value::from(handler_id.as_str()));
		options.insert(URL_SLUG_OPTION.into(), Value::from(url_slug.as_str()));
		options.insert(NAME_OPTION.into(), Value::from(canonical_name.as_str()));

		Self { canonical_name, url_slug, handler_id, options }
	}

	/// Returns a provider option.
	pub fn option(&self, key: &str) -> Option<&Value> {
		self.options.get(key)
	}
}
