//! Slug-indexed registry of configured strategies.

// self
use crate::{
	_prelude::*,
	config::Environment,
	error::ConfigError,
	obs,
	strategy::StrategyDescriptor,
};

/// Slug-indexed strategy registry built once at startup.
///
/// Two entries that resolve to the same slug do not fail registration: the later entry
/// replaces the earlier one. Both the object and list forms are registered in the order they
/// were written.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StrategyRegistry {
	by_slug: HashMap<String, StrategyDescriptor>,
}
impl StrategyRegistry {
	/// Validates and indexes a `Strategy` collection.
	///
	/// Accepted shapes:
	/// - an object of `name -> options` where options is an object, `null`, or `true`;
	///   a string value is treated as a bare name (the key is ignored);
	/// - a list whose items are bare names or single-level `{ name: options }` objects.
	pub fn register(strategies: Option<&Value>) -> Result<Self, ConfigError> {
		let entries = strategy_entries(strategies)?;

		if entries.is_empty() {
			return Err(ConfigError::NoStrategies);
		}

		let mut by_slug = HashMap::with_capacity(entries.len());

		for (name, options) in entries {
			if name.is_empty() {
				return Err(ConfigError::InvalidStrategyEntry { name });
			}

			let descriptor = StrategyDescriptor::from_entry(name, options);

			if let Some(previous) = by_slug.insert(descriptor.url_slug.clone(), descriptor) {
				obs::slug_collision(&previous.url_slug, &previous.canonical_name);
			}
		}

		Ok(Self { by_slug })
	}

	/// Registers the environment's `Strategy` collection.
	pub fn from_environment(env: &Environment) -> Result<Self, ConfigError> {
		Self::register(env.strategies())
	}

	/// Looks up a strategy by slug (exact match).
	pub fn get(&self, slug: &str) -> Option<&StrategyDescriptor> {
		self.by_slug.get(slug)
	}

	/// Returns true when the slug is registered.
	pub fn contains(&self, slug: &str) -> bool {
		self.by_slug.contains_key(slug)
	}

	/// Number of registered slugs.
	pub fn len(&self) -> usize {
		self.by_slug.len()
	}

	/// Always false for a registry built by [`StrategyRegistry::register`].
	pub fn is_empty(&self) -> bool {
		self.by_slug.is_empty()
	}

	/// Iterates over registered descriptors in unspecified order.
	pub fn iter(&self) -> impl Iterator<Item = &StrategyDescriptor> {
		self.by_slug.values()
	}
}

fn strategy_entries(
	strategies: Option<&Value>,
) -> Result<Vec<(String, Map<String, Value>)>, ConfigError> {
	match strategies {
		Some(Value::Object(map)) =>
			map.iter().map(|(key, value)| object_entry(key, value)).collect(),
		Some(Value::Array(items)) => {
			let mut entries = Vec::with_capacity(items.len());

			for item in items {
				match item {
					Value::String(name) => entries.push((name.clone(), Map::new())),
					Value::Object(map) if !map.is_empty() => {
						for (key, value) in map {
							entries.push(object_entry(key, value)?);
						}
					},
					other => return Err(ConfigError::InvalidStrategyEntry { name: other.to_string() }),
				}
			}

			Ok(entries)
		},
		_ => Err(ConfigError::NoStrategies),
	}
}

fn object_entry(key: &str, value: &Value) -> Result<(String, Map<String, Value>), ConfigError> {
	match value {
		Value::Object(options) => Ok((key.to_owned(), options.clone())),
		Value::Null | Value::Bool(true) => Ok((key.to_owned(), Map::new())),
		Value::String(name) => Ok((name.clone(), Map::new())),
		_ => Err(ConfigError::InvalidStrategyEntry { name: key.to_owned() }),
	}
}
