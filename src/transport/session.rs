//! Session-backed transport storage.

// self
use crate::_prelude::*;

/// Per-client session storage used by the `session` transport.
pub trait SessionStore
where
	Self: Send + Sync,
{
	/// Stores (or replaces) a value.
	fn put(&self, key: &str, value: Value);

	/// Removes and returns a value; a second `take` for the same key yields `None`.
	fn take(&self, key: &str) -> Option<Value>;
}

/// Thread-safe in-process session for a single client; suited to tests and embedded hosts.
#[derive(Clone, Debug, Default)]
pub struct MemorySession(Arc<Mutex<HashMap<String, Value>>>);
impl MemorySession {
	/// Returns true when a value is stored under `key`.
	pub fn contains(&self, key: &str) -> bool {
		self.0.lock().contains_key(key)
	}
}
impl SessionStore for MemorySession {
	fn put(&self, key: &str, value: Value) {
		self.0.lock().insert(key.to_owned(), value);
	}

	fn take(&self, key: &str) -> Option<Value> {
		self.0.lock().remove(key)
	}
}
