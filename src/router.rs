//! Request path parsing into a strategy slug and action.

// self
use crate::{_prelude::*, config::template::is_token_char};

/// Path segments extracted from a request, with positional accessors.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParams {
	/// `[A-Za-z0-9-_]+` segments in order of appearance.
	pub segments: Vec<String>,
}
impl RouteParams {
	/// Strips `base_path` from `request_uri` and extracts the remaining segments.
	///
	/// The base path is matched without its trailing `/`, so `/auth/` strips `/auth` and the
	/// remainder keeps its leading slash. Query strings and fragments are ignored.
	pub fn parse(request_uri: &str, base_path: &str) -> Self {
		let path = request_uri.split(['?', '#']).next().unwrap_or_default();
		let prefix = base_path.trim_end_matches('/');
		let rest = path.strip_prefix(prefix).unwrap_or(path);

		Self { segments: segments(rest) }
	}

	/// Segment 0: the strategy slug (or the reserved `callback`).
	pub fn strategy_slug(&self) -> Option<&str> {
		self.segments.first().map(String::as_str)
	}

	/// Segment 1: the action forwarded to the strategy handler.
	pub fn action(&self) -> Option<&str> {
		self.segments.get(1).map(String::as_str)
	}

	/// Returns true when the path carried no segments.
	pub fn is_empty(&self) -> bool {
		self.segments.is_empty()
	}
}

// Each segment is a `/` followed by the longest run of token characters; anything else
// between slashes is skipped.
fn segments(path: &str) -> Vec<String> {
	let mut out = Vec::new();
	let mut rest = path;

	while let Some(slash) = rest.find('/') {
		let after = &rest[slash + 1..];
		let len = after.find(|c: char| !is_token_char(c)).unwrap_or(after.len());

		if len > 0 {
			out.push(after[..len].to_owned());
		}

		rest = &after[len..];
	}

	out
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn strategy_and_action_are_positional() {
		let route = RouteParams::parse("/twitter/callback", "/");

		assert_eq!(route.strategy_slug(), Some("twitter"));
		assert_eq!(route.action(), Some("callback"));
	}

	#[test]
	fn root_has_no_segments() {
		let route = RouteParams::parse("/", "/");

		assert!(route.is_empty());
		assert_eq!(route.strategy_slug(), None);
		assert_eq!(route.action(), None);
	}

	#[test]
	fn base_path_is_stripped() {
		let route = RouteParams::parse("/auth/google/oauth2callback", "/auth/");

		assert_eq!(route.segments, vec!["google", "oauth2callback"]);

		let route = RouteParams::parse("/auth/", "/auth/");

		assert!(route.is_empty());
	}

	#[test]
	fn query_and_invalid_characters_are_ignored() {
		let route = RouteParams::parse("/face.book/x-y_z/?next=/admin", "/");

		assert_eq!(route.segments, vec!["face", "x-y_z"]);

		let route = RouteParams::parse("//github//int_callback#top", "/");

		assert_eq!(route.segments, vec!["github", "int_callback"]);
	}
}
