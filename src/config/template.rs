//! Single-pass `{name}` placeholder substitution over configuration strings.

// std
use std::borrow::Cow;
// self
use crate::_prelude::*;

/// Returns true for characters allowed in placeholder names and path segments
/// (`[A-Za-z0-9-_]`).
pub(crate) fn is_token_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Replaces every `{name}` token in `template` with the string form of `dictionary[name]`.
///
/// The template is scanned left to right exactly once, so replacement text is never
/// re-expanded. Tokens whose name is missing from the dictionary, or whose value is a
/// mapping or sequence, are left verbatim.
pub fn substitute(template: &str, dictionary: &Map<String, Value>) -> String {
	let mut out = String::with_capacity(template.len());
	let mut rest = template;

	while let Some(open) = rest.find('{') {
		out.push_str(&rest[..open]);

		let after = &rest[open + 1..];
		let name_len = after.find(|c: char| !is_token_char(c)).unwrap_or(after.len());
		let name = &after[..name_len];

		if name_len == 0 || !after[name_len..].starts_with('}') {
			out.push('{');
			rest = after;

			continue;
		}

		match dictionary.get(name).and_then(placeholder_text) {
			Some(text) => out.push_str(&text),
			None => {
				out.push('{');
				out.push_str(name);
				out.push('}');
			},
		}

		rest = &after[name_len + 1..];
	}

	out.push_str(rest);

	out
}

fn placeholder_text(value: &Value) -> Option<Cow<'_, str>> {
	match value {
		Value::String(s) => Some(Cow::Borrowed(s)),
		Value::Number(n) => Some(Cow::Owned(n.to_string())),
		Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
		Value::Null => Some(Cow::Borrowed("")),
		Value::Array(_) | Value::Object(_) => None,
	}
}
