//! Authentication envelopes returned by strategies, their canonical form, and signing.

// crates.io
use sha2::{Digest, Sha256};
use time::format_description::well_known::Rfc3339;
// self
use crate::{
	_prelude::*,
	security::{self, SecuritySettings},
};

/// Payload a strategy hands back after talking to its identity provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AuthEnvelope {
	/// Successful authentication, signed over the canonical `auth` mapping.
	Signed {
		/// Provider-normalized identity; must carry `provider` and `uid`.
		auth: Map<String, Value>,
		/// RFC 3339 signing instant.
		timestamp: String,
		/// Lower-hex iterated keyed hash.
		signature: String,
	},
	/// Provider-side failure; never validated.
	Error {
		/// Provider-supplied error details.
		error: Map<String, Value>,
	},
}
impl AuthEnvelope {
	/// Builds an error envelope.
	pub fn error(error: Map<String, Value>) -> Self {
		Self::Error { error }
	}

	/// Converts the envelope into the raw JSON shape carried by transports.
	pub fn to_value(&self) -> Value {
		let mut map = Map::new();

		match self {
			Self::Signed { auth, timestamp, signature } => {
				map.insert("auth".into(), Value::Object(auth.clone()));
				map.insert("timestamp".into(), Value::from(timestamp.as_str()));
				map.insert("signature".into(), Value::from(signature.as_str()));
			},
			Self::Error { error } => {
				map.insert("error".into(), Value::Object(error.clone()));
			},
		}

		Value::Object(map)
	}
}

/// Deterministic message for an `auth` mapping: lower-hex SHA-256 of its compact JSON
/// rendering with object keys sorted at every depth.
pub fn canonical_input(auth: &Map<String, Value>) -> String {
	let mut json = String::new();

	write_object(auth, &mut json);

	hex::encode(Sha256::digest(json.as_bytes()))
}

fn write_object(map: &Map<String, Value>, out: &mut String) {
	let mut entries = map.iter().collect::<Vec<_>>();

	entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
	out.push('{');

	for (idx, (key, value)) in entries.into_iter().enumerate() {
		if idx > 0 {
			out.push(',');
		}

		out.push_str(&Value::from(key.as_str()).to_string());
		out.push(':');
		write_value(value, out);
	}

	out.push('}');
}

fn write_value(value: &Value, out: &mut String) {
	match value {
		Value::Object(map) => write_object(map, out),
		Value::Array(items) => {
			out.push('[');

			for (idx, item) in items.iter().enumerate() {
				if idx > 0 {
					out.push(',');
				}

				write_value(item, out);
			}

			out.push(']');
		},
		scalar => out.push_str(&scalar.to_string()),
	}
}

/// Produces envelopes that a [`ResponseValidator`](crate::security::ResponseValidator) built
/// from the same settings will accept.
#[derive(Clone, Copy, Debug)]
pub struct EnvelopeSigner<'a> {
	settings: &'a SecuritySettings,
}
impl<'a> EnvelopeSigner<'a> {
	/// Creates a signer over the provided settings.
	pub fn new(settings: &'a SecuritySettings) -> Self {
		Self { settings }
	}

	/// Signs `auth` at the current UTC instant.
	pub fn sign(&self, auth: Map<String, Value>) -> Result<AuthEnvelope> {
		self.sign_at(auth, OffsetDateTime::now_utc())
	}

	/// Signs `auth` with the provided instant as its timestamp.
	pub fn sign_at(&self, auth: Map<String, Value>, at: OffsetDateTime) -> Result<AuthEnvelope> {
		let timestamp = at.format(&Rfc3339)?;
		let signature = security::iterated_hash(
			&canonical_input(&auth),
			&timestamp,
			self.settings.iteration,
			&self.settings.salt,
		);

		Ok(AuthEnvelope::Signed { auth, timestamp, signature })
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::num::NonZeroU32;
	// crates.io
	use serde_json::json;
	use time::macros;
	// self
	use super::*;
	use crate::security::{ResponseValidator, Salt};

	fn object(value: Value) -> Map<String, Value> {
		match value {
			Value::Object(map) => map,
			_ => panic!("Fixture must be a JSON object."),
		}
	}

	#[test]
	fn canonical_input_ignores_key_order() {
		let mut a = Map::new();

		a.insert("uid".into(), json!("42"));
		a.insert("provider".into(), json!("Google"));
		a.insert("info".into(), json!({ "z": 1, "a": [ { "y": true, "b": null } ] }));

		let mut b = Map::new();

		b.insert("info".into(), json!({ "a": [ { "b": null, "y": true } ], "z": 1 }));
		b.insert("provider".into(), json!("Google"));
		b.insert("uid".into(), json!("42"));

		assert_eq!(canonical_input(&a), canonical_input(&b));
		assert_ne!(canonical_input(&a), canonical_input(&object(json!({ "uid": "43" }))));
	}

	#[test]
	fn signed_envelopes_validate() {
		let settings = SecuritySettings {
			salt: Salt::new("fixture-salt"),
			iteration: NonZeroU32::new(300).expect("Fixture iteration count is non-zero."),
			timeout: Duration::minutes(2),
		};
		let auth = object(json!({ "provider": "Google", "uid": "42" }));
		let at = macros::datetime!(2026-03-01 09:30 UTC);
		let envelope = EnvelopeSigner::new(&settings)
			.sign_at(auth.clone(), at)
			.expect("Signing a fixed instant should succeed.");
		let AuthEnvelope::Signed { timestamp, signature, .. } = &envelope else {
			panic!("Signer should produce a signed envelope.");
		};

		assert_eq!(timestamp, "2026-03-01T09:30:00Z");
		assert!(
			ResponseValidator::new(&settings)
				.validate_at(at + Duration::seconds(30), &canonical_input(&auth), timestamp, signature)
				.valid
		);
	}

	#[test]
	fn envelope_values_match_wire_shape() {
		let error = AuthEnvelope::error(object(json!({ "code": "access_denied" })));

		assert_eq!(error.to_value(), json!({ "error": { "code": "access_denied" } }));

		let round_trip: AuthEnvelope = serde_json::from_value(error.to_value())
			.expect("Error envelope should deserialize.");

		assert_eq!(round_trip, error);
	}
}
