//! Signed-envelope verification: iterated keyed hash, freshness window, constant-time compare.

// std
use std::num::NonZeroU32;
// crates.io
use hmac::{Hmac, Mac};
use rand::{Rng, distr::Alphanumeric};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use time::format_description::well_known::Rfc3339;
// self
use crate::_prelude::*;

type HmacSha256 = Hmac<Sha256>;

const GENERATED_SALT_LEN: usize = 64;

/// Redacted salt wrapper keeping the signing key out of logs and reason strings.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Salt(String);
impl Salt {
	/// Wraps a salt value.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Generates a random alphanumeric salt suitable for `security_salt`.
	pub fn generate() -> Self {
		Self(rand::rng().sample_iter(Alphanumeric).take(GENERATED_SALT_LEN).map(char::from).collect())
	}

	/// Returns the raw salt. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl Debug for Salt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("Salt").field(&"<redacted>").finish()
	}
}
impl Display for Salt {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}
impl Serialize for Salt {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: serde::Serializer,
	{
		serializer.serialize_str("<redacted>")
	}
}

/// Security settings extracted from the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecuritySettings {
	/// Key for every hash round.
	pub salt: Salt,
	/// Total number of keyed-hash rounds (at least one).
	pub iteration: NonZeroU32,
	/// Maximum age of an accepted envelope.
	pub timeout: Duration,
}

/// Why an envelope was rejected. The rendered text never includes key material.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
	/// Timestamp is unparsable, older than the freshness window, or in the future.
	Expired,
	/// Recomputed hash does not match the supplied signature.
	SignatureMismatch,
}
impl RejectReason {
	/// Returns the human-readable reason.
	pub const fn as_str(self) -> &'static str {
		match self {
			RejectReason::Expired => "expired",
			RejectReason::SignatureMismatch => "signature does not validate",
		}
	}
}
impl Display for RejectReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome of validating a signed envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
	/// Whether the envelope was accepted.
	pub valid: bool,
	/// Rejection reason when `valid` is false.
	pub reason: Option<RejectReason>,
}
impl ValidationResult {
	/// Accepted result.
	pub const fn accepted() -> Self {
		Self { valid: true, reason: None }
	}

	/// Rejected result with the provided reason.
	pub const fn rejected(reason: RejectReason) -> Self {
		Self { valid: false, reason: Some(reason) }
	}
}

/// Verification seam used by the callback handler.
pub trait EnvelopeVerifier {
	/// Validates a canonical input/timestamp/signature triple as of `now`.
	fn verify(
		&self,
		canonical_input: &str,
		timestamp: &str,
		signature: &str,
		now: OffsetDateTime,
	) -> ValidationResult;
}
impl<T> EnvelopeVerifier for &T
where
	T: ?Sized + EnvelopeVerifier,
{
	fn verify(
		&self,
		canonical_input: &str,
		timestamp: &str,
		signature: &str,
		now: OffsetDateTime,
	) -> ValidationResult {
		(**self).verify(canonical_input, timestamp, signature, now)
	}
}

/// Verifies envelopes against the configured salt, iteration count, and timeout.
#[derive(Clone, Copy, Debug)]
pub struct ResponseValidator<'a> {
	settings: &'a SecuritySettings,
}
impl<'a> ResponseValidator<'a> {
	/// Creates a validator over the provided settings.
	pub fn new(settings: &'a SecuritySettings) -> Self {
		Self { settings }
	}

	/// Validates against the current UTC time.
	pub fn validate(&self, canonical_input: &str, timestamp: &str, signature: &str) -> ValidationResult {
		self.validate_at(OffsetDateTime::now_utc(), canonical_input, timestamp, signature)
	}

	/// Validates as of `now`.
	///
	/// The timestamp must fall within `[now - timeout, now]`; the inclusive lower bound means
	/// an envelope exactly `timeout` old is still accepted.
	pub fn validate_at(
		&self,
		now: OffsetDateTime,
		canonical_input: &str,
		timestamp: &str,
		signature: &str,
	) -> ValidationResult {
		if !self.is_fresh(timestamp, now) {
			return ValidationResult::rejected(RejectReason::Expired);
		}

		let expected = iterated_hash(
			canonical_input,
			timestamp,
			self.settings.iteration,
			&self.settings.salt,
		);

		if signatures_match(&expected, signature) {
			ValidationResult::accepted()
		} else {
			ValidationResult::rejected(RejectReason::SignatureMismatch)
		}
	}

	fn is_fresh(&self, timestamp: &str, now: OffsetDateTime) -> bool {
		let Ok(issued_at) = OffsetDateTime::parse(timestamp, &Rfc3339) else {
			return false;
		};

		// A window reaching past the representable range has no lower bound.
		let not_too_old = match now.checked_sub(self.settings.timeout) {
			Some(earliest) => issued_at >= earliest,
			None => true,
		};

		not_too_old && issued_at <= now
	}
}
impl EnvelopeVerifier for ResponseValidator<'_> {
	fn verify(
		&self,
		canonical_input: &str,
		timestamp: &str,
		signature: &str,
		now: OffsetDateTime,
	) -> ValidationResult {
		self.validate_at(now, canonical_input, timestamp, signature)
	}
}

/// Computes the envelope signature: HMAC-SHA-256 (keyed by `salt`) over
/// `canonical_input ++ timestamp`, re-applied `iteration - 1` times over the previous
/// lower-hex digest.
pub fn iterated_hash(
	canonical_input: &str,
	timestamp: &str,
	iteration: NonZeroU32,
	salt: &Salt,
) -> String {
	let mut digest = keyed_hash(&[canonical_input.as_bytes(), timestamp.as_bytes()], salt);

	for _ in 1..iteration.get() {
		digest = keyed_hash(&[digest.as_bytes()], salt);
	}

	digest
}

fn keyed_hash(parts: &[&[u8]], salt: &Salt) -> String {
	let mut mac = HmacSha256::new_from_slice(salt.expose().as_bytes())
		.expect("HMAC can accept any key length.");

	for part in parts {
		mac.update(part);
	}

	hex::encode(mac.finalize().into_bytes())
}

// Case-insensitive; the digest is lower-hex so only the candidate needs folding.
fn signatures_match(expected: &str, candidate: &str) -> bool {
	let candidate = candidate.to_ascii_lowercase();

	expected.as_bytes().ct_eq(candidate.as_bytes()).into()
}
