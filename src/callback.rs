//! Callback handling: read the envelope from the configured transport, classify it, and
//! validate signed envelopes.

// self
use crate::{
	_prelude::*,
	config::Environment,
	context::RequestContext,
	envelope,
	obs::{self, RequestSpan, Stage},
	security::{EnvelopeVerifier, RejectReason, ResponseValidator},
	transport::CallbackTransport,
};

/// Classified callback result. Every variant is a recoverable, reportable outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackOutcome {
	/// Envelope signature and freshness verified.
	Validated,
	/// The provider returned an error envelope; validation was skipped.
	ProviderError,
	/// `auth`, `timestamp`, `signature`, `auth.provider`, or `auth.uid` is missing or empty.
	MissingComponents,
	/// The envelope failed validation.
	Rejected(RejectReason),
	/// `callback_transport` does not name a supported transport.
	UnsupportedTransport(String),
}
impl CallbackOutcome {
	/// Returns true only for [`CallbackOutcome::Validated`].
	pub fn is_ok(&self) -> bool {
		matches!(self, Self::Validated)
	}

	/// Stable label suitable for metrics and log fields.
	pub const fn label(&self) -> &'static str {
		match self {
			Self::Validated => "ok",
			Self::ProviderError => "provider_error",
			Self::MissingComponents | Self::Rejected(_) => "invalid",
			Self::UnsupportedTransport(_) => "unsupported_transport",
		}
	}
}
impl Display for CallbackOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Validated => f.write_str("ok"),
			Self::ProviderError =>
				f.write_str("authentication error: provider returned an error response"),
			Self::MissingComponents => f.write_str("invalid: missing components"),
			Self::Rejected(reason) => write!(f, "invalid: {reason}"),
			Self::UnsupportedTransport(name) => write!(f, "error: unsupported callback transport `{name}`"),
		}
	}
}

/// Callback outcome plus the raw envelope, which is surfaced regardless of outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackReport {
	/// Configured transport name.
	pub transport: String,
	/// Classified outcome.
	pub outcome: CallbackOutcome,
	/// Envelope as read from the transport, if any.
	pub envelope: Option<Value>,
}

/// Reads, classifies, and validates callback envelopes.
#[derive(Clone, Debug)]
pub struct CallbackHandler<'a, V = ResponseValidator<'a>> {
	transport: &'a str,
	verifier: V,
}
impl<'a> CallbackHandler<'a> {
	/// Creates a handler using the environment's transport and security settings.
	pub fn new(env: &'a Environment) -> Self {
		Self { transport: &env.callback_transport, verifier: ResponseValidator::new(&env.security) }
	}
}
impl<'a, V> CallbackHandler<'a, V>
where
	V: EnvelopeVerifier,
{
	/// Creates a handler with a custom verifier.
	pub fn with_verifier(transport: &'a str, verifier: V) -> Self {
		Self { transport, verifier }
	}

	/// Handles one callback request.
	pub fn handle(&self, ctx: &RequestContext<'_>) -> CallbackReport {
		let _guard = RequestSpan::new(Stage::Callback).entered();
		let (outcome, envelope) = match self.transport.parse::<CallbackTransport>() {
			Ok(transport) => {
				let envelope = ctx.transport.read(transport);

				(self.classify(envelope.as_ref(), ctx.clock.now()), envelope)
			},
			Err(err) => (CallbackOutcome::UnsupportedTransport(err.name), None),
		};

		obs::callback_outcome(&outcome);

		CallbackReport { transport: self.transport.to_owned(), outcome, envelope }
	}

	fn classify(&self, envelope: Option<&Value>, now: OffsetDateTime) -> CallbackOutcome {
		let Some(Value::Object(envelope)) = envelope else {
			return CallbackOutcome::MissingComponents;
		};

		if envelope.contains_key("error") {
			return CallbackOutcome::ProviderError;
		}

		let auth = match envelope.get("auth") {
			Some(Value::Object(auth)) if !auth.is_empty() => auth,
			_ => return CallbackOutcome::MissingComponents,
		};
		let (Some(timestamp), Some(signature)) =
			(non_empty_str(envelope.get("timestamp")), non_empty_str(envelope.get("signature")))
		else {
			return CallbackOutcome::MissingComponents;
		};

		if is_blank(auth.get("provider")) || is_blank(auth.get("uid")) {
			return CallbackOutcome::MissingComponents;
		}

		let result =
			self.verifier.verify(&envelope::canonical_input(auth), timestamp, signature, now);

		match result.reason {
			None if result.valid => CallbackOutcome::Validated,
			Some(reason) => CallbackOutcome::Rejected(reason),
			None => CallbackOutcome::Rejected(RejectReason::SignatureMismatch),
		}
	}
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
	match value {
		Some(Value::String(s)) if !s.is_empty() => Some(s),
		_ => None,
	}
}

// Empty means absent, null, false, zero, "", "0", or an empty collection.
fn is_blank(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) | Some(Value::Bool(false)) => true,
		Some(Value::String(s)) => s.is_empty() || s == "0",
		Some(Value::Number(n)) => n.as_f64() == Some(0.0),
		Some(Value::Array(items)) => items.is_empty(),
		Some(Value::Object(map)) => map.is_empty(),
		Some(Value::Bool(true)) => false,
	}
}
