//! Callback transports that carry envelopes from strategies back to the callback handler.
//!
//! `session` stores the envelope server-side and is consumed on read; `get` and `post` carry
//! it in a single query/form field as URL-safe base64 of the envelope JSON.

pub mod session;

pub use session::*;

// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
// self
use crate::{_prelude::*, config::Environment, envelope::AuthEnvelope, error::ConfigError};

/// Session key and query/form field holding the envelope.
pub const ENVELOPE_FIELD: &str = "auth_relay";

/// Supported callback transports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallbackTransport {
	/// Server-side session store; single-use.
	Session,
	/// Form-encoded POST body.
	Post,
	/// Query string on a redirect.
	Get,
}
impl CallbackTransport {
	/// Returns the configuration name for the transport.
	pub const fn as_str(self) -> &'static str {
		match self {
			CallbackTransport::Session => "session",
			CallbackTransport::Post => "post",
			CallbackTransport::Get => "get",
		}
	}
}
impl Display for CallbackTransport {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for CallbackTransport {
	type Err = UnsupportedTransport;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"session" => Ok(Self::Session),
			"post" => Ok(Self::Post),
			"get" => Ok(Self::Get),
			other => Err(UnsupportedTransport { name: other.to_owned() }),
		}
	}
}

/// Raised when `callback_transport` names an unknown transport.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Unsupported callback transport `{name}`.")]
pub struct UnsupportedTransport {
	/// Configured transport name.
	pub name: String,
}

/// Reads the raw envelope delivered over a transport.
pub trait TransportReader
where
	Self: Send + Sync,
{
	/// Returns the raw envelope, if one is present. Session reads consume the stored value.
	fn read(&self, transport: CallbackTransport) -> Option<Value>;
}

/// Decoded query-string or form-body fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestPayload {
	fields: HashMap<String, String>,
}
impl RequestPayload {
	/// Parses `application/x-www-form-urlencoded` text (a query string or form body).
	pub fn parse(encoded: &str) -> Self {
		let encoded = encoded.strip_prefix('?').unwrap_or(encoded);

		Self { fields: url::form_urlencoded::parse(encoded.as_bytes()).into_owned().collect() }
	}

	/// Parses the query component of a request URI.
	pub fn from_request_uri(request_uri: &str) -> Self {
		request_uri.split_once('?').map(|(_, query)| Self::parse(query)).unwrap_or_default()
	}

	/// Returns a decoded field.
	pub fn field(&self, name: &str) -> Option<&str> {
		self.fields.get(name).map(String::as_str)
	}

	/// Decodes the envelope field; malformed payloads read as absent.
	pub fn envelope(&self) -> Option<Value> {
		decode_envelope(self.field(ENVELOPE_FIELD)?)
	}
}

/// Per-request [`TransportReader`] over an optional session, query string, and form body.
#[derive(Clone, Copy, Default)]
pub struct RequestTransports<'a> {
	session: Option<&'a dyn SessionStore>,
	query: Option<&'a RequestPayload>,
	form: Option<&'a RequestPayload>,
}
impl<'a> RequestTransports<'a> {
	/// Creates a reader with no transports attached.
	pub fn new() -> Self {
		Self::default()
	}

	/// Attaches the caller's session.
	pub fn with_session(mut self, session: &'a dyn SessionStore) -> Self {
		self.session = Some(session);

		self
	}

	/// Attaches the decoded query string.
	pub fn with_query(mut self, query: &'a RequestPayload) -> Self {
		self.query = Some(query);

		self
	}

	/// Attaches the decoded form body.
	pub fn with_form(mut self, form: &'a RequestPayload) -> Self {
		self.form = Some(form);

		self
	}
}
impl Debug for RequestTransports<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestTransports")
			.field("session", &self.session.is_some())
			.field("query", &self.query)
			.field("form", &self.form)
			.finish()
	}
}
impl TransportReader for RequestTransports<'_> {
	fn read(&self, transport: CallbackTransport) -> Option<Value> {
		match transport {
			CallbackTransport::Session => self.session?.take(ENVELOPE_FIELD),
			CallbackTransport::Get => self.query?.envelope(),
			CallbackTransport::Post => self.form?.envelope(),
		}
	}
}

/// Encodes an envelope for the `get`/`post` transports.
pub fn encode_envelope(envelope: &AuthEnvelope) -> String {
	URL_SAFE_NO_PAD.encode(envelope.to_value().to_string())
}

/// Decodes an encoded envelope; returns `None` for invalid base64 or JSON.
pub fn decode_envelope(encoded: &str) -> Option<Value> {
	let bytes = URL_SAFE_NO_PAD.decode(encoded.trim()).ok()?;

	serde_json::from_slice(&bytes).ok()
}

/// Stores an envelope in the caller's session for the `session` transport.
pub fn deliver_to_session(session: &dyn SessionStore, envelope: &AuthEnvelope) {
	session.put(ENVELOPE_FIELD, envelope.to_value());
}

/// Callback URL carrying the envelope in its query string, for the `get` transport.
pub fn callback_redirect_url(env: &Environment, envelope: &AuthEnvelope) -> Result<Url, ConfigError> {
	let mut url = env.callback_endpoint()?;

	url.query_pairs_mut().append_pair(ENVELOPE_FIELD, &encode_envelope(envelope));

	Ok(url)
}

/// Form fields to POST to the callback URL, for the `post` transport.
pub fn callback_form_fields(envelope: &AuthEnvelope) -> Vec<(String, String)> {
	vec![(ENVELOPE_FIELD.to_owned(), encode_envelope(envelope))]
}
