//! Explicit request inputs handed to the router, dispatcher, and callback handler.
//!
//! Nothing in the crate reads ambient process state; the host builds a [`RequestOrigin`] once
//! for configuration resolution and a [`RequestContext`] for every request.

// self
use crate::{_prelude::*, transport::TransportReader};

/// Source of "now" for freshness checks and envelope signing.
pub trait Clock
where
	Self: Send + Sync,
{
	/// Returns the current instant.
	fn now(&self) -> OffsetDateTime;
}

/// [`Clock`] backed by the system UTC clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;
impl Clock for SystemClock {
	fn now(&self) -> OffsetDateTime {
		OffsetDateTime::now_utc()
	}
}

/// [`Clock`] pinned to a single instant; useful for replaying envelopes and in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedClock(pub OffsetDateTime);
impl Clock for FixedClock {
	fn now(&self) -> OffsetDateTime {
		self.0
	}
}

/// Scheme, host, and request URI observed when the environment is resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOrigin {
	/// Whether the request arrived over HTTPS.
	pub https: bool,
	/// `Host` header value (may include a port).
	pub host: String,
	/// Raw request URI (path and query).
	pub request_uri: String,
}
impl RequestOrigin {
	/// Creates a plain-HTTP origin for the provided host and request URI.
	pub fn new(host: impl Into<String>, request_uri: impl Into<String>) -> Self {
		Self { https: false, host: host.into(), request_uri: request_uri.into() }
	}

	/// Overrides the HTTPS flag.
	pub fn with_https(mut self, https: bool) -> Self {
		self.https = https;

		self
	}

	/// Returns `scheme://host`, the default value of the `host` configuration key.
	pub fn base_url(&self) -> String {
		let scheme = if self.https { "https" } else { "http" };

		format!("{scheme}://{}", self.host)
	}
}

/// Per-request inputs: the URI being routed, the callback payload accessor, and a clock.
pub struct RequestContext<'a> {
	/// Raw request URI (path and optional query).
	pub request_uri: String,
	/// Accessor for envelopes carried by the configured callback transport.
	pub transport: &'a dyn TransportReader,
	/// Clock used for freshness checks.
	pub clock: &'a dyn Clock,
}
impl<'a> RequestContext<'a> {
	/// Creates a context using the system clock.
	pub fn new(request_uri: impl Into<String>, transport: &'a dyn TransportReader) -> Self {
		Self { request_uri: request_uri.into(), transport, clock: &SystemClock }
	}

	/// Overrides the clock.
	pub fn with_clock(mut self, clock: &'a dyn Clock) -> Self {
		self.clock = clock;

		self
	}
}
impl Debug for RequestContext<'_> {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RequestContext")
			.field("request_uri", &self.request_uri)
			.field("now", &self.clock.now())
			.finish_non_exhaustive()
	}
}
