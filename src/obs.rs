//! Optional observability helpers for dispatch and callback handling.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit spans named `auth_relay.request` with a `stage` field,
//!   warnings for configuration hygiene and slug collisions, and debug events for dispatch.
//! - Enable `metrics` to increment the `auth_relay_callback_total` counter for every callback,
//!   labeled by `outcome`.
//!
//! Nothing emitted here carries the salt, signatures, or envelope contents.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::{_prelude::*, callback::CallbackOutcome};

/// Request stages observed by the front controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
	/// Routing and strategy dispatch.
	Dispatch,
	/// Callback envelope handling.
	Callback,
}
impl Stage {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Stage::Dispatch => "dispatch",
			Stage::Callback => "callback",
		}
	}
}
impl Display for Stage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records and logs a callback outcome.
pub fn callback_outcome(outcome: &CallbackOutcome) {
	record_callback_outcome(outcome.label());
	log_callback_outcome(outcome);
}
