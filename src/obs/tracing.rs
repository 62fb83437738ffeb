// self
use crate::{_prelude::*, callback::CallbackOutcome, config::ConfigWarning, obs::Stage};

/// A span builder used around dispatch and callback handling.
#[derive(Clone, Debug)]
pub struct RequestSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl RequestSpan {
	/// Creates a new span tagged with the provided stage.
	pub fn new(stage: Stage) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("auth_relay.request", stage = stage.as_str());

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = stage;

			Self {}
		}
	}

	/// Enters the span for the rest of the request.
	pub fn entered(self) -> RequestSpanGuard {
		#[cfg(feature = "tracing")]
		{
			RequestSpanGuard { guard: self.span.entered() }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = self;

			RequestSpanGuard {}
		}
	}
}

/// RAII guard returned by [`RequestSpan::entered`].
pub struct RequestSpanGuard {
	#[cfg(feature = "tracing")]
	#[allow(dead_code)]
	guard: tracing::span::EnteredSpan,
}
impl Debug for RequestSpanGuard {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("RequestSpanGuard(..)")
	}
}

/// Emits a configuration hygiene warning.
pub fn config_warning(warning: ConfigWarning) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(warning = warning.as_str(), "{warning}");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = warning;
	}
}

/// Notes that a later strategy entry replaced an earlier one with the same slug.
pub fn slug_collision(slug: &str, replaced: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!(slug, replaced, "Strategy slug registered twice; the later entry wins.");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (slug, replaced);
	}
}

/// Notes which strategy and action a request was dispatched to.
pub fn strategy_dispatched(strategy: &str, action: Option<&str>) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(strategy, action = action.unwrap_or("<default>"), "Dispatching to strategy.");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (strategy, action);
	}
}

pub(crate) fn log_callback_outcome(outcome: &CallbackOutcome) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(outcome = outcome.label(), "{outcome}");
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = outcome;
	}
}
