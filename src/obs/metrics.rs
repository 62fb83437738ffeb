/// Records a callback outcome via the global metrics recorder (when enabled).
pub fn record_callback_outcome(outcome: &'static str) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("auth_relay_callback_total", "outcome" => outcome).increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}
