//! Provider call counters and latency histograms, emitted through the global `metrics` recorder.

// std
use std::time::Duration as StdDuration;
// self
use crate::obs::{FetchOutcome, FetchSource, FetchTrigger};

/// Counts one provider call event as `token_coordinator_fetch_total`.
pub fn record_fetch_outcome(source: FetchSource, outcome: FetchOutcome, trigger: FetchTrigger) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"token_coordinator_fetch_total",
			"source" => source.as_str(),
			"outcome" => outcome.as_str(),
			"trigger" => trigger.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (source, outcome, trigger);
	}
}

/// Records a finished provider call in `token_coordinator_fetch_duration_seconds`.
///
/// Only terminal outcomes carry a latency; [`FetchOutcome::Attempt`] is ignored.
pub fn record_fetch_latency(source: FetchSource, outcome: FetchOutcome, elapsed: StdDuration) {
	if outcome == FetchOutcome::Attempt {
		return;
	}

	#[cfg(feature = "metrics")]
	{
		metrics::histogram!(
			"token_coordinator_fetch_duration_seconds",
			"source" => source.as_str(),
			"outcome" => outcome.as_str()
		)
		.record(elapsed.as_secs_f64());
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (source, elapsed);
	}
}
