//! Optional observability helpers for the coordinator.
//!
//! # Feature Flags
//!
//! - Enable `tracing` (default) to emit `token_coordinator.fetch` spans carrying the `round`
//!   and `refresh` fields, plus debug/warn events for superseded rounds and listener panics.
//! - Enable `metrics` to increment the `token_coordinator_fetch_total` counter for every
//!   attempt/success/failure, labeled by `source`, `outcome`, and `trigger`, and to record
//!   per-call latency in `token_coordinator_fetch_duration_seconds`.

/// Emits a `tracing` event when the `tracing` feature is enabled; expands to nothing otherwise.
macro_rules! trace_event {
	($level:ident, $($arg:tt)+) => {
		#[cfg(feature = "tracing")]
		{
			::tracing::$level!(target: "token_coordinator", $($arg)+);
		}
	};
}

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Provider call path a fetch went through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchSource {
	/// Silent (no user prompt) acquisition.
	Silent,
	/// Interactive fallback acquisition.
	Interactive,
}
impl FetchSource {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchSource::Silent => "silent",
			FetchSource::Interactive => "interactive",
		}
	}
}
impl Display for FetchSource {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Whether a fetch serves a fresh round or a scheduled refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchTrigger {
	/// First fetch of a round, after the provider signalled readiness.
	Initial,
	/// Fetch started by the refresh timer; bypasses the provider cache.
	Refresh,
}
impl FetchTrigger {
	/// Maps the provider `refresh` flag onto a trigger.
	pub const fn from_refresh(refresh: bool) -> Self {
		if refresh { Self::Refresh } else { Self::Initial }
	}

	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchTrigger::Initial => "initial",
			FetchTrigger::Refresh => "refresh",
		}
	}
}

/// Outcome labels recorded for each provider call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Call issued.
	Attempt,
	/// Call returned a token.
	Success,
	/// Call failed.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
