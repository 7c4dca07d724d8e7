// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::obs::FetchSource;

/// Thread-safe counters for coordinator rounds.
#[derive(Debug, Default)]
pub struct CoordinatorMetrics {
	fetches: AtomicU64,
	success: AtomicU64,
	failure: AtomicU64,
	interactive: AtomicU64,
	stale: AtomicU64,
	armed: AtomicU64,
	immediate: AtomicU64,
}
impl CoordinatorMetrics {
	/// Returns the number of fetch rounds started.
	pub fn fetches(&self) -> u64 {
		self.fetches.load(Ordering::Relaxed)
	}

	/// Returns the number of rounds that produced a usable token.
	pub fn successes(&self) -> u64 {
		self.success.load(Ordering::Relaxed)
	}

	/// Returns the number of rounds that ended in an error state.
	pub fn failures(&self) -> u64 {
		self.failure.load(Ordering::Relaxed)
	}

	/// Returns how many successful rounds needed the interactive fallback.
	pub fn interactive_fallbacks(&self) -> u64 {
		self.interactive.load(Ordering::Relaxed)
	}

	/// Returns how many rounds completed after being superseded by a reset.
	pub fn stale_completions(&self) -> u64 {
		self.stale.load(Ordering::Relaxed)
	}

	/// Returns how many refresh timers were armed.
	pub fn refreshes_armed(&self) -> u64 {
		self.armed.load(Ordering::Relaxed)
	}

	/// Returns how many armed refreshes fired without delay because the token lifetime was
	/// already inside the refresh margin.
	pub fn immediate_refreshes(&self) -> u64 {
		self.immediate.load(Ordering::Relaxed)
	}

	pub(crate) fn record_fetch(&self) {
		self.fetches.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_success(&self, source: FetchSource) {
		self.success.fetch_add(1, Ordering::Relaxed);

		if source == FetchSource::Interactive {
			self.interactive.fetch_add(1, Ordering::Relaxed);
		}
	}

	pub(crate) fn record_failure(&self) {
		self.failure.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_stale(&self) {
		self.stale.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_armed(&self) {
		self.armed.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn record_immediate(&self) {
		self.immediate.fetch_add(1, Ordering::Relaxed);
	}
}
