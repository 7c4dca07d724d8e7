//! One-shot proactive refresh timer.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::{task::JoinHandle, time::Instant};
// self
use crate::{_prelude::*, auth::TokenClaims};

/// Computes how long to wait before refreshing a token that expires at `expires_at`.
///
/// The result is `max(0, expires_at - margin - now)`; it never goes negative.
pub fn refresh_delay(
	expires_at: OffsetDateTime,
	margin: Duration,
	now: OffsetDateTime,
) -> StdDuration {
	expires_at
		.checked_sub(margin)
		.map(|refresh_at| refresh_at - now)
		.and_then(|delay| StdDuration::try_from(delay).ok())
		.unwrap_or_default()
}

/// Holds at most one armed refresh timer.
///
/// Arming replaces any previous timer; cancelling when nothing is armed is a no-op. A timer
/// that already fired may still have its message queued, so the receiver compares the round
/// generation carried by the message against [`RefreshScheduler::armed_generation`].
#[derive(Debug, Default)]
pub struct RefreshScheduler {
	armed: Option<ArmedRefresh>,
}
#[derive(Debug)]
struct ArmedRefresh {
	generation: u64,
	deadline: Instant,
	task: JoinHandle<()>,
}
impl RefreshScheduler {
	/// Arms a refresh for the token described by `claims`, returning the chosen delay.
	pub fn arm<F>(
		&mut self,
		generation: u64,
		claims: &TokenClaims,
		margin: Duration,
		fire: F,
	) -> StdDuration
	where
		F: 'static + Send + FnOnce(),
	{
		let delay = refresh_delay(claims.expires_at, margin, OffsetDateTime::now_utc());

		self.arm_after(generation, delay, fire);

		delay
	}

	/// Arms `fire` to run after `delay`.
	pub fn arm_after<F>(&mut self, generation: u64, delay: StdDuration, fire: F)
	where
		F: 'static + Send + FnOnce(),
	{
		self.cancel();

		let deadline = Instant::now() + delay;
		let task = tokio::spawn(async move {
			tokio::time::sleep_until(deadline).await;

			fire();
		});

		self.armed = Some(ArmedRefresh { generation, deadline, task });
	}

	/// Cancels the armed timer. Returns `true` if one was armed.
	pub fn cancel(&mut self) -> bool {
		match self.armed.take() {
			Some(armed) => {
				armed.task.abort();

				true
			},
			None => false,
		}
	}

	/// Generation the armed timer was created for.
	pub fn armed_generation(&self) -> Option<u64> {
		self.armed.as_ref().map(|armed| armed.generation)
	}

	/// Time left until the armed timer fires.
	pub fn remaining(&self) -> Option<StdDuration> {
		self.armed.as_ref().map(|armed| armed.deadline.saturating_duration_since(Instant::now()))
	}
}
impl Drop for RefreshScheduler {
	fn drop(&mut self) {
		self.cancel();
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	use tokio::sync::oneshot;
	// self
	use super::*;

	#[test]
	fn delay_subtracts_margin() {
		let now = macros::datetime!(2026-01-01 00:00 UTC);

		assert_eq!(
			refresh_delay(now + Duration::seconds(120), Duration::seconds(60), now),
			StdDuration::from_secs(60)
		);
		assert_eq!(
			refresh_delay(now + Duration::milliseconds(90_500), Duration::seconds(30), now),
			StdDuration::from_millis(60_500)
		);
	}

	#[test]
	fn delay_clamps_at_zero() {
		let now = macros::datetime!(2026-01-01 00:00 UTC);

		assert_eq!(
			refresh_delay(now + Duration::seconds(30), Duration::seconds(60), now),
			StdDuration::ZERO
		);
		assert_eq!(refresh_delay(now - Duration::hours(1), Duration::ZERO, now), StdDuration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn fires_after_delay() {
		let mut scheduler = RefreshScheduler::default();
		let (tx, rx) = oneshot::channel();
		let started = Instant::now();

		scheduler.arm_after(3, StdDuration::from_secs(60), move || {
			let _ = tx.send(Instant::now());
		});

		assert_eq!(scheduler.armed_generation(), Some(3));
		assert_eq!(scheduler.remaining(), Some(StdDuration::from_secs(60)));

		let fired_at = rx.await.expect("Armed timer should fire.");

		assert_eq!(fired_at - started, StdDuration::from_secs(60));
	}

	#[tokio::test(start_paused = true)]
	async fn rearming_replaces_and_cancel_is_safe() {
		let mut scheduler = RefreshScheduler::default();
		let (first_tx, first_rx) = oneshot::channel::<()>();
		let (second_tx, second_rx) = oneshot::channel::<()>();

		scheduler.arm_after(1, StdDuration::from_secs(10), move || {
			let _ = first_tx.send(());
		});
		scheduler.arm_after(2, StdDuration::from_secs(20), move || {
			let _ = second_tx.send(());
		});

		assert_eq!(scheduler.armed_generation(), Some(2));
		// The replaced timer was aborted, dropping its sender.
		assert!(first_rx.await.is_err());

		second_rx.await.expect("Replacement timer should fire.");

		assert!(scheduler.cancel());
		assert!(!scheduler.cancel());
		assert_eq!(scheduler.remaining(), None);
	}

	#[tokio::test(start_paused = true)]
	async fn arm_uses_token_expiry() {
		let mut scheduler = RefreshScheduler::default();
		let claims = TokenClaims {
			user_id: crate::auth::UserId::new("user").expect("User fixture should be valid."),
			expires_at: OffsetDateTime::now_utc() + Duration::seconds(120),
		};
		let delay = scheduler.arm(9, &claims, Duration::seconds(60), || {});

		assert!(delay <= StdDuration::from_secs(60));
		assert!(delay > StdDuration::from_secs(58));
	}
}
