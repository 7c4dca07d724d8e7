//! Token coordinator: single-flight acquisition, fan-out, and proactive refresh.
//!
//! [`TokenCoordinator`] is a cheap, cloneable handle onto a session actor spawned on the Tokio
//! runtime. The actor is the only place the session mutates; the handle sends it commands over
//! an unbounded channel, so calls such as [`TokenCoordinator::reset`] never block and are
//! observed in the order they were made.
//!
//! Each session round pairs a [`DeferredResult`] with a generation number. A fetch captures the
//! round it was started for and, on completion, resolves exactly that round. The refresh timer
//! is only re-armed when the completed round is still the live one, so a fetch that was
//! superseded by [`TokenCoordinator::reset`] can neither resolve the new round nor schedule a
//! refresh for an abandoned session.

pub mod deferred;
pub mod listener;
pub mod scheduler;

mod metrics;
mod session;

pub use deferred::*;
pub use listener::*;
pub use metrics::CoordinatorMetrics;
pub use scheduler::*;
pub use session::SessionSnapshot;

// crates.io
use tokio::sync::{
	mpsc::{self, UnboundedSender},
	oneshot,
};
// self
use crate::{
	_prelude::*,
	auth::TokenState,
	config::CoordinatorConfig,
	coordinator::session::{Command, Session},
	provider::CredentialProvider,
};

/// Handle onto a running token coordinator.
///
/// Dropping every clone of the handle stops the actor, cancels the refresh timer, and resolves
/// any pending round with [`Error::Closed`].
#[derive(Clone)]
pub struct TokenCoordinator {
	commands: UnboundedSender<Command>,
	registry: Arc<ListenerRegistry>,
	metrics: Arc<CoordinatorMetrics>,
}
impl TokenCoordinator {
	/// Spawns the session actor and returns a handle to it.
	///
	/// # Panics
	///
	/// Panics when called outside of a Tokio runtime.
	pub fn new(config: CoordinatorConfig, provider: Arc<dyn CredentialProvider>) -> Self {
		let (commands, receiver) = mpsc::unbounded_channel();
		let registry = Arc::new(ListenerRegistry::new());
		let metrics = Arc::<CoordinatorMetrics>::default();
		let session = Session::new(
			config,
			provider,
			registry.clone(),
			metrics.clone(),
			commands.downgrade(),
		);

		tokio::spawn(session.run(receiver));

		Self { commands, registry, metrics }
	}

	/// Returns a future resolving to the state of the round that is live right now.
	///
	/// The round is captured when this method is called, not when the future is first polled:
	/// a [`reset`](Self::reset) issued afterwards does not change what the future resolves to.
	/// The future never fails; errors arrive as [`TokenState::failed`].
	pub fn get_token(&self) -> impl Future<Output = TokenState> + Send + 'static {
		let (reply, round) = oneshot::channel();
		let sent = self.commands.send(Command::CurrentRound { reply }).is_ok();

		async move {
			if !sent {
				return TokenState::failed(Error::Closed);
			}

			match round.await {
				Ok(round) => round.wait().await,
				Err(_) => TokenState::failed(Error::Closed),
			}
		}
	}

	/// Discards the current round so the next update starts from scratch.
	///
	/// Cancels the refresh timer and clears the in-flight flag. Listeners are not notified.
	/// Call this before any flow that must bypass a cached or failed result, such as an
	/// interactive login.
	pub fn reset(&self) {
		self.send(Command::Reset);
	}

	/// Signals that the identity-provider client finished loading.
	pub fn notify_provider_ready(&self) {
		self.send(Command::ProviderReady);
	}

	/// Swaps the credential provider used by subsequent fetches.
	pub fn replace_provider(&self, provider: Arc<dyn CredentialProvider>) {
		self.send(Command::ReplaceProvider { provider });
	}

	/// Subscribes `listener`, replaying the latest state to it immediately if one exists.
	pub fn subscribe<F>(&self, listener: F) -> ListenerHandle
	where
		F: 'static + Send + Sync + Fn(&TokenState),
	{
		self.registry.subscribe(Arc::new(listener))
	}

	/// Removes a listener. Returns `false` if it was already removed.
	pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
		self.registry.unsubscribe(handle)
	}

	/// Latest published state, or [`TokenState::loading`] before the first publication.
	pub fn state(&self) -> TokenState {
		self.registry.latest().unwrap_or_else(TokenState::loading)
	}

	/// Shared round counters.
	pub fn metrics(&self) -> Arc<CoordinatorMetrics> {
		self.metrics.clone()
	}

	/// Reads the session state; `None` once the coordinator has stopped.
	pub async fn session_snapshot(&self) -> Option<SessionSnapshot> {
		let (reply, snapshot) = oneshot::channel();

		self.commands.send(Command::Snapshot { reply }).ok()?;

		snapshot.await.ok()
	}

	/// Stops the actor. Pending and later [`get_token`](Self::get_token) calls resolve with
	/// [`Error::Closed`].
	pub fn shutdown(&self) {
		self.send(Command::Shutdown);
	}

	/// Returns `true` once the actor has stopped.
	pub fn is_closed(&self) -> bool {
		self.commands.is_closed()
	}

	fn send(&self, command: Command) {
		if self.commands.send(command).is_err() {
			trace_event!(debug, "token coordinator already stopped; command dropped");
		}
	}
}
impl Debug for TokenCoordinator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenCoordinator")
			.field("state", &self.state().status())
			.field("listeners", &self.registry.len())
			.field("closed", &self.is_closed())
			.finish()
	}
}
