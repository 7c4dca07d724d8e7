//! The actor that owns the session and serializes every state transition.

// std
use std::time::Duration as StdDuration;
// crates.io
use tokio::sync::{
	mpsc::{UnboundedReceiver, WeakUnboundedSender},
	oneshot,
};
// self
use crate::{
	_prelude::*,
	auth::{TokenClaims, TokenSecret, TokenState},
	config::CoordinatorConfig,
	coordinator::{CoordinatorMetrics, DeferredResult, ListenerRegistry, RefreshScheduler},
	obs::{FetchSource, FetchSpan},
	provider::{self, CredentialProvider},
};

pub(crate) type FetchOutcome = Result<(TokenSecret, FetchSource)>;

/// Requests processed by the session actor, in arrival order.
pub(crate) enum Command {
	ProviderReady,
	Refresh { generation: u64 },
	Reset,
	CurrentRound { reply: oneshot::Sender<DeferredResult> },
	ReplaceProvider { provider: Arc<dyn CredentialProvider> },
	Snapshot { reply: oneshot::Sender<SessionSnapshot> },
	Completed { round: DeferredResult, outcome: FetchOutcome },
	Shutdown,
}

/// Point-in-time view of the session, for diagnostics and tests.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
	/// Generation of the live round.
	pub round: u64,
	/// Whether the live round already resolved.
	pub resolved: bool,
	/// Whether a fetch was requested for the live round.
	pub fetch_requested: bool,
	/// Time left until the armed refresh fires, if one is armed.
	pub refresh_in: Option<StdDuration>,
}

pub(crate) struct Session {
	config: CoordinatorConfig,
	provider: Arc<dyn CredentialProvider>,
	registry: Arc<ListenerRegistry>,
	metrics: Arc<CoordinatorMetrics>,
	commands: WeakUnboundedSender<Command>,
	pending: DeferredResult,
	fetch_requested: bool,
	scheduler: RefreshScheduler,
}
impl Session {
	pub(crate) fn new(
		config: CoordinatorConfig,
		provider: Arc<dyn CredentialProvider>,
		registry: Arc<ListenerRegistry>,
		metrics: Arc<CoordinatorMetrics>,
		commands: WeakUnboundedSender<Command>,
	) -> Self {
		Self {
			config,
			provider,
			registry,
			metrics,
			commands,
			pending: DeferredResult::new(1),
			fetch_requested: false,
			scheduler: RefreshScheduler::default(),
		}
	}

	/// Processes commands until shutdown or until every handle is dropped.
	pub(crate) async fn run(mut self, mut commands: UnboundedReceiver<Command>) {
		while let Some(command) = commands.recv().await {
			match command {
				Command::ProviderReady => self.update(false).await,
				Command::Refresh { generation } => self.on_timer(generation).await,
				Command::Reset => self.reset(),
				Command::CurrentRound { reply } => {
					let _ = reply.send(self.pending.clone());
				},
				Command::ReplaceProvider { provider } => self.provider = provider,
				Command::Snapshot { reply } => {
					let _ = reply.send(self.snapshot());
				},
				Command::Completed { round, outcome } => self.complete(round, outcome).await,
				Command::Shutdown => break,
			}
		}

		self.close(commands).await;
	}

	async fn update(&mut self, refresh: bool) {
		let provider = self.provider.clone();

		if !provider.is_ready() {
			trace_event!(debug, refresh, "provider not ready; update skipped");

			return;
		}
		if !provider.is_authenticated() {
			let round = self.pending.clone();

			self.publish(&round, TokenState::unauthenticated()).await;

			return;
		}
		if self.fetch_requested {
			if !refresh {
				return;
			}

			// A refresh always supersedes the current round.
			self.reset();
		}

		self.fetch_requested = true;
		self.metrics.record_fetch();

		let round = self.pending.clone();
		let commands = self.commands.clone();
		let timeout = self.config.fetch_timeout;
		let span = FetchSpan::new(round.generation(), refresh);

		tokio::spawn(span.instrument(async move {
			let fetch = provider::fetch_token(provider.as_ref(), refresh);
			let outcome = match timeout {
				Some(limit) => match tokio::time::timeout(limit, fetch).await {
					Ok(result) => result.map_err(Error::from),
					Err(_) => Err(Error::FetchTimeout { timeout: limit }),
				},
				None => fetch.await.map_err(Error::from),
			};
			let command = Command::Completed { round, outcome };
			let undelivered = match commands.upgrade() {
				Some(tx) => tx.send(command).err().map(|e| e.0),
				None => Some(command),
			};

			if let Some(Command::Completed { round, .. }) = undelivered {
				round.resolve(TokenState::failed(Error::Closed)).await;
			}
		}));
	}

	async fn on_timer(&mut self, generation: u64) {
		if self.scheduler.armed_generation() != Some(generation)
			|| self.pending.generation() != generation
		{
			trace_event!(debug, round = generation, "ignoring refresh timer from a previous round");

			return;
		}

		self.scheduler.cancel();
		self.update(true).await;
	}

	fn reset(&mut self) {
		self.scheduler.cancel();

		// An untouched round is indistinguishable from a fresh one; keeping it means earlier
		// awaiters are not stranded on a round nobody will ever resolve.
		if self.fetch_requested || self.pending.is_resolved() {
			self.pending = DeferredResult::new(self.pending.generation() + 1);
		}

		self.fetch_requested = false;
	}

	async fn complete(&mut self, round: DeferredResult, outcome: FetchOutcome) {
		let live = round.generation() == self.pending.generation();
		let decoded = outcome.and_then(|(token, source)| {
			let claims = TokenClaims::decode(token.expose(), &self.config.user_id_claim)?;

			Ok((token, claims, source))
		});

		match decoded {
			Ok((token, claims, source)) => {
				self.metrics.record_success(source);
				self.publish(&round, TokenState::authenticated(token, claims.clone())).await;

				if live {
					self.arm_refresh(&claims);
				} else {
					self.metrics.record_stale();

					trace_event!(
						debug,
						round = round.generation(),
						live = self.pending.generation(),
						"superseded round completed; refresh not armed"
					);
				}
			},
			Err(e) => {
				self.metrics.record_failure();

				trace_event!(warn, round = round.generation(), error = %e, "token fetch failed");

				if !live {
					self.metrics.record_stale();
				}

				self.publish(&round, TokenState::failed(e)).await;
			},
		}
	}

	/// Resolves `round` and notifies listeners.
	///
	/// A superseded round still reaches listeners; only scheduling is tied to the live round.
	async fn publish(&self, round: &DeferredResult, state: TokenState) {
		if !round.resolve(state.clone()).await {
			trace_event!(debug, round = round.generation(), "round already resolved");
		}
		if round.generation() != self.pending.generation() {
			trace_event!(
				debug,
				round = round.generation(),
				live = self.pending.generation(),
				"publishing superseded round"
			);
		}

		self.registry.publish(&state);
	}

	#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
	fn arm_refresh(&mut self, claims: &TokenClaims) {
		let generation = self.pending.generation();
		let commands = self.commands.clone();
		let delay =
			self.scheduler.arm(generation, claims, self.config.refresh_margin, move || {
				if let Some(tx) = commands.upgrade() {
					let _ = tx.send(Command::Refresh { generation });
				}
			});

		self.metrics.record_armed();

		if delay.is_zero() {
			self.metrics.record_immediate();

			trace_event!(
				warn,
				round = generation,
				expires_at = %claims.expires_at,
				margin = %self.config.refresh_margin,
				"token lifetime is within the refresh margin; refreshing immediately"
			);
		} else {
			trace_event!(
				debug,
				round = generation,
				delay_ms = delay.as_millis() as u64,
				"refresh armed"
			);
		}
	}

	fn snapshot(&self) -> SessionSnapshot {
		SessionSnapshot {
			round: self.pending.generation(),
			resolved: self.pending.is_resolved(),
			fetch_requested: self.fetch_requested,
			refresh_in: self.scheduler.remaining(),
		}
	}

	async fn close(mut self, mut commands: UnboundedReceiver<Command>) {
		self.scheduler.cancel();
		self.pending.resolve(TokenState::failed(Error::Closed)).await;
		commands.close();

		while let Some(command) = commands.recv().await {
			match command {
				Command::CurrentRound { reply } => {
					let _ = reply.send(self.pending.clone());
				},
				Command::Completed { round, .. } => {
					round.resolve(TokenState::failed(Error::Closed)).await;
				},
				_ => {},
			}
		}

		trace_event!(debug, round = self.pending.generation(), "token coordinator stopped");
	}
}
