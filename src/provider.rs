//! Credential provider contract consumed by the coordinator.
//!
//! The identity-provider client (popup login, silent iframe renewal, device flow, ...) lives
//! outside this crate. Hosts wrap it in a [`CredentialProvider`] so the coordinator can ask
//! whether the client is ready, whether a user is signed in, and for a raw bearer token.

// crates.io
use tokio::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::TokenSecret,
	obs::{self, FetchOutcome, FetchSource, FetchTrigger},
};

/// Boxed future returned by [`CredentialProvider`] fetch calls.
pub type ProviderFuture<'a, T> =
	Pin<Box<dyn Future<Output = Result<T, ProviderError>> + 'a + Send>>;

/// Adapter over the identity-provider client.
pub trait CredentialProvider
where
	Self: Send + Sync,
{
	/// Whether the underlying client finished its own initialization.
	fn is_ready(&self) -> bool;

	/// Whether a user session exists with the identity provider.
	fn is_authenticated(&self) -> bool;

	/// Acquires a token without user interaction. `refresh` bypasses the client's cache.
	fn fetch_silently(&self, refresh: bool) -> ProviderFuture<'_, String>;

	/// Acquires a token through a user-facing prompt; used only as a fallback.
	fn fetch_interactively(&self, refresh: bool) -> ProviderFuture<'_, String>;
}

/// Failures reported by a [`CredentialProvider`].
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ProviderError {
	/// Silent acquisition needs the user to sign in again.
	#[error("Silent authentication requires user interaction.")]
	SilentAuthRequired,
	/// Silent acquisition needs the user to grant consent.
	#[error("User consent is required.")]
	ConsentRequired,
	/// Any other provider failure.
	#[error("{message}")]
	Other {
		/// Provider-supplied description.
		message: String,
	},
}
impl ProviderError {
	/// Builds an [`ProviderError::Other`] from any message.
	pub fn other(message: impl Into<String>) -> Self {
		Self::Other { message: message.into() }
	}

	/// Returns `true` when the failure is recoverable through an interactive fetch.
	pub fn requires_interaction(&self) -> bool {
		matches!(self, Self::SilentAuthRequired | Self::ConsentRequired)
	}
}

/// Fetches a token: silently first, then interactively when the silent path needs the user.
///
/// Failures other than [`ProviderError::SilentAuthRequired`] and
/// [`ProviderError::ConsentRequired`] propagate without fallback.
pub async fn fetch_token(
	provider: &dyn CredentialProvider,
	refresh: bool,
) -> Result<(TokenSecret, FetchSource), ProviderError> {
	let trigger = FetchTrigger::from_refresh(refresh);
	let silent_err =
		match observe(FetchSource::Silent, trigger, provider.fetch_silently(refresh)).await {
			Ok(token) => return Ok((TokenSecret::new(token), FetchSource::Silent)),
			Err(e) => e,
		};

	if !silent_err.requires_interaction() {
		return Err(silent_err);
	}

	trace_event!(debug, error = %silent_err, "silent fetch needs interaction, falling back");

	let token =
		observe(FetchSource::Interactive, trigger, provider.fetch_interactively(refresh)).await?;

	Ok((TokenSecret::new(token), FetchSource::Interactive))
}

async fn observe(
	source: FetchSource,
	trigger: FetchTrigger,
	call: ProviderFuture<'_, String>,
) -> Result<String, ProviderError> {
	obs::record_fetch_outcome(source, FetchOutcome::Attempt, trigger);

	let started = Instant::now();
	let result = call.await;
	let outcome = if result.is_ok() { FetchOutcome::Success } else { FetchOutcome::Failure };

	obs::record_fetch_outcome(source, outcome, trigger);
	obs::record_fetch_latency(source, outcome, started.elapsed());

	result
}
