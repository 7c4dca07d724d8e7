//! Coordinator-level error types shared across the provider adapter, claim decoding, and
//! configuration.

// self
use crate::{_prelude::*, auth::TokenDecodeError, provider::ProviderError};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Canonical coordinator error carried by [`TokenState::error`](crate::TokenState::error).
#[derive(Debug, ThisError)]
pub enum Error {
	/// Credential provider failed and no fallback applied.
	#[error("Credential provider failed: {0}")]
	Provider(
		#[from]
		#[source]
		ProviderError,
	),
	/// Fetched token could not be decoded into the expected claims.
	#[error("Fetched token is malformed.")]
	MalformedToken(
		#[from]
		#[source]
		TokenDecodeError,
	),

	/// Provider did not answer within the configured fetch timeout.
	#[error("Credential provider did not respond within {timeout:?}.")]
	FetchTimeout {
		/// Timeout that elapsed.
		timeout: std::time::Duration,
	},
	/// Coordinator task has stopped and can no longer produce tokens.
	#[error("Token coordinator has shut down.")]
	Closed,
}
impl Error {
	/// Returns `true` when the failure came from a malformed token rather than the provider.
	pub fn is_malformed_token(&self) -> bool {
		matches!(self, Self::MalformedToken(_))
	}
}

/// Validation failures returned by [`CoordinatorConfigBuilder::build`]; never carried by a
/// [`TokenState`](crate::TokenState).
///
/// [`CoordinatorConfigBuilder::build`]: crate::config::CoordinatorConfigBuilder::build
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ConfigError {
	/// Refresh margin must not be negative.
	#[error("Refresh margin must not be negative, got {margin}.")]
	NegativeRefreshMargin {
		/// Rejected margin.
		margin: Duration,
	},
	/// User identifier claim key must not be empty.
	#[error("User identifier claim key cannot be empty.")]
	EmptyUserIdClaim,
	/// Fetch timeout must be non-zero when set.
	#[error("Fetch timeout must be greater than zero.")]
	ZeroFetchTimeout,
}
