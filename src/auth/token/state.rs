//! Immutable token state published to listeners and awaiters.

// self
use crate::{
	_prelude::*,
	auth::{TokenClaims, TokenSecret, UserId},
};

/// Lifecycle status derived from a [`TokenState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenStatus {
	/// Provider has not reported readiness yet.
	Loading,
	/// Provider is ready but no user is signed in.
	Unauthenticated,
	/// A token and its claims are available.
	Authenticated,
	/// The last fetch round failed.
	Failed,
}
impl TokenStatus {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Self::Loading => "loading",
			Self::Unauthenticated => "unauthenticated",
			Self::Authenticated => "authenticated",
			Self::Failed => "failed",
		}
	}
}
impl Display for TokenStatus {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Snapshot of the coordinator's authoritative token state.
///
/// Exactly one of {token, error, neither} holds. The fields are private so the only way to
/// build a state is through the named constructors, which keep that invariant.
#[derive(Clone, Default)]
pub struct TokenState {
	loading: bool,
	token: Option<TokenSecret>,
	claims: Option<TokenClaims>,
	error: Option<Arc<Error>>,
}
impl TokenState {
	/// State observed before the provider reports readiness.
	pub fn loading() -> Self {
		Self { loading: true, ..Default::default() }
	}

	/// Provider is ready and no user is signed in.
	pub fn unauthenticated() -> Self {
		Self::default()
	}

	/// Successful fetch with decoded claims.
	pub fn authenticated(token: TokenSecret, claims: TokenClaims) -> Self {
		Self { token: Some(token), claims: Some(claims), ..Default::default() }
	}

	/// Failed fetch round.
	pub fn failed(error: impl Into<Arc<Error>>) -> Self {
		Self { error: Some(error.into()), ..Default::default() }
	}

	/// Returns the lifecycle status for this state.
	pub fn status(&self) -> TokenStatus {
		if self.loading {
			TokenStatus::Loading
		} else if self.error.is_some() {
			TokenStatus::Failed
		} else if self.token.is_some() {
			TokenStatus::Authenticated
		} else {
			TokenStatus::Unauthenticated
		}
	}

	/// Returns `true` while the provider is still loading.
	pub fn is_loading(&self) -> bool {
		self.loading
	}

	/// Bearer token, if authenticated.
	pub fn token(&self) -> Option<&TokenSecret> {
		self.token.as_ref()
	}

	/// Decoded claims, if authenticated.
	pub fn claims(&self) -> Option<&TokenClaims> {
		self.claims.as_ref()
	}

	/// Shortcut for the decoded user identifier.
	pub fn user_id(&self) -> Option<&UserId> {
		self.claims.as_ref().map(|claims| &claims.user_id)
	}

	/// Failure recorded for the round, if any.
	pub fn error(&self) -> Option<&Arc<Error>> {
		self.error.as_ref()
	}

	/// `Authorization` header value, if authenticated.
	pub fn authorization_header(&self) -> Option<String> {
		self.token.as_ref().map(TokenSecret::bearer)
	}
}
impl Debug for TokenState {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenState")
			.field("status", &self.status())
			.field("token", &self.token.as_ref().map(|_| "<redacted>"))
			.field("claims", &self.claims)
			.field("error", &self.error.as_ref().map(|e| e.to_string()))
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// crates.io
	use time::macros;
	// self
	use super::*;

	fn claims() -> TokenClaims {
		TokenClaims {
			user_id: UserId::new("user-1").expect("User fixture should be valid."),
			expires_at: macros::datetime!(2026-01-01 00:00 UTC),
		}
	}

	#[test]
	fn constructors_map_to_statuses() {
		assert_eq!(TokenState::loading().status(), TokenStatus::Loading);
		assert_eq!(TokenState::unauthenticated().status(), TokenStatus::Unauthenticated);
		assert_eq!(TokenState::failed(Error::Closed).status(), TokenStatus::Failed);

		let state = TokenState::authenticated(TokenSecret::new("a.b.c"), claims());

		assert_eq!(state.status(), TokenStatus::Authenticated);
		assert_eq!(state.user_id().map(|id| id.as_ref()), Some("user-1"));
		assert_eq!(state.authorization_header().as_deref(), Some("Bearer a.b.c"));
		assert!(state.error().is_none());
	}

	#[test]
	fn unauthenticated_state_is_empty() {
		let state = TokenState::unauthenticated();

		assert!(!state.is_loading());
		assert!(state.token().is_none());
		assert!(state.claims().is_none());
		assert!(state.error().is_none());
		assert!(state.authorization_header().is_none());
	}

	#[test]
	fn debug_redacts_token() {
		let state = TokenState::authenticated(TokenSecret::new("secret-token"), claims());
		let rendered = format!("{state:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("secret-token"));
	}
}
