//! Scripted credential provider and token fixtures shared by the integration tests.

#![allow(dead_code)]

// std
use std::{
	collections::VecDeque,
	sync::atomic::{AtomicBool, Ordering},
};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use parking_lot::Mutex;
use serde_json::json;
use time::OffsetDateTime;
use tokio::sync::{oneshot, watch};
// self
use token_coordinator::{
	CoordinatorConfig, CredentialProvider, ProviderError, TokenCoordinator,
	provider::ProviderFuture,
};

pub const USER_CLAIM: &str = "https://example.com/user_id";

/// Provider call recorded by [`MockProvider`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Call {
	Silent { refresh: bool },
	Interactive { refresh: bool },
}

/// Scripted response for one provider call.
pub enum Reply {
	Token(String),
	Fail(ProviderError),
	/// Completes when the paired [`Gate`] is opened.
	Gated(oneshot::Receiver<Result<String, ProviderError>>),
}

/// Sender half of a [`Reply::Gated`] response.
pub struct Gate(oneshot::Sender<Result<String, ProviderError>>);
impl Gate {
	pub fn open(self, result: Result<String, ProviderError>) {
		let _ = self.0.send(result);
	}
}

pub fn gated() -> (Gate, Reply) {
	let (tx, rx) = oneshot::channel();

	(Gate(tx), Reply::Gated(rx))
}

pub struct MockProvider {
	ready: AtomicBool,
	authenticated: AtomicBool,
	silent: Mutex<VecDeque<Reply>>,
	interactive: Mutex<VecDeque<Reply>>,
	calls: Mutex<Vec<Call>>,
	call_count: watch::Sender<usize>,
}
impl MockProvider {
	pub fn new(ready: bool, authenticated: bool) -> Self {
		Self {
			ready: AtomicBool::new(ready),
			authenticated: AtomicBool::new(authenticated),
			silent: Mutex::default(),
			interactive: Mutex::default(),
			calls: Mutex::default(),
			call_count: watch::Sender::new(0),
		}
	}

	pub fn set_ready(&self, ready: bool) {
		self.ready.store(ready, Ordering::SeqCst);
	}

	pub fn set_authenticated(&self, authenticated: bool) {
		self.authenticated.store(authenticated, Ordering::SeqCst);
	}

	pub fn push_silent(&self, reply: Reply) {
		self.silent.lock().push_back(reply);
	}

	pub fn push_interactive(&self, reply: Reply) {
		self.interactive.lock().push_back(reply);
	}

	pub fn calls(&self) -> Vec<Call> {
		self.calls.lock().clone()
	}

	/// Waits until at least `n` provider calls were made.
	pub async fn wait_for_calls(&self, n: usize) {
		let mut rx = self.call_count.subscribe();

		rx.wait_for(|count| *count >= n).await.expect("Call counter should stay open.");
	}

	fn respond(&self, call: Call, queue: &Mutex<VecDeque<Reply>>) -> ProviderFuture<'_, String> {
		self.calls.lock().push(call);
		self.call_count.send_modify(|count| *count += 1);

		let reply = queue.lock().pop_front();

		Box::pin(async move {
			match reply {
				Some(Reply::Token(token)) => Ok(token),
				Some(Reply::Fail(e)) => Err(e),
				Some(Reply::Gated(rx)) =>
					rx.await.unwrap_or_else(|_| Err(ProviderError::other("gate dropped"))),
				None => Err(ProviderError::other(format!("unscripted {call:?}"))),
			}
		})
	}
}
impl CredentialProvider for MockProvider {
	fn is_ready(&self) -> bool {
		self.ready.load(Ordering::SeqCst)
	}

	fn is_authenticated(&self) -> bool {
		self.authenticated.load(Ordering::SeqCst)
	}

	fn fetch_silently(&self, refresh: bool) -> ProviderFuture<'_, String> {
		self.respond(Call::Silent { refresh }, &self.silent)
	}

	fn fetch_interactively(&self, refresh: bool) -> ProviderFuture<'_, String> {
		self.respond(Call::Interactive { refresh }, &self.interactive)
	}
}

/// Builds a compact JWS for `user` expiring `expires_in` seconds from now.
pub fn jwt(user: &str, expires_in: i64) -> String {
	let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
	let exp = OffsetDateTime::now_utc().unix_timestamp() + expires_in;
	let mut claims = json!({ "exp": exp, "iss": "https://idp.example.com/" });

	claims[USER_CLAIM] = user.into();

	let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

	format!("{header}.{payload}.c2lnbmF0dXJl")
}

pub fn config() -> CoordinatorConfig {
	CoordinatorConfig::builder()
		.user_id_claim(USER_CLAIM)
		.build()
		.expect("Test configuration should validate.")
}

pub fn coordinator(provider: &std::sync::Arc<MockProvider>) -> TokenCoordinator {
	TokenCoordinator::new(config(), provider.clone())
}
