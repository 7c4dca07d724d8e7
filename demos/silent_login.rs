//! Demonstrates wiring an in-process credential provider into the coordinator, awaiting the
//! first token from several callers at once, and watching a proactive refresh land.

// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicU32, Ordering},
	},
	time::Duration as StdDuration,
};
// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use color_eyre::Result;
use serde_json::json;
use time::{Duration, OffsetDateTime};
// self
use token_coordinator::{
	CoordinatorConfig, CredentialProvider, TokenCoordinator, TokenState, provider::ProviderFuture,
};

/// Mints short-lived tokens locally in place of a real identity-provider client.
struct LocalProvider {
	issued: AtomicU32,
}
impl LocalProvider {
	fn mint(&self) -> String {
		let serial = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
		let exp = (OffsetDateTime::now_utc() + Duration::seconds(3)).unix_timestamp();
		let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none"}"#);
		let claims = json!({ "sub": "demo-user", "exp": exp, "serial": serial });
		let payload = URL_SAFE_NO_PAD.encode(claims.to_string());

		format!("{header}.{payload}.")
	}
}
impl CredentialProvider for LocalProvider {
	fn is_ready(&self) -> bool {
		true
	}

	fn is_authenticated(&self) -> bool {
		true
	}

	fn fetch_silently(&self, _refresh: bool) -> ProviderFuture<'_, String> {
		Box::pin(async move {
			tokio::time::sleep(StdDuration::from_millis(50)).await;

			Ok(self.mint())
		})
	}

	fn fetch_interactively(&self, refresh: bool) -> ProviderFuture<'_, String> {
		self.fetch_silently(refresh)
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = CoordinatorConfig::builder().refresh_margin(Duration::seconds(1)).build()?;
	let provider = Arc::new(LocalProvider { issued: AtomicU32::new(0) });
	let coordinator = TokenCoordinator::new(config, provider.clone());

	coordinator.subscribe(|state: &TokenState| {
		println!("Listener observed {} for {:?}.", state.status(), state.user_id());
	});

	let waiters = (0..3).map(|_| coordinator.get_token()).collect::<Vec<_>>();

	coordinator.notify_provider_ready();

	for state in join_all(waiters).await {
		println!("Caller received {:?}.", state.authorization_header().map(|h| h.len()));
	}

	// The token expires after three seconds; the refresh fires one second before that.
	tokio::time::sleep(StdDuration::from_millis(2_500)).await;

	println!(
		"Issued {} tokens across {} fetches.",
		provider.issued.load(Ordering::SeqCst),
		coordinator.metrics().fetches()
	);

	coordinator.shutdown();

	Ok(())
}

async fn join_all<F>(futures: Vec<F>) -> Vec<F::Output>
where
	F: 'static + Send + Future,
	F::Output: 'static + Send,
{
	let handles = futures.into_iter().map(tokio::spawn).collect::<Vec<_>>();
	let mut outputs = Vec::with_capacity(handles.len());

	for handle in handles {
		if let Ok(output) = handle.await {
			outputs.push(output);
		}
	}

	outputs
}
