//! Single-resolution result shared by every awaiter of one round.

// crates.io
use async_lock::OnceCell;
// self
use crate::{_prelude::*, auth::TokenState};

/// One round of the session: a generation number plus the cell its awaiters wait on.
///
/// The generation is what the coordinator compares when a fetch completes, so a round that
/// was superseded by a reset can still resolve its own awaiters without touching the live one.
#[derive(Clone)]
pub struct DeferredResult {
	generation: u64,
	cell: Arc<OnceCell<TokenState>>,
}
impl DeferredResult {
	/// Creates an unresolved round.
	pub fn new(generation: u64) -> Self {
		Self { generation, cell: Arc::new(OnceCell::new()) }
	}

	/// Round generation.
	pub fn generation(&self) -> u64 {
		self.generation
	}

	/// Whether a state was already delivered.
	pub fn is_resolved(&self) -> bool {
		self.cell.is_initialized()
	}

	/// Resolved state, if any.
	pub fn peek(&self) -> Option<&TokenState> {
		self.cell.get()
	}

	/// Resolves the round. Returns `false` (and drops `state`) if it was already resolved.
	pub async fn resolve(&self, state: TokenState) -> bool {
		self.cell.set(state).await.is_ok()
	}

	/// Waits for the round to resolve.
	pub async fn wait(&self) -> TokenState {
		self.cell.wait().await.clone()
	}
}
impl Debug for DeferredResult {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("DeferredResult")
			.field("generation", &self.generation)
			.field("resolved", &self.is_resolved())
			.finish()
	}
}
