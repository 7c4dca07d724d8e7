//! Ordered listener registry with replay-on-join and per-callback isolation.

// std
use std::{
	panic::{self, AssertUnwindSafe},
	sync::atomic::{AtomicU64, Ordering},
};
// crates.io
use parking_lot::ReentrantMutex;
// self
use crate::{_prelude::*, auth::TokenState};

/// Callback invoked with every published state.
pub type Listener = Arc<dyn Fn(&TokenState) + Send + Sync>;

/// Subscription handle returned by [`ListenerRegistry::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ListenerHandle(u64);

/// Subscriber set notified synchronously, in subscription order, whenever state changes.
///
/// The registry also remembers the latest published state so late subscribers receive it
/// immediately. Deliveries are serialized through a re-entrant lock: a callback may subscribe
/// or unsubscribe from inside a delivery without deadlocking, and two threads never interleave
/// their deliveries.
pub struct ListenerRegistry {
	delivery: ReentrantMutex<()>,
	inner: Mutex<RegistryInner>,
	panicked: AtomicU64,
}
#[derive(Default)]
struct RegistryInner {
	next_id: u64,
	listeners: BTreeMap<u64, Listener>,
	latest: Option<TokenState>,
}
impl ListenerRegistry {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self {
			delivery: ReentrantMutex::new(()),
			inner: Mutex::new(RegistryInner::default()),
			panicked: AtomicU64::new(0),
		}
	}

	/// Registers `listener`, replaying the latest state to it if one exists.
	pub fn subscribe(&self, listener: Listener) -> ListenerHandle {
		let _delivery = self.delivery.lock();
		let (handle, replay) = {
			let mut inner = self.inner.lock();
			let id = inner.next_id;

			inner.next_id += 1;
			inner.listeners.insert(id, listener.clone());

			(ListenerHandle(id), inner.latest.clone())
		};

		if let Some(state) = replay {
			self.deliver(handle, &listener, &state);
		}

		handle
	}

	/// Removes a listener. Returns `false` if it was already gone.
	pub fn unsubscribe(&self, handle: ListenerHandle) -> bool {
		self.inner.lock().listeners.remove(&handle.0).is_some()
	}

	/// Stores `state` as the latest and delivers it to every listener registered right now.
	pub fn publish(&self, state: &TokenState) {
		let _delivery = self.delivery.lock();
		let listeners = {
			let mut inner = self.inner.lock();

			inner.latest = Some(state.clone());
			inner
				.listeners
				.iter()
				.map(|(id, listener)| (ListenerHandle(*id), listener.clone()))
				.collect::<Vec<_>>()
		};

		for (handle, listener) in listeners {
			self.deliver(handle, &listener, state);
		}
	}

	/// Latest published state.
	pub fn latest(&self) -> Option<TokenState> {
		self.inner.lock().latest.clone()
	}

	/// Number of registered listeners.
	pub fn len(&self) -> usize {
		self.inner.lock().listeners.len()
	}

	/// Returns `true` when nobody is subscribed.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Number of deliveries that panicked and were isolated.
	pub fn panicked_deliveries(&self) -> u64 {
		self.panicked.load(Ordering::Relaxed)
	}

	#[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
	fn deliver(&self, handle: ListenerHandle, listener: &Listener, state: &TokenState) {
		if panic::catch_unwind(AssertUnwindSafe(|| listener(state))).is_err() {
			self.panicked.fetch_add(1, Ordering::Relaxed);

			trace_event!(warn, listener = handle.0, "listener panicked; continuing delivery");
		}
	}
}
impl Default for ListenerRegistry {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for ListenerRegistry {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ListenerRegistry").field("listeners", &self.len()).finish()
	}
}
