//! Call-returned notifications.
//!
//! Observers are fire-and-forget: they run synchronously after each call
//! returns and cannot affect its result. Storage is an [`IndexMap`] keyed by
//! [`ObserverId`] so removal is O(1) and notification order is stable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::Mutex;
use portal_protocol::{Parameters, ResultEnvelope};

/// Unique identifier for a registered observer.
pub type ObserverId = u64;

static NEXT_OBSERVER_ID: AtomicU64 = AtomicU64::new(1);

/// Emitted after every successful call, cached or not.
#[derive(Debug, Clone)]
pub struct CallEvent {
	pub path: String,
	pub method: String,
	/// Parameters as actually sent, after defaulting.
	pub parameters: Parameters,
	pub response: ResultEnvelope,
	/// Wall-clock time of the network round trips, retry included; zero for cache hits.
	pub duration: Duration,
	pub cached: bool,
}

/// Receives [`CallEvent`]s.
pub trait CallObserver: Send + Sync {
	fn on_call_returned(&self, event: &CallEvent);
}

impl<F> CallObserver for F
where
	F: Fn(&CallEvent) + Send + Sync,
{
	fn on_call_returned(&self, event: &CallEvent) {
		self(event)
	}
}

#[derive(Default)]
pub(crate) struct ObserverRegistry {
	observers: Mutex<IndexMap<ObserverId, Arc<dyn CallObserver>>>,
}

impl ObserverRegistry {
	pub(crate) fn add(&self, observer: Arc<dyn CallObserver>) -> ObserverId {
		let id = NEXT_OBSERVER_ID.fetch_add(1, Ordering::SeqCst);
		self.observers.lock().insert(id, observer);
		id
	}

	pub(crate) fn remove(&self, id: ObserverId) -> bool {
		self.observers.lock().shift_remove(&id).is_some()
	}

	pub(crate) fn emit(&self, event: &CallEvent) {
		// Snapshot so observers may (un)register without deadlocking.
		let observers: Vec<_> = self.observers.lock().values().cloned().collect();
		for observer in observers {
			observer.on_call_returned(event);
		}
	}
}
