//! Response cache keyed by call fingerprint.
//!
//! [`MemoryResponseCache`] uses [`DashMap`] so concurrent handlers can read and
//! write without a global lock. Entries are content-addressed, so two writers
//! storing the same fingerprint is an idempotent overwrite.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use portal_protocol::ResultEnvelope;

/// Key/value store with per-entry time-to-live.
pub trait ResponseCache: Send + Sync {
	/// Returns the cached envelope for `key` if present and unexpired.
	fn get(&self, key: &str) -> Option<ResultEnvelope>;

	/// Stores `envelope` under `key` for `ttl`.
	fn set(&self, key: &str, envelope: ResultEnvelope, ttl: Duration);
}

/// Inserts between sweeps of expired entries.
const PURGE_INTERVAL: usize = 256;

struct CacheEntry {
	envelope: ResultEnvelope,
	expires_at: Instant,
}

/// Thread-safe in-memory [`ResponseCache`].
#[derive(Default)]
pub struct MemoryResponseCache {
	entries: DashMap<String, CacheEntry>,
	inserts: AtomicUsize,
}

impl MemoryResponseCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of stored entries, expired ones included until they are purged.
	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	/// Drops every expired entry.
	pub fn purge_expired(&self) {
		let now = Instant::now();
		self.entries.retain(|_, entry| entry.expires_at > now);
	}

	pub fn clear(&self) {
		self.entries.clear();
	}
}

impl ResponseCache for MemoryResponseCache {
	fn get(&self, key: &str) -> Option<ResultEnvelope> {
		let now = Instant::now();
		if let Some(entry) = self.entries.get(key) {
			if entry.expires_at > now {
				return Some(entry.envelope.clone());
			}
		}
		// Read guard is released above; removing here cannot deadlock.
		self.entries.remove_if(key, |_, entry| entry.expires_at <= now);
		None
	}

	fn set(&self, key: &str, envelope: ResultEnvelope, ttl: Duration) {
		self.entries.insert(
			key.to_string(),
			CacheEntry {
				envelope,
				expires_at: Instant::now() + ttl,
			},
		);
		// Fingerprints that are never read again would otherwise live forever.
		if (self.inserts.fetch_add(1, Ordering::Relaxed) + 1) % PURGE_INTERVAL == 0 {
			self.purge_expired();
		}
	}
}
