//! Persistent settings consumed by the client.
//!
//! The store is process-external in production (a JSON file, a settings
//! table) so that concurrent handlers converge on one session. Reads are
//! assumed soon-consistent, not linearizable.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::error::Result;

/// Keys read and written by the client.
pub mod keys {
	/// Default access point for calls that do not name one.
	pub const ACCESS_POINT_GUID: &str = "accesspoint-guid";
	pub const EMAIL: &str = "email";
	pub const PASSWORD: &str = "password";
	/// Current session identifier.
	pub const SESSION_GUID: &str = "session-guid";
	/// Unix seconds of the last session create or renewal.
	pub const SESSION_UPDATED: &str = "session-updated";
}

/// Key/value store with nullable values.
pub trait SettingsStore: Send + Sync {
	/// Returns the value for `key`, or `None` when unset.
	fn get(&self, key: &str) -> Result<Option<String>>;

	/// Sets `key` to `value`; `None` clears it.
	fn set(&self, key: &str, value: Option<&str>) -> Result<()>;

	/// Returns the value for `key` unless it is unset or empty.
	fn get_non_empty(&self, key: &str) -> Result<Option<String>> {
		Ok(self.get(key)?.filter(|v| !v.is_empty()))
	}
}

/// In-process [`SettingsStore`].
#[derive(Debug, Default)]
pub struct MemorySettings {
	values: Mutex<HashMap<String, String>>,
}

impl MemorySettings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builder-style insert.
	pub fn with(self, key: &str, value: impl Into<String>) -> Self {
		self.values.lock().insert(key.to_string(), value.into());
		self
	}
}

impl SettingsStore for MemorySettings {
	fn get(&self, key: &str) -> Result<Option<String>> {
		Ok(self.values.lock().get(key).cloned())
	}

	fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
		let mut values = self.values.lock();
		match value {
			Some(value) => values.insert(key.to_string(), value.to_string()),
			None => values.remove(key),
		};
		Ok(())
	}
}
