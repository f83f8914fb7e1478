//! Client tuning knobs.

use std::time::Duration;

/// How long a session stays valid without renewal.
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(18 * 60);

/// How long a successful response stays cached.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(2 * 60 * 60);

/// Message fragment the service uses for an invalid or expired session.
pub const DEFAULT_SESSION_EXPIRY_SIGNATURE: &str = "SessionGUID is invalid or has expired";

/// Options shared by the session manager and the dispatcher.
#[derive(Debug, Clone)]
pub struct ClientOptions {
	pub session_timeout: Duration,
	pub cache_ttl: Duration,
	/// Whether successful responses are cached and served from cache.
	pub cache_responses: bool,
	/// Section names checked after the standard ones, in order.
	pub extra_sections: Vec<String>,
	pub session_expiry_signature: String,
}

impl Default for ClientOptions {
	fn default() -> Self {
		Self {
			session_timeout: DEFAULT_SESSION_TIMEOUT,
			cache_ttl: DEFAULT_CACHE_TTL,
			cache_responses: true,
			extra_sections: Vec::new(),
			session_expiry_signature: DEFAULT_SESSION_EXPIRY_SIGNATURE.to_string(),
		}
	}
}

impl ClientOptions {
	pub fn with_session_timeout(mut self, timeout: Duration) -> Self {
		self.session_timeout = timeout;
		self
	}

	pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
		self.cache_ttl = ttl;
		self
	}

	pub fn with_cache_responses(mut self, enabled: bool) -> Self {
		self.cache_responses = enabled;
		self
	}

	/// Registers an additional section name to classify.
	pub fn with_section(mut self, name: impl Into<String>) -> Self {
		self.extra_sections.push(name.into());
		self
	}
}
