//! Session lifecycle: creation, persistence, keep-alive, and forced reset.
//!
//! The identifier and its "last renewed" timestamp live in the injected
//! [`SettingsStore`], which is the source of truth across processes. The
//! in-memory copy only saves a store read per call.
//!
//! ```text
//!            create + login               timeout elapsed
//!  Absent ──────────────────▶ Active ─────────────────────▶ Stale
//!    ▲                          ▲                             │
//!    │                          └──────── renew ok ───────────┤
//!    └────── reset / renew failed / service says invalid ─────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use portal_protocol::{ResultEnvelope, section};
use portal_runtime::{Transport, TransportRequest};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::ClientOptions;
use crate::outcome::Classifier;
use crate::settings::{SettingsStore, keys};


/// Observable session state.
///
/// An invalid session is indistinguishable from an active one until the
/// service rejects it, at which point the dispatcher resets it to `Absent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
	/// No identifier in memory or storage.
	Absent,
	Active,
	/// The identifier is older than the timeout and will be renewed on next use.
	Stale,
}

/// Owns the single logical session identifier.
pub struct SessionManager {
	transport: Arc<dyn Transport>,
	settings: Arc<dyn SettingsStore>,
	classifier: Classifier,
	timeout: Duration,
	current: Mutex<Option<String>>,
}

impl SessionManager {
	pub fn new(transport: Arc<dyn Transport>, settings: Arc<dyn SettingsStore>, options: &ClientOptions) -> Self {
		Self {
			transport,
			settings,
			classifier: Classifier::new(options),
			timeout: options.session_timeout,
			current: Mutex::new(None),
		}
	}

	/// Returns a valid session identifier, creating or renewing it as needed.
	///
	/// A stored identifier is adopted without re-authenticating. A stale one is
	/// renewed in place; if renewal fails the session is recreated from scratch.
	pub async fn session_id(&self) -> Result<String> {
		let mut current = self.current.lock().await;
		self.acquire(&mut current).await
	}

	/// Forgets the current session and immediately creates a fresh one.
	pub async fn reset(&self) -> Result<String> {
		let mut current = self.current.lock().await;
		self.forget(&mut current)?;
		self.acquire(&mut current).await
	}

	/// The identifier held in memory, without touching storage or the network.
	pub async fn current(&self) -> Option<String> {
		self.current.lock().await.clone()
	}

	/// Unix seconds of the last create or renewal, if recorded.
	pub fn last_renewed(&self) -> Result<Option<u64>> {
		Ok(self
			.settings
			.get(keys::SESSION_UPDATED)?
			.and_then(|v| v.parse::<u64>().ok()))
	}

	pub async fn state(&self) -> Result<SessionState> {
		let held = self.current.lock().await.is_some();
		if !held && self.settings.get_non_empty(keys::SESSION_GUID)?.is_none() {
			return Ok(SessionState::Absent);
		}
		if self.is_stale()? {
			Ok(SessionState::Stale)
		} else {
			Ok(SessionState::Active)
		}
	}

	async fn acquire(&self, current: &mut Option<String>) -> Result<String> {
		let session_id = match current.clone() {
			Some(id) => id,
			None => {
				let id = match self.settings.get_non_empty(keys::SESSION_GUID)? {
					Some(stored) => {
						debug!(target: "portal.session", "adopting stored session");
						stored
					}
					None => self.establish().await?,
				};
				*current = Some(id.clone());
				id
			}
		};

		if !self.is_stale()? {
			return Ok(session_id);
		}

		// Stamp before renewing so concurrent callers don't all renew at once.
		self.touch()?;
		match self.renew(&session_id).await {
			Ok(()) => {
				debug!(target: "portal.session", "session renewed");
				Ok(session_id)
			}
			Err(err) => {
				warn!(target: "portal.session", error = %err, "session expired and could not be renewed; recreating");
				self.forget(current)?;
				let id = self.establish().await?;
				*current = Some(id.clone());
				Ok(id)
			}
		}
	}

	/// Creates and authenticates a new session, then persists it.
	async fn establish(&self) -> Result<String> {
		let email = self.settings.get_non_empty(keys::EMAIL)?;
		let password = self.settings.get_non_empty(keys::PASSWORD)?;
		let (Some(email), Some(password)) = (email, password) else {
			return Err(Error::Configuration("either the email or password was not set".into()));
		};

		let created = self.transport.invoke(&TransportRequest::new("Session", "Create")).await?;
		self.classifier.ensure_success(&created)?;
		let session_id = session_guid(&created)
			.ok_or_else(|| Error::Service("session create returned no SessionGUID".into()))?;

		let login = TransportRequest::new("EmailPassword", "Login")
			.param("email", email)
			.param("password", password)
			.with_session(Some(session_id.clone()));
		let authenticated = self.transport.invoke(&login).await?;
		self.classifier.ensure_success(&authenticated)?;

		self.settings.set(keys::SESSION_GUID, Some(session_id.as_str()))?;
		self.touch()?;
		info!(target: "portal.session", "created new session");
		Ok(session_id)
	}

	async fn renew(&self, session_id: &str) -> Result<()> {
		let request = TransportRequest::new("Session", "Update").with_session(Some(session_id.to_string()));
		let response = self.transport.invoke(&request).await?;
		self.classifier.ensure_success(&response)
	}

	fn forget(&self, current: &mut Option<String>) -> Result<()> {
		*current = None;
		self.settings.set(keys::SESSION_GUID, None)
	}

	fn touch(&self) -> Result<()> {
		self.settings.set(keys::SESSION_UPDATED, Some(now_ts().to_string().as_str()))
	}

	/// A missing timestamp counts as stale.
	fn is_stale(&self) -> Result<bool> {
		let Some(last) = self.last_renewed()? else {
			return Ok(true);
		};
		Ok(now_ts().saturating_sub(last) > self.timeout.as_secs())
	}
}

fn session_guid(envelope: &ResultEnvelope) -> Option<String> {
	let first = envelope.section(section::PORTAL)?.results.first()?;
	first
		.get("SessionGUID")
		.or_else(|| first.get("Guid"))
		.and_then(|v| v.as_str())
		.map(String::from)
}

pub(crate) fn now_ts() -> u64 {
	std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.unwrap_or_default()
		.as_secs()
}
