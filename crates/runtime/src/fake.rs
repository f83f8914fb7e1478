//! Scripted in-memory transport for tests.
//!
//! Replies are queued per `path/method` route. The last queued reply for a
//! route is sticky: once the queue is down to one entry it is returned for
//! every further request, so a route scripted once answers forever.
//!
//! # Example
//!
//! ```ignore
//! let transport = FakeTransport::new().with_session_routes("session-1");
//! transport.reply("Object", "Get", ResultEnvelope::success());
//!
//! let envelope = transport.invoke(&TransportRequest::new("Object", "Get")).await?;
//! assert_eq!(transport.count("Object", "Get"), 1);
//! ```

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use portal_protocol::{ResultEnvelope, SectionResult, section};
use serde_json::json;

use crate::error::{Result, TransportError};
use crate::transport::{Transport, TransportRequest};

#[derive(Debug, Clone)]
enum FakeReply {
	Envelope(ResultEnvelope),
	Unreachable(String),
}

/// In-memory [`Transport`] that replays scripted envelopes and records requests.
#[derive(Debug, Default)]
pub struct FakeTransport {
	routes: Mutex<HashMap<String, VecDeque<FakeReply>>>,
	sent: Mutex<Vec<TransportRequest>>,
}

impl FakeTransport {
	pub fn new() -> Self {
		Self::default()
	}

	/// Scripts successful `Session/Create`, `EmailPassword/Login`, and `Session/Update`.
	pub fn with_session_routes(self, session_id: &str) -> Self {
		self.reply(
			"Session",
			"Create",
			ResultEnvelope::success().with_section(SectionResult::ok(
				section::PORTAL,
				vec![json!({ "SessionGUID": session_id })],
			)),
		);
		self.reply(
			"EmailPassword",
			"Login",
			ResultEnvelope::success().with_section(SectionResult::ok(section::CREDENTIALS, vec![])),
		);
		self.reply(
			"Session",
			"Update",
			ResultEnvelope::success().with_section(SectionResult::ok(section::PORTAL, vec![])),
		);
		self
	}

	/// Queues an envelope for `path/method`.
	pub fn reply(&self, path: &str, method: &str, envelope: ResultEnvelope) {
		self.push(path, method, FakeReply::Envelope(envelope));
	}

	/// Queues a connectivity fault for `path/method`.
	pub fn reply_unreachable(&self, path: &str, method: &str, message: &str) {
		self.push(path, method, FakeReply::Unreachable(message.to_string()));
	}

	/// Drops all queued replies for `path/method`.
	pub fn clear_route(&self, path: &str, method: &str) {
		self.routes.lock().remove(&route_key(path, method));
	}

	/// Returns every request received so far.
	pub fn requests(&self) -> Vec<TransportRequest> {
		self.sent.lock().clone()
	}

	/// Number of requests received for `path/method`.
	pub fn count(&self, path: &str, method: &str) -> usize {
		self.sent.lock().iter().filter(|r| r.path == path && r.method == method).count()
	}

	/// Total number of requests received.
	pub fn total(&self) -> usize {
		self.sent.lock().len()
	}

	fn push(&self, path: &str, method: &str, reply: FakeReply) {
		self.routes.lock().entry(route_key(path, method)).or_default().push_back(reply);
	}

	fn next_reply(&self, route: &str) -> Option<FakeReply> {
		let mut routes = self.routes.lock();
		let queue = routes.get_mut(route)?;
		if queue.len() > 1 { queue.pop_front() } else { queue.front().cloned() }
	}
}

#[async_trait]
impl Transport for FakeTransport {
	async fn invoke(&self, request: &TransportRequest) -> Result<ResultEnvelope> {
		self.sent.lock().push(request.clone());

		let route = request.route();
		match self.next_reply(&route) {
			Some(FakeReply::Envelope(envelope)) => Ok(envelope),
			Some(FakeReply::Unreachable(message)) => Err(TransportError::Unreachable(message)),
			None => Err(TransportError::Unreachable(format!("no scripted reply for {route}"))),
		}
	}
}

fn route_key(path: &str, method: &str) -> String {
	format!("{path}/{method}")
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn last_reply_is_sticky() {
		let transport = FakeTransport::new();
		transport.reply("Object", "Get", ResultEnvelope::failed("first"));
		transport.reply("Object", "Get", ResultEnvelope::failed("second"));

		let request = TransportRequest::new("Object", "Get");
		let first = transport.invoke(&request).await.unwrap();
		let second = transport.invoke(&request).await.unwrap();
		let third = transport.invoke(&request).await.unwrap();

		assert_eq!(first.error.unwrap().message, "first");
		assert_eq!(second.error.unwrap().message, "second");
		assert_eq!(third.error.unwrap().message, "second");
		assert_eq!(transport.count("Object", "Get"), 3);
	}

	#[tokio::test]
	async fn unscripted_route_is_unreachable() {
		let transport = FakeTransport::new();
		let err = transport.invoke(&TransportRequest::new("Object", "Get")).await.unwrap_err();
		assert!(err.is_unreachable());
		assert_eq!(transport.total(), 1);
	}

	#[tokio::test]
	async fn session_routes_are_scripted() {
		let transport = FakeTransport::new().with_session_routes("s-1");
		let created = transport.invoke(&TransportRequest::new("Session", "Create")).await.unwrap();
		assert_eq!(created.section("Portal").unwrap().results[0]["SessionGUID"], "s-1");
	}
}
