//! Raw transport abstraction.
//!
//! A [`Transport`] turns one [`TransportRequest`] into one [`ResultEnvelope`].
//! It knows nothing about sessions beyond forwarding the identifier it is
//! handed, and never inspects the envelope it returns.

use std::sync::Arc;

use async_trait::async_trait;
use portal_protocol::{Parameters, ResultEnvelope};

use crate::error::Result;

/// A single outbound service invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
	/// Service path, e.g. `Object`.
	pub path: String,
	/// Method on the path, e.g. `Get`.
	pub method: String,
	pub parameters: Parameters,
	/// Session identifier composed into the request, if the call needs one.
	pub session_id: Option<String>,
}

impl TransportRequest {
	pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			method: method.into(),
			parameters: Parameters::new(),
			session_id: None,
		}
	}

	/// Adds a parameter.
	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.parameters.insert(key.into(), value.into());
		self
	}

	/// Replaces all parameters.
	pub fn with_parameters(mut self, parameters: Parameters) -> Self {
		self.parameters = parameters;
		self
	}

	/// Attaches a session identifier.
	pub fn with_session(mut self, session_id: Option<String>) -> Self {
		self.session_id = session_id;
		self
	}

	/// `path/method`, used in logs and routing.
	pub fn route(&self) -> String {
		format!("{}/{}", self.path, self.method)
	}
}

/// Sends requests to the service.
#[async_trait]
pub trait Transport: Send + Sync {
	/// Invokes a remote call and returns the raw envelope.
	async fn invoke(&self, request: &TransportRequest) -> Result<ResultEnvelope>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
	async fn invoke(&self, request: &TransportRequest) -> Result<ResultEnvelope> {
		(**self).invoke(request).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn builder_collects_parameters() {
		let request = TransportRequest::new("EmailPassword", "Login")
			.param("email", "a@example.com")
			.param("password", "secret")
			.with_session(Some("s-1".into()));

		assert_eq!(request.route(), "EmailPassword/Login");
		assert_eq!(request.parameters.len(), 2);
		assert_eq!(request.parameters["email"], "a@example.com");
		assert_eq!(request.session_id.as_deref(), Some("s-1"));
	}
}
