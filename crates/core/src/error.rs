//! Error types for the portal client.

use portal_runtime::TransportError;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a caller of [`PortalClient`](crate::PortalClient) can observe.
#[derive(Debug, Error)]
pub enum Error {
	/// Required configuration (access point, credentials) is missing.
	#[error("Configuration error: {0}")]
	Configuration(String),

	/// The service rejected the call. Carries the service message verbatim.
	#[error("{0}")]
	Service(String),

	/// The service could not be reached or answered garbage.
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// The persistent settings store failed.
	#[error("Settings store error: {0}")]
	Storage(String),
}

impl Error {
	/// Returns the service message if this is a service error.
	pub fn service_message(&self) -> Option<&str> {
		match self {
			Error::Service(message) => Some(message),
			_ => None,
		}
	}

	pub fn is_configuration(&self) -> bool {
		matches!(self, Error::Configuration(_))
	}

	pub fn is_transport(&self) -> bool {
		matches!(self, Error::Transport(_))
	}
}
