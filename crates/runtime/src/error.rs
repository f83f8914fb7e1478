//! Error types for the transport layer.

use thiserror::Error;

/// Result type alias for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Faults raised below the envelope level.
///
/// None of these carry service-level meaning: a call that reached the service
/// and came back with a failed envelope is *not* a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
	/// The service could not be reached (refused, reset, timed out).
	#[error("Service unreachable: {0}")]
	Unreachable(String),

	/// The service answered with a non-success HTTP status.
	#[error("Service returned HTTP {status}: {body}")]
	Status { status: u16, body: String },

	/// HTTP client error that is not a connectivity problem.
	#[error("HTTP error: {0}")]
	Http(#[from] reqwest::Error),

	/// Response body was not a valid result envelope.
	#[error("Invalid response envelope: {0}")]
	Decode(#[from] serde_json::Error),

	/// Service URL could not be parsed or joined.
	#[error("Invalid service URL: {0}")]
	InvalidUrl(#[from] url::ParseError),
}

impl TransportError {
	/// Returns true if the fault is a connectivity problem.
	pub fn is_unreachable(&self) -> bool {
		match self {
			TransportError::Unreachable(_) => true,
			TransportError::Http(err) => err.is_connect() || err.is_timeout(),
			_ => false,
		}
	}
}
