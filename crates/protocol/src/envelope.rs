//! Layered result envelope returned by every service call.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Well-known section names, in the order the client checks them.
pub mod section {
	pub const PORTAL: &str = "Portal";
	pub const STATISTICS: &str = "Statistics";
	pub const CREDENTIALS: &str = "Credentials";
	pub const CONTENT: &str = "Content";
	pub const SECURE_COOKIE: &str = "SecureCookie";
	pub const UPLOAD: &str = "Upload";

	/// Standard sections in classification order.
	pub const STANDARD: [&str; 6] = [PORTAL, STATISTICS, CREDENTIALS, CONTENT, SECURE_COOKIE, UPLOAD];

	/// Maps legacy module names onto their canonical section name.
	///
	/// Older service builds report `EmailPassword` and `MCM` for what this
	/// crate calls `Credentials` and `Content`.
	pub fn canonical(name: &str) -> &str {
		match name {
			"EmailPassword" => CREDENTIALS,
			"MCM" => CONTENT,
			other => other,
		}
	}
}

/// Response timing header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Header {
	/// Server-side processing time in milliseconds.
	#[serde(default)]
	pub duration: f64,
}

/// Error details reported by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorPayload {
	/// Fully qualified exception name on the service side.
	#[serde(default, rename = "Fullname", skip_serializing_if = "Option::is_none")]
	pub kind: Option<String>,
	/// Human-readable message.
	pub message: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub stacktrace: Option<String>,
}

impl ErrorPayload {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			kind: None,
			message: message.into(),
			stacktrace: None,
		}
	}
}

/// One named sub-result of an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectionResult {
	/// Section name as reported by the service.
	#[serde(rename = "Fullname")]
	pub name: String,
	#[serde(default)]
	pub duration: f64,
	#[serde(default)]
	pub count: u64,
	#[serde(default)]
	pub total_count: u64,
	#[serde(default)]
	pub results: Vec<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
}

impl SectionResult {
	/// Creates a successful section holding `results`.
	pub fn ok(name: impl Into<String>, results: Vec<Value>) -> Self {
		let count = results.len() as u64;
		Self {
			name: name.into(),
			duration: 0.0,
			count,
			total_count: count,
			results,
			error: None,
		}
	}

	/// Creates a failed section with `message`.
	pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			duration: 0.0,
			count: 0,
			total_count: 0,
			results: Vec::new(),
			error: Some(ErrorPayload::new(message)),
		}
	}

	/// Returns the canonical section name.
	pub fn canonical_name(&self) -> &str {
		section::canonical(&self.name)
	}

	pub fn was_success(&self) -> bool {
		self.error.is_none()
	}
}

/// Outer response envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResultEnvelope {
	#[serde(default)]
	pub header: Header,
	/// Outer failure, set when the call as a whole was rejected.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<ErrorPayload>,
	#[serde(default, rename = "ModuleResults")]
	pub sections: Vec<SectionResult>,
}

impl ResultEnvelope {
	/// An empty, successful envelope.
	pub fn success() -> Self {
		Self::default()
	}

	/// An envelope whose outer status failed with `message`.
	pub fn failed(message: impl Into<String>) -> Self {
		Self {
			error: Some(ErrorPayload::new(message)),
			..Self::default()
		}
	}

	/// Appends a section.
	pub fn with_section(mut self, section: SectionResult) -> Self {
		self.sections.push(section);
		self
	}

	pub fn was_success(&self) -> bool {
		self.error.is_none()
	}

	/// Looks up a section by canonical or legacy name.
	pub fn section(&self, name: &str) -> Option<&SectionResult> {
		let wanted = section::canonical(name);
		self.sections.iter().find(|s| s.canonical_name() == wanted)
	}

	/// Results of the `Content` section, or an empty slice when absent.
	pub fn content_results(&self) -> &[Value] {
		self.section(section::CONTENT).map(|s| s.results.as_slice()).unwrap_or(&[])
	}
}
