//! Envelope classification.
//!
//! Turns a [`ResultEnvelope`] into an [`Outcome`]. This is the only place that
//! interprets envelope contents; everything below the dispatcher passes
//! envelopes through untouched.

use portal_protocol::{ResultEnvelope, SectionResult, section};

use crate::error::Error;
use crate::options::ClientOptions;

/// A sub-section reported that the session is no longer valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExpired {
	/// Section that carried the failure.
	pub section: String,
	pub message: String,
}

/// Classified result of one envelope.
#[derive(Debug)]
pub enum Outcome {
	Success,
	/// Recoverable by resetting the session and retrying once.
	Retryable(SessionExpired),
	Fatal(Error),
}

/// Checks envelopes against an ordered section list.
#[derive(Debug, Clone)]
pub struct Classifier {
	sections: Vec<String>,
	expiry_signature: String,
}

impl Classifier {
	pub fn new(options: &ClientOptions) -> Self {
		let mut sections: Vec<String> = section::STANDARD.iter().map(|s| s.to_string()).collect();
		for extra in &options.extra_sections {
			if !sections.iter().any(|s| s == section::canonical(extra)) {
				sections.push(section::canonical(extra).to_string());
			}
		}
		Self {
			sections,
			expiry_signature: options.session_expiry_signature.clone(),
		}
	}

	/// Section names in the order they are checked.
	pub fn sections(&self) -> &[String] {
		&self.sections
	}

	/// Returns true if `message` carries the session-expiry signature.
	pub fn is_session_expiry(&self, message: &str) -> bool {
		!self.expiry_signature.is_empty() && message.contains(&self.expiry_signature)
	}

	/// Classifies `envelope`: outer status first, then known sections in order,
	/// then any other section the service returned.
	pub fn classify(&self, envelope: &ResultEnvelope) -> Outcome {
		if let Some(error) = &envelope.error {
			return Outcome::Fatal(Error::Service(error.message.clone()));
		}

		let known = self.sections.iter().filter_map(|name| envelope.section(name));
		let unknown = envelope
			.sections
			.iter()
			.filter(|s| !self.sections.iter().any(|name| name == s.canonical_name()));

		for section in known.chain(unknown) {
			if let Some(outcome) = self.classify_section(section) {
				return outcome;
			}
		}

		Outcome::Success
	}

	/// Like [`classify`](Self::classify), but treats a session expiry as fatal.
	///
	/// Used where no retry is possible, e.g. while creating a session.
	pub fn ensure_success(&self, envelope: &ResultEnvelope) -> Result<(), Error> {
		match self.classify(envelope) {
			Outcome::Success => Ok(()),
			Outcome::Retryable(expired) => Err(Error::Service(expired.message)),
			Outcome::Fatal(err) => Err(err),
		}
	}

	fn classify_section(&self, section: &SectionResult) -> Option<Outcome> {
		let error = section.error.as_ref()?;
		if self.is_session_expiry(&error.message) {
			Some(Outcome::Retryable(SessionExpired {
				section: section.canonical_name().to_string(),
				message: error.message.clone(),
			}))
		} else {
			Some(Outcome::Fatal(Error::Service(error.message.clone())))
		}
	}
}

impl Default for Classifier {
	fn default() -> Self {
		Self::new(&ClientOptions::default())
	}
}
