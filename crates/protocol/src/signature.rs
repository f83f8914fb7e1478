//! Call identification and cache fingerprints.

use std::collections::BTreeMap;

use serde::Serialize;
use sha2::{Digest, Sha256};

/// Call parameters, kept sorted so serialization is canonical.
pub type Parameters = BTreeMap<String, String>;

/// Everything that distinguishes one outbound call from another.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallSignature<'a> {
	pub path: &'a str,
	pub method: &'a str,
	pub parameters: &'a Parameters,
	pub requires_session: bool,
}

impl CallSignature<'_> {
	/// Returns a hex SHA-256 digest over the canonical JSON form of the signature.
	///
	/// Equal signatures always produce equal fingerprints regardless of the
	/// order in which parameters were inserted.
	pub fn fingerprint(&self) -> String {
		// Serializing borrowed strings and a BTreeMap cannot fail.
		let canonical = serde_json::to_vec(self).unwrap_or_default();
		hex::encode(Sha256::digest(&canonical))
	}
}
