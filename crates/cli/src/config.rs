//! On-disk CLI configuration.
//!
//! Two files live in one directory (`$XDG_CONFIG_HOME/portal/` by default):
//! `config.json` with connection and client tuning, and `settings.json`
//! holding the settings store (credentials, access point, session).

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use portal::ClientOptions;
use portal_runtime::HttpTransportConfig;
use serde::{Deserialize, Serialize};

use crate::error::{CliError, Result};

/// Schema version for config files.
pub const SCHEMA_VERSION: u32 = 1;

/// File paths for CLI state.
#[derive(Debug, Clone)]
pub struct StatePaths {
	pub config: PathBuf,
	pub settings: PathBuf,
}

impl StatePaths {
	/// Uses `dir` when given, otherwise the XDG config directory.
	pub fn new(dir: Option<&Path>) -> Self {
		let dir = dir.map(Path::to_path_buf).unwrap_or_else(|| {
			std::env::var_os("XDG_CONFIG_HOME")
				.map(PathBuf::from)
				.or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
				.unwrap_or_else(|| PathBuf::from("."))
				.join("portal")
		});

		Self {
			config: dir.join("config.json"),
			settings: dir.join("settings.json"),
		}
	}
}

/// Durable CLI configuration. Unset fields fall back to client defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
	#[serde(default)]
	pub schema: u32,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub service_url: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub client_guid: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_timeout_secs: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub session_timeout_secs: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_ttl_secs: Option<u64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub cache_responses: Option<bool>,
	/// Section names checked after the standard ones.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub extra_sections: Vec<String>,
	/// Query clauses ANDed onto every call.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub global_constraints: Vec<String>,
}

impl CliConfig {
	/// Creates a config with current [`SCHEMA_VERSION`].
	pub fn new() -> Self {
		Self {
			schema: SCHEMA_VERSION,
			..Default::default()
		}
	}

	/// Loads `path`, treating a missing file as an empty config.
	pub fn load(path: &Path) -> Result<Self> {
		Ok(load_json(path)?.unwrap_or_else(Self::new))
	}

	pub fn client_options(&self) -> ClientOptions {
		let mut options = ClientOptions::default();
		if let Some(secs) = self.session_timeout_secs {
			options = options.with_session_timeout(Duration::from_secs(secs));
		}
		if let Some(secs) = self.cache_ttl_secs {
			options = options.with_cache_ttl(Duration::from_secs(secs));
		}
		if let Some(enabled) = self.cache_responses {
			options = options.with_cache_responses(enabled);
		}
		for name in &self.extra_sections {
			options = options.with_section(name.clone());
		}
		options
	}

	/// Transport settings; `service_url` overrides the configured one.
	pub fn transport_config(&self, service_url: Option<&str>) -> Result<HttpTransportConfig> {
		let url = service_url
			.map(str::to_string)
			.or_else(|| self.service_url.clone())
			.filter(|u| !u.trim().is_empty())
			.ok_or_else(|| CliError::Config("no service URL configured".into()))?;

		let mut config = HttpTransportConfig::new(url).with_client_guid(self.client_guid.clone());
		if let Some(secs) = self.request_timeout_secs {
			config = config.with_request_timeout(Duration::from_secs(secs));
		}
		Ok(config)
	}
}

pub(crate) fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
	let content = match fs::read_to_string(path) {
		Ok(content) => content,
		Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
		Err(err) => return Err(err.into()),
	};
	let parsed = serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
	Ok(Some(parsed))
}
