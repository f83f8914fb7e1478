//! JSON-file [`SettingsStore`].
//!
//! The file is re-read on every access so that several `portal` processes
//! sharing one config directory converge on the same session. Writes are
//! last-writer-wins. The file holds credentials, so it is kept at 0600.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use portal::settings::SettingsStore;
use tracing::debug;

type SettingsFile = BTreeMap<String, String>;

#[derive(Debug)]
pub struct JsonSettingsStore {
	path: PathBuf,
	// Serializes read-modify-write within this process.
	write_lock: Mutex<()>,
}

impl JsonSettingsStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self {
			path: path.into(),
			write_lock: Mutex::new(()),
		}
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	fn read(&self) -> portal::Result<SettingsFile> {
		match fs::read_to_string(&self.path) {
			Ok(content) if content.trim().is_empty() => Ok(SettingsFile::new()),
			Ok(content) => serde_json::from_str(&content).map_err(|err| self.storage_error(err)),
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(SettingsFile::new()),
			Err(err) => Err(self.storage_error(err)),
		}
	}

	fn write(&self, settings: &SettingsFile) -> portal::Result<()> {
		if let Some(parent) = self.path.parent() {
			fs::create_dir_all(parent).map_err(|err| self.storage_error(err))?;
		}
		let body = serde_json::to_string_pretty(settings).map_err(|err| self.storage_error(err))?;
		fs::write(&self.path, body).map_err(|err| self.storage_error(err))?;
		#[cfg(unix)]
		{
			use std::os::unix::fs::PermissionsExt;
			fs::set_permissions(&self.path, fs::Permissions::from_mode(0o600)).map_err(|err| self.storage_error(err))?;
		}
		Ok(())
	}

	fn storage_error(&self, err: impl std::fmt::Display) -> portal::Error {
		portal::Error::Storage(format!("{}: {err}", self.path.display()))
	}
}

impl SettingsStore for JsonSettingsStore {
	fn get(&self, key: &str) -> portal::Result<Option<String>> {
		Ok(self.read()?.remove(key))
	}

	fn set(&self, key: &str, value: Option<&str>) -> portal::Result<()> {
		let _guard = self.write_lock.lock();
		let mut settings = self.read()?;
		match value {
			Some(value) => {
				settings.insert(key.to_string(), value.to_string());
			}
			None => {
				if settings.remove(key).is_none() {
					return Ok(());
				}
			}
		}
		debug!(target: "portal.settings", key, set = value.is_some(), "writing settings");
		self.write(&settings)
	}
}
