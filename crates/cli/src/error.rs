use thiserror::Error;

use portal::settings::keys;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
	#[error("configuration error: {0}")]
	Config(String),

	#[error("invalid input: {0}")]
	InvalidInput(String),

	#[error(transparent)]
	Io(#[from] std::io::Error),

	#[error(transparent)]
	Json(#[from] serde_json::Error),

	#[error(transparent)]
	Portal(#[from] portal::Error),

	#[error(transparent)]
	Transport(#[from] portal_runtime::TransportError),

	#[error(transparent)]
	Anyhow(#[from] anyhow::Error),
}

impl CliError {
	/// Suggests a fix for errors the user can resolve locally.
	pub fn hint(&self) -> Option<String> {
		match self {
			CliError::Config(_) => Some("set `serviceUrl` in config.json or pass --service-url".into()),
			CliError::Portal(err) if err.is_configuration() => {
				let message = err.to_string();
				if message.contains(keys::ACCESS_POINT_GUID) {
					Some("run `portal settings set access-point <GUID>` or pass --access-point".into())
				} else {
					Some("run `portal settings set email <EMAIL>` and `portal settings set password <PASSWORD>`".into())
				}
			}
			_ => None,
		}
	}
}
