
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use portal::settings::keys;

/// Root CLI for the portal client.
#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(about = "Session-managed, caching client for the portal content service")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Directory holding config.json and settings.json
	#[arg(long, global = true, value_name = "DIR", env = "PORTAL_CONFIG_DIR")]
	pub config_dir: Option<PathBuf>,

	/// Service base URL, overriding `serviceUrl` from config.json
	#[arg(long, global = true, value_name = "URL")]
	pub service_url: Option<String>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
	/// Call a service method and print the result envelope.
	Call(CallArgs),
	/// Search content objects.
	Objects(ObjectsArgs),
	/// Inspect or control the persisted session.
	Session(SessionArgs),
	/// Manage persisted settings (access point, credentials).
	Settings(SettingsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CallArgs {
	/// Service path, e.g. `Object`
	#[arg(value_name = "PATH")]
	pub path: String,

	/// Method on the path, e.g. `Get`
	#[arg(value_name = "METHOD")]
	pub method: String,

	/// Call parameter (repeatable)
	#[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
	pub params: Vec<(String, String)>,

	/// Call without a session
	#[arg(long)]
	pub no_session: bool,

	#[command(flatten)]
	pub access_point: AccessPointArgs,

	/// Bypass the response cache
	#[arg(long)]
	pub no_cache: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct AccessPointArgs {
	/// Access point for this call, overriding the configured default
	#[arg(long, value_name = "GUID", conflicts_with = "no_access_point")]
	pub access_point: Option<String>,

	/// Send no access point at all
	#[arg(long)]
	pub no_access_point: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ObjectsArgs {
	/// Search query, e.g. `FolderID:7`
	#[arg(value_name = "QUERY")]
	pub query: String,

	/// Sort expression, e.g. `score desc`
	#[arg(long)]
	pub sort: Option<String>,

	/// Zero-based page index
	#[arg(long, default_value_t = 0)]
	pub page: u32,

	#[arg(long, default_value_t = 10)]
	pub page_size: u32,

	#[command(flatten)]
	pub access_point: AccessPointArgs,
}

#[derive(Args, Debug, Clone)]
pub struct SessionArgs {
	#[command(subcommand)]
	pub action: SessionAction,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionAction {
	/// Show the persisted session and its state.
	Show,
	/// Obtain a valid session, renewing or creating it as needed.
	Renew,
	/// Discard the current session and create a new one.
	Reset,
}

#[derive(Args, Debug, Clone)]
pub struct SettingsArgs {
	#[command(subcommand)]
	pub action: SettingsAction,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SettingsAction {
	/// List all user-managed settings.
	List,
	/// Print one setting.
	Get {
		#[arg(value_enum)]
		key: SettingKey,
	},
	/// Store a setting.
	Set {
		#[arg(value_enum)]
		key: SettingKey,
		value: String,
	},
	/// Remove a setting.
	Unset {
		#[arg(value_enum)]
		key: SettingKey,
	},
}

/// Settings a user may manage from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SettingKey {
	AccessPoint,
	Email,
	Password,
}

impl SettingKey {
	pub const ALL: [SettingKey; 3] = [SettingKey::AccessPoint, SettingKey::Email, SettingKey::Password];

	/// Key in the settings store.
	pub fn store_key(self) -> &'static str {
		match self {
			SettingKey::AccessPoint => keys::ACCESS_POINT_GUID,
			SettingKey::Email => keys::EMAIL,
			SettingKey::Password => keys::PASSWORD,
		}
	}

	pub fn is_secret(self) -> bool {
		matches!(self, SettingKey::Password)
	}
}

/// Parses `KEY=VALUE`. The value may itself contain `=`.
pub fn parse_key_val(raw: &str) -> Result<(String, String), String> {
	let (key, value) = raw
		.split_once('=')
		.ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
	if key.is_empty() {
		return Err(format!("empty key in `{raw}`"));
	}
	Ok((key.to_string(), value.to_string()))
}
