mod call;
mod objects;
mod session;
mod settings;


use std::sync::Arc;

use portal::{AccessPoint, PortalClient};
use portal_runtime::{HttpTransport, Transport};
use serde_json::Value;

use crate::cli::{AccessPointArgs, Cli, Commands};
use crate::config::{CliConfig, StatePaths};
use crate::error::Result;
use crate::settings_store::JsonSettingsStore;

/// Everything a network-backed command needs.
pub struct Context {
	pub client: PortalClient,
	pub settings: Arc<JsonSettingsStore>,
}

impl Context {
	pub fn new(config: &CliConfig, settings: Arc<JsonSettingsStore>, transport: Arc<dyn Transport>) -> Self {
		let client = PortalClient::builder(transport, settings.clone())
			.options(config.client_options())
			.build();
		for constraint in &config.global_constraints {
			client.add_global_constraint(constraint);
		}
		Self { client, settings }
	}
}

pub async fn dispatch(cli: Cli) -> Result<()> {
	let paths = StatePaths::new(cli.config_dir.as_deref());
	let store = Arc::new(JsonSettingsStore::new(&paths.settings));

	// Settings never touch the network, so they work before a service URL is configured.
	if let Commands::Settings(args) = &cli.command {
		return print_json(&settings::execute(store.as_ref(), &args.action)?);
	}

	let config = CliConfig::load(&paths.config)?;
	let transport = HttpTransport::new(config.transport_config(cli.service_url.as_deref())?)?;
	let ctx = Context::new(&config, store, Arc::new(transport));

	let output = execute(&ctx, cli.command).await?;
	print_json(&output)
}

/// Runs `command` and returns its JSON output.
pub async fn execute(ctx: &Context, command: Commands) -> Result<Value> {
	match command {
		Commands::Call(args) => call::execute(ctx, args).await,
		Commands::Objects(args) => objects::execute(ctx, args).await,
		Commands::Session(args) => session::execute(ctx, args.action).await,
		Commands::Settings(args) => settings::execute(ctx.settings.as_ref(), &args.action),
	}
}

fn print_json(value: &Value) -> Result<()> {
	println!("{}", serde_json::to_string_pretty(value)?);
	Ok(())
}

impl From<&AccessPointArgs> for AccessPoint {
	fn from(args: &AccessPointArgs) -> Self {
		match (&args.access_point, args.no_access_point) {
			(_, true) => AccessPoint::Omit,
			(Some(guid), false) => AccessPoint::Explicit(guid.clone()),
			(None, false) => AccessPoint::Default,
		}
	}
}
