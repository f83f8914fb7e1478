use clap::Parser;
use portal_cli::cli::Cli;
use portal_cli::error::CliError;
use portal_cli::{commands, logging};

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	logging::init_logging(cli.verbose);

	if let Err(err) = commands::dispatch(cli).await {
		handle_error(&err);
		std::process::exit(1);
	}
}

fn handle_error(err: &CliError) {
	eprintln!("error: {err}");
	if let Some(hint) = err.hint() {
		eprintln!("hint: {hint}");
	}
}
