//! stderr logging for the `portal` binary.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Filter used when `RUST_LOG` is unset.
fn default_filter(verbosity: u8) -> &'static str {
	match verbosity {
		0 => "error",
		// Session and dispatch events, without per-request transport lines.
		1 => "info,portal.transport=warn",
		_ => "debug,hyper=info,reqwest=info",
	}
}

/// Installs the global subscriber. `RUST_LOG` wins over `-v`.
pub fn init_logging(verbosity: u8) {
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

	tracing_subscriber::fmt()
		.with_env_filter(env_filter)
		.with_writer(std::io::stderr.with_max_level(tracing::Level::TRACE))
		.with_target(true)
		.compact()
		.init();
}
