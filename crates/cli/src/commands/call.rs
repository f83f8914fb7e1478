use portal::{AccessPoint, ServiceCall};
use serde_json::Value;
use tracing::info;

use super::Context;
use crate::cli::CallArgs;
use crate::error::Result;

pub async fn execute(ctx: &Context, args: CallArgs) -> Result<Value> {
	if args.no_cache {
		ctx.client.set_cache_responses(false);
	}

	let call = ServiceCall::new(args.path, args.method)
		.params(args.params)
		.access_point(AccessPoint::from(&args.access_point))
		.requires_session(!args.no_session);

	let envelope = ctx.client.call(call).await?;
	info!(
		target: "portal.cli",
		elapsed_ms = ctx.client.accumulated_response_time().as_millis() as u64,
		"accumulated response time"
	);
	Ok(serde_json::to_value(envelope)?)
}
