use std::sync::Arc;

use portal::{AccessPoint, AttributeRegistry, ObjectQuery};
use serde_json::{Value, json};

use super::Context;
use crate::cli::ObjectsArgs;
use crate::error::Result;

pub async fn execute(ctx: &Context, args: ObjectsArgs) -> Result<Value> {
	let mut query = ObjectQuery::new(args.query)
		.page(args.page)
		.page_size(args.page_size)
		.access_point(AccessPoint::from(&args.access_point));
	if let Some(sort) = args.sort {
		query = query.sort(sort);
	}

	let registry = Arc::new(AttributeRegistry::new());
	let objects = ctx.client.get_objects(query, &registry).await?;

	Ok(json!({
		"count": objects.len(),
		"objects": objects.iter().map(|o| o.data().clone()).collect::<Vec<_>>(),
	}))
}
