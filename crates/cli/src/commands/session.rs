use portal::settings::{SettingsStore, keys};
use serde_json::{Value, json};

use super::Context;
use crate::cli::SessionAction;
use crate::error::Result;

pub async fn execute(ctx: &Context, action: SessionAction) -> Result<Value> {
	let sessions = ctx.client.sessions();

	let session_guid = match action {
		SessionAction::Show => ctx.settings.get_non_empty(keys::SESSION_GUID)?,
		SessionAction::Renew => Some(sessions.session_id().await?),
		SessionAction::Reset => Some(sessions.reset().await?),
	};

	Ok(json!({
		"state": sessions.state().await?,
		"sessionGuid": session_guid,
		"lastRenewed": sessions.last_renewed()?,
	}))
}
