use portal::settings::SettingsStore;
use serde_json::{Map, Value, json};

use crate::cli::{SettingKey, SettingsAction};
use crate::error::Result;

const MASK: &str = "********";

pub fn execute(store: &dyn SettingsStore, action: &SettingsAction) -> Result<Value> {
	match action {
		SettingsAction::List => {
			let mut out = Map::new();
			for key in SettingKey::ALL {
				out.insert(key.store_key().to_string(), display(key, store.get(key.store_key())?));
			}
			Ok(Value::Object(out))
		}
		SettingsAction::Get { key } => Ok(json!({ key.store_key(): display(*key, store.get(key.store_key())?) })),
		SettingsAction::Set { key, value } => {
			store.set(key.store_key(), Some(value.as_str()))?;
			Ok(json!({ key.store_key(): display(*key, Some(value.clone())) }))
		}
		SettingsAction::Unset { key } => {
			store.set(key.store_key(), None)?;
			Ok(json!({ key.store_key(): Value::Null }))
		}
	}
}

fn display(key: SettingKey, value: Option<String>) -> Value {
	match value {
		Some(_) if key.is_secret() => Value::String(MASK.into()),
		Some(value) => Value::String(value),
		None => Value::Null,
	}
}
