//! Content objects with registered, cached attributes.
//!
//! An [`AttributeRegistry`] maps attribute names to resolver closures. A
//! [`ContentObject`] consults, in order, its own attribute cache, the
//! registry, and finally the raw fields returned by the service. Resolved
//! values are cached per instance until [`ContentObject::clear_cache`] or
//! [`ContentObject::refresh`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use portal_protocol::ResultEnvelope;
use serde_json::Value;
use tracing::debug;

use crate::client::PortalClient;
use crate::error::{Error, Result};
use crate::query::ObjectQuery;

/// Computes an attribute from an object.
pub type Resolver = Arc<dyn Fn(&ContentObject) -> Value + Send + Sync>;

/// Runs after an object is constructed or refreshed.
pub type ConstructHook = Arc<dyn Fn(&ContentObject) + Send + Sync>;

/// Named attribute resolvers and construction hooks.
#[derive(Default)]
pub struct AttributeRegistry {
	resolvers: IndexMap<String, Resolver>,
	hooks: Vec<ConstructHook>,
}

impl AttributeRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `resolver` for `name`, replacing any previous one.
	pub fn with_attribute<F>(mut self, name: impl Into<String>, resolver: F) -> Self
	where
		F: Fn(&ContentObject) -> Value + Send + Sync + 'static,
	{
		self.resolvers.insert(name.into(), Arc::new(resolver));
		self
	}

	pub fn on_construct<F>(mut self, hook: F) -> Self
	where
		F: Fn(&ContentObject) + Send + Sync + 'static,
	{
		self.hooks.push(Arc::new(hook));
		self
	}

	pub fn contains(&self, name: &str) -> bool {
		self.resolvers.contains_key(name)
	}

	/// Registered attribute names in registration order.
	pub fn names(&self) -> impl Iterator<Item = &str> {
		self.resolvers.keys().map(String::as_str)
	}

	fn resolver(&self, name: &str) -> Option<Resolver> {
		self.resolvers.get(name).cloned()
	}
}

impl fmt::Debug for AttributeRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AttributeRegistry")
			.field("attributes", &self.resolvers.keys().collect::<Vec<_>>())
			.field("hooks", &self.hooks.len())
			.finish()
	}
}

/// One object from a `Content` section.
pub struct ContentObject {
	data: Value,
	registry: Arc<AttributeRegistry>,
	cache: Mutex<HashMap<String, Value>>,
}

impl ContentObject {
	/// Wraps `data` and runs the registry's construction hooks.
	pub fn new(data: Value, registry: Arc<AttributeRegistry>) -> Self {
		let object = Self {
			data,
			registry,
			cache: Mutex::new(HashMap::new()),
		};
		object.run_hooks();
		object
	}

	/// Wraps every result of the envelope's `Content` section.
	pub fn parse_response(envelope: &ResultEnvelope, registry: &Arc<AttributeRegistry>) -> Vec<Self> {
		envelope
			.content_results()
			.iter()
			.map(|data| Self::new(data.clone(), Arc::clone(registry)))
			.collect()
	}

	/// Raw object as returned by the service.
	pub fn data(&self) -> &Value {
		&self.data
	}

	pub fn guid(&self) -> Option<&str> {
		self.data.get("GUID").and_then(Value::as_str)
	}

	/// Raw top-level field, bypassing registry and cache.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.data.get(name)
	}

	/// Resolves `name`: cache, then registry, then raw field.
	pub fn get(&self, name: &str) -> Option<Value> {
		if let Some(value) = self.cache.lock().get(name) {
			return Some(value.clone());
		}

		if let Some(resolver) = self.registry.resolver(name) {
			// Resolvers may read other attributes, so no lock is held here.
			let value = resolver(self);
			self.cache.lock().insert(name.to_string(), value.clone());
			return Some(value);
		}

		self.field(name).cloned()
	}

	/// Resolves `name` as a string, if it is one.
	pub fn get_str(&self, name: &str) -> Option<String> {
		match self.get(name)? {
			Value::String(s) => Some(s),
			_ => None,
		}
	}

	pub fn is_cached(&self, name: &str) -> bool {
		self.cache.lock().contains_key(name)
	}

	/// Drops the cached value for `name`, or every cached value when `None`.
	pub fn clear_cache(&self, name: Option<&str>) {
		let mut cache = self.cache.lock();
		match name {
			Some(name) => {
				cache.remove(name);
			}
			None => cache.clear(),
		}
	}

	/// Refetches this object by GUID, clears its cache, and reruns hooks.
	///
	/// The response cache is skipped and overwritten with the fresh result.
	pub async fn refresh(&mut self, client: &PortalClient) -> Result<()> {
		let guid = self
			.guid()
			.ok_or_else(|| Error::Service("content object has no GUID".into()))?
			.to_string();

		let call = ObjectQuery::by_guid(&guid).into_call().bypass_cache(true);
		let envelope = client.call(call).await?;
		let data = envelope
			.content_results()
			.first()
			.cloned()
			.ok_or_else(|| Error::Service(format!("object {guid} not found")))?;

		debug!(target: "portal.client", guid = %guid, "refreshed content object");
		self.data = data;
		self.cache.get_mut().clear();
		self.run_hooks();
		Ok(())
	}

	/// Up to `count` objects matching `query` by relevance, excluding this one.
	///
	/// The query is typically built from the object's title and tags. Results
	/// share this object's registry.
	pub async fn related(&self, client: &PortalClient, query: &str, count: u32) -> Result<Vec<ContentObject>> {
		let search = ObjectQuery::new(format!("({query})")).sort("score desc").page_size(count);
		let mut objects = client.get_objects(search, &self.registry).await?;
		objects.retain(|object| object.guid() != self.guid());
		Ok(objects)
	}

	fn run_hooks(&self) {
		for hook in &self.registry.hooks {
			hook(self);
		}
	}
}

impl Clone for ContentObject {
	fn clone(&self) -> Self {
		Self {
			data: self.data.clone(),
			registry: Arc::clone(&self.registry),
			cache: Mutex::new(self.cache.lock().clone()),
		}
	}
}

impl fmt::Debug for ContentObject {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ContentObject")
			.field("guid", &self.guid())
			.field("cached", &self.cache.lock().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use std::sync::atomic::{AtomicUsize, Ordering};

	use portal_protocol::{SectionResult, section};
	use portal_runtime::FakeTransport;
	use serde_json::json;

	use super::*;
	use crate::settings::{MemorySettings, keys};

	fn settings() -> Arc<MemorySettings> {
		Arc::new(
			MemorySettings::new()
				.with(keys::EMAIL, "editor@example.org")
				.with(keys::PASSWORD, "hunter2")
				.with(keys::ACCESS_POINT_GUID, "ap"),
		)
	}

	fn content(results: Vec<Value>) -> ResultEnvelope {
		ResultEnvelope::success().with_section(SectionResult::ok(section::CONTENT, results))
	}

	fn counting_title(calls: &Arc<AtomicUsize>) -> AttributeRegistry {
		let calls = calls.clone();
		AttributeRegistry::new().with_attribute("title", move |object| {
			calls.fetch_add(1, Ordering::SeqCst);
			json!(format!("Title of {}", object.guid().unwrap_or("?")))
		})
	}

	#[test]
	fn registry_resolution_is_cached() {
		let calls = Arc::new(AtomicUsize::new(0));
		let object = ContentObject::new(json!({ "GUID": "a" }), Arc::new(counting_title(&calls)));

		assert_eq!(object.get_str("title").as_deref(), Some("Title of a"));
		assert_eq!(object.get_str("title").as_deref(), Some("Title of a"));
		assert_eq!(calls.load(Ordering::SeqCst), 1);
		assert!(object.is_cached("title"));

		object.clear_cache(Some("title"));
		assert!(!object.is_cached("title"));
		object.get("title");
		assert_eq!(calls.load(Ordering::SeqCst), 2);

		object.clear_cache(None);
		assert!(!object.is_cached("title"));
	}

	#[test]
	fn registry_shadows_raw_fields() {
		let registry = AttributeRegistry::new().with_attribute("Views", |_| json!(42));
		let object = ContentObject::new(json!({ "GUID": "a", "Views": 1, "Type": "video" }), Arc::new(registry));

		assert_eq!(object.get("Views"), Some(json!(42)));
		assert_eq!(object.field("Views"), Some(&json!(1)));
		assert_eq!(object.get("Type"), Some(json!("video")));
		assert_eq!(object.get("missing"), None);
		assert!(!object.is_cached("Type"));
	}

	#[test]
	fn resolvers_can_read_other_attributes() {
		let registry = AttributeRegistry::new()
			.with_attribute("title", |_| json!("Hello World"))
			.with_attribute("slug", |object| {
				let title = object.get_str("title").unwrap_or_default();
				json!(title.to_lowercase().replace(' ', "-"))
			});
		let object = ContentObject::new(json!({}), Arc::new(registry));

		assert_eq!(object.get_str("slug").as_deref(), Some("hello-world"));
		assert!(object.is_cached("title"));
	}

	#[test]
	fn hooks_run_on_construction() {
		let constructed = Arc::new(AtomicUsize::new(0));
		let counter = constructed.clone();
		let registry = Arc::new(AttributeRegistry::new().on_construct(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		}));

		let envelope = ResultEnvelope::success().with_section(SectionResult::ok(
			"MCM",
			vec![json!({ "GUID": "a" }), json!({ "GUID": "b" })],
		));
		let objects = ContentObject::parse_response(&envelope, &registry);

		assert_eq!(objects.len(), 2);
		assert_eq!(objects[1].guid(), Some("b"));
		assert_eq!(constructed.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn refresh_reloads_and_clears_cache() {
		let transport = Arc::new(FakeTransport::new().with_session_routes("s-1"));
		transport.reply(
			"Object",
			"Get",
			ResultEnvelope::success().with_section(SectionResult::ok(
				section::CONTENT,
				vec![json!({ "GUID": "a", "Views": 2 })],
			)),
		);
		let settings = Arc::new(
			MemorySettings::new()
				.with(keys::EMAIL, "editor@example.org")
				.with(keys::PASSWORD, "hunter2")
				.with(keys::ACCESS_POINT_GUID, "ap"),
		);
		let client = PortalClient::new(transport.clone(), settings);

		let constructed = Arc::new(AtomicUsize::new(0));
		let counter = constructed.clone();
		let calls = Arc::new(AtomicUsize::new(0));
		let registry = counting_title(&calls).on_construct(move |_| {
			counter.fetch_add(1, Ordering::SeqCst);
		});
		let mut object = ContentObject::new(json!({ "GUID": "a", "Views": 1 }), Arc::new(registry));
		object.get("title");

		object.refresh(&client).await.unwrap();

		assert_eq!(object.get("Views"), Some(json!(2)));
		assert!(!object.is_cached("title"));
		assert_eq!(constructed.load(Ordering::SeqCst), 2);
		let sent = transport.requests().into_iter().find(|r| r.route() == "Object/Get").unwrap();
		assert_eq!(sent.parameters["query"], "(GUID:a)");
	}

	#[tokio::test]
	async fn refresh_skips_a_primed_response_cache() {
		let transport = Arc::new(FakeTransport::new().with_session_routes("s-1"));
		transport.reply("Object", "Get", content(vec![json!({ "GUID": "a", "Title": "old" })]));
		let client = PortalClient::new(transport.clone(), settings());
		let registry = Arc::new(AttributeRegistry::new());

		let mut objects = client.get_objects(ObjectQuery::by_guid("a"), &registry).await.unwrap();
		let mut object = objects.remove(0);
		assert_eq!(object.get_str("Title").as_deref(), Some("old"));

		transport.clear_route("Object", "Get");
		transport.reply("Object", "Get", content(vec![json!({ "GUID": "a", "Title": "new" })]));
		object.refresh(&client).await.unwrap();

		assert_eq!(transport.count("Object", "Get"), 2);
		assert_eq!(object.get_str("Title").as_deref(), Some("new"));

		// The fresh response replaced the cached one.
		let again = client.get_objects(ObjectQuery::by_guid("a"), &registry).await.unwrap();
		assert_eq!(again[0].get_str("Title").as_deref(), Some("new"));
		assert_eq!(transport.count("Object", "Get"), 2);
	}

	#[tokio::test]
	async fn related_searches_by_score_and_drops_self() {
		let transport = Arc::new(FakeTransport::new().with_session_routes("s-1"));
		transport.reply(
			"Object",
			"Get",
			content(vec![json!({ "GUID": "b" }), json!({ "GUID": "a" }), json!({ "GUID": "c" })]),
		);
		let client = PortalClient::new(transport.clone(), settings());
		let registry = Arc::new(AttributeRegistry::new().with_attribute("kind", |_| json!("related")));
		let object = ContentObject::new(json!({ "GUID": "a" }), registry);

		let related = object.related(&client, "Text:harbour", 3).await.unwrap();

		let guids: Vec<_> = related.iter().map(|o| o.guid().unwrap_or_default()).collect();
		assert_eq!(guids, ["b", "c"]);
		assert_eq!(related[0].get_str("kind").as_deref(), Some("related"));

		let sent = transport.requests().into_iter().find(|r| r.route() == "Object/Get").unwrap();
		assert_eq!(sent.parameters["query"], "((Text:harbour))");
		assert_eq!(sent.parameters["sort"], "score desc");
		assert_eq!(sent.parameters["pageSize"], "3");
		assert_eq!(sent.parameters["pageIndex"], "0");
	}

	#[tokio::test]
	async fn refresh_without_guid_fails() {
		let transport = Arc::new(FakeTransport::new());
		let client = PortalClient::new(transport.clone(), Arc::new(MemorySettings::new()));
		let mut object = ContentObject::new(json!({}), Arc::new(AttributeRegistry::new()));

		assert!(object.refresh(&client).await.is_err());
		assert_eq!(transport.total(), 0);
	}
}
