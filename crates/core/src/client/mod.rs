//! Call dispatcher: the single entry point for every service call.
//!
//! [`PortalClient::call`] applies, in order:
//!
//! 1. access-point defaulting and global query constraints
//! 2. cache lookup by [`CallSignature`] fingerprint
//! 3. session resolution and the transport round trip (timed)
//! 4. envelope classification into an [`Outcome`]
//! 5. on session expiry, one session reset and one retry
//! 6. on success, cache write, time accounting, and observer notification

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, RwLock};
use portal_protocol::{CallSignature, Parameters, ResultEnvelope};
use portal_runtime::{Transport, TransportRequest};
use tracing::{debug, warn};

use crate::cache::{MemoryResponseCache, ResponseCache};
use crate::error::{Error, Result};
use crate::object::{AttributeRegistry, ContentObject};
use crate::observer::{CallEvent, CallObserver, ObserverId, ObserverRegistry};
use crate::options::ClientOptions;
use crate::outcome::{Classifier, Outcome};
use crate::query::ObjectQuery;
use crate::session::SessionManager;
use crate::settings::{SettingsStore, keys};


/// Parameter carrying the access point of a call.
pub const ACCESS_POINT_PARAM: &str = "accessPointGUID";

/// Joins query clauses.
const QUERY_CONJUNCTION: &str = "+AND+";

/// How a call chooses its access point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AccessPoint {
	/// Use the `accessPointGUID` parameter if given, else the configured default.
	#[default]
	Default,
	/// Use this access point.
	Explicit(String),
	/// Send no access point; the session's own scoping applies.
	Omit,
}

/// A call as requested by the caller, before defaulting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCall {
	pub path: String,
	pub method: String,
	pub parameters: Parameters,
	pub access_point: AccessPoint,
	pub requires_session: bool,
	/// Skips the cache lookup; a successful response is still written back.
	pub bypass_cache: bool,
}

impl ServiceCall {
	pub fn new(path: impl Into<String>, method: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			method: method.into(),
			parameters: Parameters::new(),
			access_point: AccessPoint::Default,
			requires_session: true,
			bypass_cache: false,
		}
	}

	pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.parameters.insert(key.into(), value.into());
		self
	}

	pub fn params<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
	where
		K: Into<String>,
		V: Into<String>,
	{
		self.parameters.extend(pairs.into_iter().map(|(k, v)| (k.into(), v.into())));
		self
	}

	pub fn access_point(mut self, access_point: AccessPoint) -> Self {
		self.access_point = access_point;
		self
	}

	pub fn requires_session(mut self, requires_session: bool) -> Self {
		self.requires_session = requires_session;
		self
	}

	pub fn bypass_cache(mut self, bypass_cache: bool) -> Self {
		self.bypass_cache = bypass_cache;
		self
	}
}

/// Builder for [`PortalClient`].
pub struct PortalClientBuilder {
	transport: Arc<dyn Transport>,
	settings: Arc<dyn SettingsStore>,
	cache: Option<Arc<dyn ResponseCache>>,
	options: ClientOptions,
}

impl PortalClientBuilder {
	/// Uses a shared response cache instead of a private in-memory one.
	pub fn cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
		self.cache = Some(cache);
		self
	}

	pub fn options(mut self, options: ClientOptions) -> Self {
		self.options = options;
		self
	}

	pub fn build(self) -> PortalClient {
		let Self {
			transport,
			settings,
			cache,
			options,
		} = self;

		PortalClient {
			sessions: SessionManager::new(Arc::clone(&transport), Arc::clone(&settings), &options),
			classifier: Classifier::new(&options),
			cache: cache.unwrap_or_else(|| Arc::new(MemoryResponseCache::new())),
			cache_ttl: options.cache_ttl,
			cache_responses: AtomicBool::new(options.cache_responses),
			accumulated: Mutex::new(Duration::ZERO),
			constraints: RwLock::new(Vec::new()),
			observers: ObserverRegistry::default(),
			transport,
			settings,
		}
	}
}

/// Session-managed, caching client for the portal service.
pub struct PortalClient {
	transport: Arc<dyn Transport>,
	settings: Arc<dyn SettingsStore>,
	sessions: SessionManager,
	cache: Arc<dyn ResponseCache>,
	classifier: Classifier,
	cache_ttl: Duration,
	cache_responses: AtomicBool,
	accumulated: Mutex<Duration>,
	constraints: RwLock<Vec<String>>,
	observers: ObserverRegistry,
}

impl PortalClient {
	pub fn builder(transport: Arc<dyn Transport>, settings: Arc<dyn SettingsStore>) -> PortalClientBuilder {
		PortalClientBuilder {
			transport,
			settings,
			cache: None,
			options: ClientOptions::default(),
		}
	}

	/// Client with default options and a private in-memory cache.
	pub fn new(transport: Arc<dyn Transport>, settings: Arc<dyn SettingsStore>) -> Self {
		Self::builder(transport, settings).build()
	}

	pub fn sessions(&self) -> &SessionManager {
		&self.sessions
	}

	/// Total wall-clock time spent in uncached transport calls.
	pub fn accumulated_response_time(&self) -> Duration {
		*self.accumulated.lock()
	}

	pub fn cache_responses(&self) -> bool {
		self.cache_responses.load(Ordering::Relaxed)
	}

	/// Enables or disables serving and storing cached responses.
	pub fn set_cache_responses(&self, enabled: bool) {
		self.cache_responses.store(enabled, Ordering::Relaxed);
	}

	/// ANDs `constraint` onto the query of every subsequent call.
	pub fn add_global_constraint(&self, constraint: impl AsRef<str>) {
		self.constraints.write().push(format!("({})", constraint.as_ref()));
	}

	pub fn global_constraints(&self) -> Vec<String> {
		self.constraints.read().clone()
	}

	pub fn add_observer(&self, observer: Arc<dyn CallObserver>) -> ObserverId {
		self.observers.add(observer)
	}

	pub fn remove_observer(&self, id: ObserverId) -> bool {
		self.observers.remove(id)
	}

	/// Performs a call, serving it from cache when possible.
	///
	/// A call with `bypass_cache` set forces a round trip whose result replaces
	/// the cached entry.
	///
	/// A sub-section reporting an expired session triggers one session reset
	/// and one retry; a second expiry is returned as [`Error::Service`].
	pub async fn call(&self, call: ServiceCall) -> Result<ResultEnvelope> {
		let parameters = self.prepare_parameters(&call)?;
		let key = CallSignature {
			path: &call.path,
			method: &call.method,
			parameters: &parameters,
			requires_session: call.requires_session,
		}
		.fingerprint();

		if self.cache_responses() && !call.bypass_cache {
			if let Some(cached) = self.cache.get(&key) {
				debug!(target: "portal.client", path = %call.path, method = %call.method, "served from cache");
				self.emit(&call, parameters, cached.clone(), Duration::ZERO, true);
				return Ok(cached);
			}
		}

		let mut retried = false;
		let mut spent = Duration::ZERO;
		loop {
			let started = Instant::now();
			let response = self.dispatch(&call, &parameters).await?;
			let elapsed = started.elapsed();
			spent += elapsed;
			debug!(
				target: "portal.client",
				path = %call.path,
				method = %call.method,
				elapsed_ms = elapsed.as_millis() as u64,
				retried,
				"call returned"
			);

			match self.classifier.classify(&response) {
				Outcome::Success => {
					if self.cache_responses() {
						self.cache.set(&key, response.clone(), self.cache_ttl);
					}
					// Covers the rejected attempt too when the call was retried.
					*self.accumulated.lock() += spent;
					self.emit(&call, parameters, response.clone(), spent, false);
					return Ok(response);
				}
				Outcome::Retryable(expired) if !retried => {
					warn!(
						target: "portal.client",
						path = %call.path,
						method = %call.method,
						section = %expired.section,
						"session rejected by service; resetting and retrying once"
					);
					self.sessions.reset().await?;
					retried = true;
				}
				Outcome::Retryable(expired) => return Err(Error::Service(expired.message)),
				Outcome::Fatal(err) => return Err(err),
			}
		}
	}

	/// Runs an `Object/Get` query and wraps every returned object.
	pub async fn get_objects(&self, query: ObjectQuery, registry: &Arc<AttributeRegistry>) -> Result<Vec<ContentObject>> {
		let envelope = self.call(query.into_call()).await?;
		Ok(ContentObject::parse_response(&envelope, registry))
	}

	async fn dispatch(&self, call: &ServiceCall, parameters: &Parameters) -> Result<ResultEnvelope> {
		let session_id = if call.requires_session {
			Some(self.sessions.session_id().await?)
		} else {
			None
		};

		let request = TransportRequest::new(call.path.clone(), call.method.clone())
			.with_parameters(parameters.clone())
			.with_session(session_id);
		Ok(self.transport.invoke(&request).await?)
	}

	fn prepare_parameters(&self, call: &ServiceCall) -> Result<Parameters> {
		let mut parameters = call.parameters.clone();

		match &call.access_point {
			AccessPoint::Omit => {
				parameters.remove(ACCESS_POINT_PARAM);
			}
			AccessPoint::Explicit(guid) => {
				parameters.insert(ACCESS_POINT_PARAM.to_string(), guid.clone());
			}
			AccessPoint::Default => {
				let given = parameters.get(ACCESS_POINT_PARAM).is_some_and(|v| !v.is_empty());
				if !given {
					let guid = self.settings.get_non_empty(keys::ACCESS_POINT_GUID)?.ok_or_else(|| {
						Error::Configuration(format!(
							"no access point configured; set `{}` or pass one explicitly",
							keys::ACCESS_POINT_GUID
						))
					})?;
					parameters.insert(ACCESS_POINT_PARAM.to_string(), guid);
				}
			}
		}

		self.apply_constraints(&mut parameters);
		Ok(parameters)
	}

	fn apply_constraints(&self, parameters: &mut Parameters) {
		let constraints = self.constraints.read();
		let query = parameters.get("query").filter(|q| !q.is_empty());
		if query.is_none() && constraints.is_empty() {
			return;
		}

		let clauses: Vec<String> = query
			.map(|q| format!("({q})"))
			.into_iter()
			.chain(constraints.iter().cloned())
			.collect();
		parameters.insert("query".to_string(), clauses.join(QUERY_CONJUNCTION));
	}

	fn emit(&self, call: &ServiceCall, parameters: Parameters, response: ResultEnvelope, duration: Duration, cached: bool) {
		self.observers.emit(&CallEvent {
			path: call.path.clone(),
			method: call.method.clone(),
			parameters,
			response,
			duration,
			cached,
		});
	}
}
