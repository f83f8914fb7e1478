//! HTTP transport for the portal service.
//!
//! Every call is a form-encoded `POST {service_url}/{path}/{method}`. The
//! service is asked for JSON and for in-band errors (`userHTTPStatusCodes=False`),
//! so service failures arrive inside a 200 response and only genuine transport
//! faults surface as [`TransportError`].

use std::time::Duration;

use async_trait::async_trait;
use portal_protocol::ResultEnvelope;
use tracing::debug;
use url::Url;

use crate::error::{Result, TransportError};
use crate::transport::{Transport, TransportRequest};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`HttpTransport`].
#[derive(Debug, Clone)]
pub struct HttpTransportConfig {
	/// Base URL of the service, e.g. `https://api.example.org/v6`.
	pub service_url: String,
	/// Client identifier sent with every request when set.
	pub client_guid: Option<String>,
	pub request_timeout: Duration,
}

impl HttpTransportConfig {
	pub fn new(service_url: impl Into<String>) -> Self {
		Self {
			service_url: service_url.into(),
			client_guid: None,
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	pub fn with_client_guid(mut self, client_guid: Option<String>) -> Self {
		self.client_guid = client_guid;
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}
}

/// [`Transport`] over HTTP using `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
	client: reqwest::Client,
	base: Url,
	client_guid: Option<String>,
}

impl HttpTransport {
	pub fn new(config: HttpTransportConfig) -> Result<Self> {
		// Url::join drops the last segment unless the base ends with a slash.
		let mut raw = config.service_url.trim_end_matches('/').to_string();
		raw.push('/');
		let base = Url::parse(&raw)?;

		let client = reqwest::Client::builder().timeout(config.request_timeout).build()?;

		Ok(Self {
			client,
			base,
			client_guid: config.client_guid,
		})
	}

	/// Returns the URL a request for `path`/`method` is posted to.
	pub fn endpoint(&self, path: &str, method: &str) -> Result<Url> {
		Ok(self.base.join(&format!("{path}/{method}"))?)
	}

	fn form(&self, request: &TransportRequest) -> Vec<(String, String)> {
		let mut form: Vec<(String, String)> = request.parameters.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
		form.push(("format".into(), "json".into()));
		form.push(("userHTTPStatusCodes".into(), "False".into()));
		if let Some(session_id) = &request.session_id {
			form.push(("sessionGUID".into(), session_id.clone()));
		}
		if let Some(client_guid) = &self.client_guid {
			if !request.parameters.contains_key("clientGUID") {
				form.push(("clientGUID".into(), client_guid.clone()));
			}
		}
		form
	}
}

#[async_trait]
impl Transport for HttpTransport {
	async fn invoke(&self, request: &TransportRequest) -> Result<ResultEnvelope> {
		let url = self.endpoint(&request.path, &request.method)?;
		debug!(
			target: "portal.transport",
			route = %request.route(),
			has_session = request.session_id.is_some(),
			"posting service request"
		);

		let response = self
			.client
			.post(url)
			.form(&self.form(request))
			.send()
			.await
			.map_err(classify_send_error)?;

		let status = response.status();
		let body = response.text().await?;
		if !status.is_success() {
			return Err(TransportError::Status {
				status: status.as_u16(),
				body,
			});
		}

		Ok(serde_json::from_str(&body)?)
	}
}

fn classify_send_error(err: reqwest::Error) -> TransportError {
	if err.is_connect() || err.is_timeout() {
		TransportError::Unreachable(err.to_string())
	} else {
		TransportError::Http(err)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn endpoint_keeps_base_path() {
		let transport = HttpTransport::new(HttpTransportConfig::new("https://api.example.org/v6")).unwrap();
		assert_eq!(
			transport.endpoint("Object", "Get").unwrap().as_str(),
			"https://api.example.org/v6/Object/Get"
		);

		let trailing = HttpTransport::new(HttpTransportConfig::new("https://api.example.org/v6/")).unwrap();
		assert_eq!(
			trailing.endpoint("Session", "Create").unwrap().as_str(),
			"https://api.example.org/v6/Session/Create"
		);
	}

	#[test]
	fn invalid_url_is_rejected() {
		let err = HttpTransport::new(HttpTransportConfig::new("not a url")).unwrap_err();
		assert!(matches!(err, TransportError::InvalidUrl(_)));
	}

	#[test]
	fn form_adds_service_flags_and_session() {
		let transport = HttpTransport::new(
			HttpTransportConfig::new("http://localhost/v6").with_client_guid(Some("client-1".into())),
		)
		.unwrap();
		let request = TransportRequest::new("Object", "Get")
			.param("query", "foo")
			.with_session(Some("s-1".into()));

		let form = transport.form(&request);
		let has = |k: &str, v: &str| form.iter().any(|(fk, fv)| fk == k && fv == v);

		assert!(has("query", "foo"));
		assert!(has("format", "json"));
		assert!(has("userHTTPStatusCodes", "False"));
		assert!(has("sessionGUID", "s-1"));
		assert!(has("clientGUID", "client-1"));
	}

	#[test]
	fn form_omits_absent_session() {
		let transport = HttpTransport::new(HttpTransportConfig::new("http://localhost/v6")).unwrap();
		let form = transport.form(&TransportRequest::new("Session", "Create"));
		assert!(!form.iter().any(|(k, _)| k == "sessionGUID"));
		assert!(!form.iter().any(|(k, _)| k == "clientGUID"));
	}
}
