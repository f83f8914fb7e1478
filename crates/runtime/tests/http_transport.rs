//! HTTP transport against a local axum service.

use std::collections::HashMap;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Form, Json, Router};
use portal_runtime::{HttpTransport, HttpTransportConfig, Transport, TransportError, TransportRequest};
use serde_json::json;

async fn spawn_service(app: Router) -> String {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	tokio::spawn(async move {
		axum::serve(listener, app).await.unwrap();
	});
	format!("http://{addr}/v6")
}

async fn echo_object_get(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
	Json(json!({
		"Header": {"Duration": 3.0},
		"ModuleResults": [
			{"Fullname": "MCM", "Count": 1, "TotalCount": 1, "Results": [form]}
		]
	}))
}

fn transport(url: &str) -> HttpTransport {
	HttpTransport::new(HttpTransportConfig::new(url)).unwrap()
}

#[tokio::test]
async fn posts_form_and_decodes_envelope() {
	let app = Router::new().route("/v6/Object/Get", post(echo_object_get));
	let url = spawn_service(app).await;

	let request = TransportRequest::new("Object", "Get")
		.param("query", "GUID:abc")
		.with_session(Some("session-1".into()));
	let envelope = transport(&url).invoke(&request).await.unwrap();

	assert!(envelope.was_success());
	let echoed = &envelope.content_results()[0];
	assert_eq!(echoed["query"], "GUID:abc");
	assert_eq!(echoed["sessionGUID"], "session-1");
	assert_eq!(echoed["format"], "json");
	assert_eq!(echoed["userHTTPStatusCodes"], "False");
}

#[tokio::test]
async fn in_band_errors_are_not_transport_errors() {
	let app = Router::new().route(
		"/v6/Object/Get",
		post(|| async { Json(json!({"Error": {"Message": "Not authorized"}})) }),
	);
	let url = spawn_service(app).await;

	let envelope = transport(&url).invoke(&TransportRequest::new("Object", "Get")).await.unwrap();
	assert!(!envelope.was_success());
	assert_eq!(envelope.error.unwrap().message, "Not authorized");
}

#[tokio::test]
async fn http_failure_status_is_reported() {
	let app = Router::new().route(
		"/v6/Object/Get",
		post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
	);
	let url = spawn_service(app).await;

	let err = transport(&url).invoke(&TransportRequest::new("Object", "Get")).await.unwrap_err();
	match err {
		TransportError::Status { status, body } => {
			assert_eq!(status, 500);
			assert_eq!(body, "boom");
		}
		other => panic!("expected status error, got {other:?}"),
	}
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
	let app = Router::new().route("/v6/Object/Get", post(|| async { "not json" }));
	let url = spawn_service(app).await;

	let err = transport(&url).invoke(&TransportRequest::new("Object", "Get")).await.unwrap_err();
	assert!(matches!(err, TransportError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn refused_connection_is_unreachable() {
	let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);

	let err = transport(&format!("http://{addr}/v6"))
		.invoke(&TransportRequest::new("Session", "Create"))
		.await
		.unwrap_err();
	assert!(err.is_unreachable(), "{err:?}");
}
