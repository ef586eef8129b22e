use std::sync::Arc;

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use cite_api::{routes, state::AppState};
use cite_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use cite_service::{
	BoxFuture, CiteService, ClassifierProvider, EmbeddingProvider, GeneratorProvider, Providers,
};
use cite_testkit::{MemoryChunkStore, chunk};

const USER: &str = "ada@example.org";

struct FixedEmbedding {
	fail: bool,
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, cite_providers::Result<Vec<Vec<f32>>>> {
		let result = if self.fail {
			Err(cite_providers::Error::InvalidResponse { message: "Upstream is down.".to_string() })
		} else {
			Ok(vec![vec![1.0, 0.0]; texts.len()])
		};

		Box::pin(async move { result })
	}
}

struct EchoGenerator;
impl GeneratorProvider for EchoGenerator {
	fn generate<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_system: &'a str,
		prompt: &'a str,
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		Box::pin(async move { Ok(prompt.to_string()) })
	}
}

struct QuestionClassifier;
impl ClassifierProvider for QuestionClassifier {
	fn classify<'a>(
		&'a self,
		_cfg: &'a LlmProviderConfig,
		_text: &'a str,
		_labels: &'a [&'a str],
	) -> BoxFuture<'a, cite_providers::Result<String>> {
		Box::pin(async { Ok("question".to_string()) })
	}
}

fn test_app(configure: impl FnOnce(&mut Config), fail_embedding: bool) -> Router {
	let mut cfg = cite_testkit::sample_config(2);

	configure(&mut cfg);

	let store = MemoryChunkStore::with_chunks(vec![
		chunk("a0", &format!("{USER}/beans.pdf"), vec![1.0, 0.0]),
		chunk("a1", &format!("{USER}/beans.pdf"), vec![0.0, 1.0]),
	]);
	let providers = Providers::new(
		Arc::new(FixedEmbedding { fail: fail_embedding }),
		Arc::new(EchoGenerator),
		Arc::new(QuestionClassifier),
	);
	let service = CiteService::with_providers(cfg, Arc::new(store), providers);

	routes::router(AppState::from_service(service))
}

fn post_json(uri: &str, user: Option<&str>, payload: &Value) -> Request<Body> {
	let mut builder =
		Request::builder().method("POST").uri(uri).header("content-type", "application/json");

	if let Some(user) = user {
		builder = builder.header(routes::HEADER_USER, user);
	}

	builder.body(Body::from(payload.to_string())).expect("Failed to build request.")
}

fn health_request() -> Request<Body> {
	Request::builder().uri("/health").body(Body::empty()).expect("Failed to build request.")
}

async fn read_json(response: axum::response::Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let app = test_app(|_| {}, false);
	let response = app
		.oneshot(health_request())
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn transform_augments_for_a_session() {
	let app = test_app(|_| {}, false);
	let payload = serde_json::json!({
		"prompt": [{
			"role": "user",
			"content": [{ "type": "text", "text": "Which crops fix nitrogen?" }]
		}],
		"provider_metadata": { "files": { "selection": ["beans.pdf"] } }
	});
	let response = app
		.oneshot(post_json("/v1/chat/transform", Some(USER), &payload))
		.await
		.expect("Failed to call transform.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;
	let parts = json["prompt"][0]["content"].as_array().expect("Content should be an array.");

	assert_eq!(parts.len(), 1 + 1 + 2);
	assert_eq!(parts[1]["type"], "text");
	assert!(
		parts[2]["text"]
			.as_str()
			.is_some_and(|text| text.starts_with("[CHUNK 1]\nSource: doc-a0\n"))
	);
}

#[tokio::test]
async fn transform_without_session_is_a_pass_through() {
	let app = test_app(|_| {}, false);
	let payload = serde_json::json!({
		"prompt": [{
			"role": "user",
			"content": [{ "type": "text", "text": "Which crops fix nitrogen?" }]
		}],
		"provider_metadata": { "files": { "selection": ["beans.pdf"] } }
	});
	let response = app
		.oneshot(post_json("/v1/chat/transform", None, &payload))
		.await
		.expect("Failed to call transform.");

	assert_eq!(response.status(), StatusCode::OK);
	assert_eq!(read_json(response).await, payload);
}

#[tokio::test]
async fn search_requires_a_session() {
	let app = test_app(|_| {}, false);
	let response = app
		.oneshot(post_json("/v1/search", None, &serde_json::json!({ "query": "nitrogen" })))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
	assert_eq!(read_json(response).await["error_code"], "unauthorized");
}

#[tokio::test]
async fn search_returns_snake_case_results() {
	let app = test_app(|_| {}, false);
	let response = app
		.oneshot(post_json("/v1/search", Some(USER), &serde_json::json!({ "query": "nitrogen" })))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["query"], "nitrogen");
	assert_eq!(json["total_found"], 1);
	assert_eq!(json["results"][0]["id"], "a0");
	assert_eq!(json["results"][0]["source_doc_id"], "doc-a0");
	assert_eq!(json["results"][0]["usage_count"], 0);
	assert_eq!(json["results"][0]["text"], "Content of a0.");
}

#[tokio::test]
async fn search_rejects_invalid_queries() {
	for payload in [
		serde_json::json!({}),
		serde_json::json!({ "query": 7 }),
		serde_json::json!({ "query": "  " }),
		serde_json::json!({ "query": "nitrogen", "k": 0 }),
	] {
		let response = test_app(|_| {}, false)
			.oneshot(post_json("/v1/search", Some(USER), &payload))
			.await
			.expect("Failed to call search.");

		assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
		assert_eq!(read_json(response).await["error_code"], "invalid_request");
	}
}

#[tokio::test]
async fn malformed_bodies_are_bad_requests() {
	let app = test_app(|_| {}, false);
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search")
		.header("content-type", "application/json")
		.header(routes::HEADER_USER, USER)
		.body(Body::from("{not json"))
		.expect("Failed to build request.");
	let response = app.oneshot(request).await.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_failures_map_to_bad_gateway() {
	let app = test_app(|_| {}, true);
	let response = app
		.oneshot(post_json("/v1/search", Some(USER), &serde_json::json!({ "query": "nitrogen" })))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert_eq!(read_json(response).await["error_code"], "provider_error");
}

#[tokio::test]
async fn track_returns_citations_and_usage() {
	let app = test_app(|_| {}, false);
	let payload = serde_json::json!({
		"response_text": "Yes [Source: velvet_bean_guide.pdf - Benefits](https://example.com/v.pdf).",
		"usage": []
	});
	let response = app
		.oneshot(post_json("/v1/citations/track", Some(USER), &payload))
		.await
		.expect("Failed to call track.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["citations"][0]["section_heading"], "Benefits");
	assert_eq!(json["usage"][0]["source_doc_id"], "velvet_bean_guide.pdf");
	assert_eq!(json["usage"][0]["usage_count"], 1);
}

#[tokio::test]
async fn ingest_reports_added_chunks() {
	let app = test_app(|_| {}, false);
	let payload = serde_json::json!({
		"file_path": "soil.pdf",
		"chunks": [
			{ "text": "Porosity drives infiltration.", "section_heading": "Methods" },
			{ "text": "Organic matter improves structure.", "publish_year": 2023 }
		]
	});
	let response = app
		.oneshot(post_json("/v1/chunks", Some(USER), &payload))
		.await
		.expect("Failed to call ingest.");

	assert_eq!(response.status(), StatusCode::OK);

	let json = read_json(response).await;

	assert_eq!(json["scope_key"], "ada@example.org/soil.pdf");
	assert_eq!(json["chunks_added"], 2);
}

#[tokio::test]
async fn api_token_guards_v1_routes_only() {
	let configure = |cfg: &mut Config| cfg.security.api_auth_token = Some("s3cret".to_string());
	let payload = serde_json::json!({ "query": "nitrogen" });
	let response = test_app(configure, false)
		.oneshot(post_json("/v1/search", Some(USER), &payload))
		.await
		.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

	let mut request = post_json("/v1/search", Some(USER), &payload);

	request.headers_mut().insert(
		axum::http::header::AUTHORIZATION,
		"Bearer s3cret".parse().expect("Failed to parse header value."),
	);

	let response =
		test_app(configure, false).oneshot(request).await.expect("Failed to call search.");

	assert_eq!(response.status(), StatusCode::OK);

	let response = test_app(configure, false)
		.oneshot(health_request())
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}
