use axum::{
	Json, Router,
	body::Body,
	extract::{Request, State, rejection::JsonRejection},
	http::{HeaderMap, StatusCode, header::AUTHORIZATION},
	middleware::{self, Next},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use cite_domain::{PromptParams, Session};
use cite_service::{
	Error, IngestRequest, IngestResponse, SearchRequest, SearchResponse, TrackRequest,
	TrackResponse,
};

use crate::state::AppState;

/// Identity of the caller, set by the upstream authentication layer.
pub const HEADER_USER: &str = "x-cite-user";

pub fn router(state: AppState) -> Router {
	let v1 = Router::new()
		.route("/v1/chat/transform", post(transform))
		.route("/v1/search", post(search))
		.route("/v1/citations/track", post(track_citations))
		.route("/v1/chunks", post(ingest))
		.layer(middleware::from_fn_with_state(state.clone(), api_auth_middleware));

	Router::new().route("/health", get(health)).merge(v1).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn transform(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<PromptParams>, JsonRejection>,
) -> Result<Json<PromptParams>, ApiError> {
	let Json(params) = payload?;
	let session = read_session(&headers);
	let response = state.service.transform(params, session.as_ref()).await;

	Ok(Json(response))
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let session = require_session(&headers)?;
	let Json(req) = payload?;
	let response = state.service.search(&session, req).await?;

	Ok(Json(response))
}

async fn track_citations(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<TrackRequest>, JsonRejection>,
) -> Result<Json<TrackResponse>, ApiError> {
	require_session(&headers)?;

	let Json(req) = payload?;

	Ok(Json(state.service.track_citations(req)))
}

async fn ingest(
	State(state): State<AppState>,
	headers: HeaderMap,
	payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, ApiError> {
	let session = require_session(&headers)?;
	let Json(req) = payload?;
	let response = state.service.ingest(&session, req).await?;

	Ok(Json(response))
}

async fn api_auth_middleware(
	State(state): State<AppState>,
	req: Request<Body>,
	next: Next,
) -> Response {
	if let Some(expected) = state.service.cfg.security.api_auth_token.as_deref()
		&& read_bearer_token(req.headers()) != Some(expected)
	{
		return ApiError::new(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			"A valid Bearer token is required.",
		)
		.into_response();
	}

	next.run(req).await
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

fn read_session(headers: &HeaderMap) -> Option<Session> {
	let raw = headers.get(HEADER_USER)?.to_str().ok()?.trim();

	if raw.is_empty() { None } else { Some(Session::new(raw)) }
}

fn require_session(headers: &HeaderMap) -> Result<Session, ApiError> {
	read_session(headers).ok_or_else(|| {
		ApiError::new(
			StatusCode::UNAUTHORIZED,
			"unauthorized",
			format!("Missing {HEADER_USER} header."),
		)
	})
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into() }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::InvalidRequest { message } =>
				ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", message),
			Error::Provider { message } => {
				tracing::error!(error = %message, "Provider call failed.");

				ApiError::new(StatusCode::BAD_GATEWAY, "provider_error", message)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Chunk store call failed.");

				ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "storage_error", message)
			},
			Error::Timeout { elapsed_ms } => ApiError::new(
				StatusCode::GATEWAY_TIMEOUT,
				"timeout",
				format!("Request exceeded {elapsed_ms} ms."),
			),
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(err: JsonRejection) -> Self {
		ApiError::new(StatusCode::BAD_REQUEST, "invalid_request", err.body_text())
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody { error_code: self.error_code, message: self.message };

		(self.status, Json(body)).into_response()
	}
}
