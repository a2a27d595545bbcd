use axum::{
	Json, Router,
	extract::{Query, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use serde_json::Value;

use agora_service::{Error, SearchError, SearchRequest, SearchResponse};

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/v1/search", get(search_query).post(search_json))
		.with_state(state)
}

pub fn admin_router(state: AppState) -> Router {
	Router::new().route("/v1/admin/refresh_tags", post(refresh_tags)).with_state(state)
}

async fn health() -> StatusCode {
	StatusCode::OK
}

async fn search_query(
	State(state): State<AppState>,
	Query(pairs): Query<Vec<(String, String)>>,
) -> Result<Json<SearchResponse>, ApiError> {
	let request = request_from_pairs(pairs)?;
	let response = state.service.search(request).await?;

	Ok(Json(response))
}

async fn search_json(
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let request = request_from_json(payload)?;
	let response = state.service.search(request).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTagsResponse {
	tag_count: usize,
}

async fn refresh_tags(
	State(state): State<AppState>,
) -> Result<Json<RefreshTagsResponse>, ApiError> {
	let tag_count =
		state.service.refresh_tags().await.map_err(|err| ApiError::from_error(err, None))?;

	tracing::info!(tag_count, "Tag directory refreshed.");

	Ok(Json(RefreshTagsResponse { tag_count }))
}

/// Builds a request from query-string pairs. `tags` may be comma separated, repeated, or both;
/// for the other keys the last occurrence wins.
fn request_from_pairs(pairs: Vec<(String, String)>) -> Result<SearchRequest, ApiError> {
	let mut request = SearchRequest::default();
	let mut raw_page = None;

	for (key, value) in pairs {
		match key.as_str() {
			"q" => request.q = value,
			"tags" => request.tags.extend(
				value.split(',').map(str::trim).filter(|tag| !tag.is_empty()).map(str::to_string),
			),
			"page" => raw_page = Some(value),
			"orderBy" => request.order_by = Some(value),
			_ => {},
		}
	}

	if let Some(raw_page) = raw_page.filter(|raw| !raw.trim().is_empty()) {
		match raw_page.trim().parse::<i64>() {
			Ok(page) => request.page = Some(page),
			Err(_) => {
				let message = format!("page must be a positive integer, got {raw_page:?}.");

				return Err(ApiError::invalid_query(message, Some(request)));
			},
		}
	}

	Ok(request)
}

/// Decodes a JSON body. Ill-typed fields are `InvalidQuery`, echoing whatever parameters could be
/// read.
fn request_from_json(
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<SearchRequest, ApiError> {
	let Json(value) = payload.map_err(|rejection| {
		ApiError::invalid_query(
			format!("request body must be a JSON object: {}.", rejection.body_text()),
			None,
		)
	})?;

	serde_json::from_value::<SearchRequest>(value.clone()).map_err(|err| {
		ApiError::invalid_query(format!("malformed search request: {err}."), Some(lenient(&value)))
	})
}

fn lenient(value: &Value) -> SearchRequest {
	SearchRequest {
		q: value.get("q").and_then(Value::as_str).unwrap_or_default().to_string(),
		tags: value
			.get("tags")
			.and_then(Value::as_array)
			.map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
			.unwrap_or_default(),
		page: value.get("page").and_then(Value::as_i64),
		order_by: value.get("orderBy").and_then(Value::as_str).map(str::to_string),
	}
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: &'static str,
	message: String,
	search_params: Option<SearchRequest>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: &'static str,
	message: String,
	search_params: Option<SearchRequest>,
}
impl ApiError {
	fn from_error(err: Error, search_params: Option<SearchRequest>) -> Self {
		let (status, error_code) = match &err {
			Error::InvalidQuery { .. } => (StatusCode::BAD_REQUEST, "invalid_query"),
			Error::IndexUnavailable { .. } => (StatusCode::SERVICE_UNAVAILABLE, "index_unavailable"),
			Error::RetrievalTimeout { .. } => (StatusCode::GATEWAY_TIMEOUT, "retrieval_timeout"),
			Error::Storage { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
		};

		Self { status, error_code, message: err.to_string(), search_params }
	}

	fn invalid_query(message: String, search_params: Option<SearchRequest>) -> Self {
		Self::from_error(Error::InvalidQuery { message }, search_params)
	}
}
impl From<SearchError> for ApiError {
	fn from(err: SearchError) -> Self {
		Self::from_error(err.source, Some(err.request))
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			search_params: self.search_params,
		};

		(self.status, Json(body)).into_response()
	}
}
