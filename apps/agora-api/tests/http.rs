use std::{sync::Arc, time::Duration};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use agora_api::{routes, state::AppState};
use agora_testkit::{MemoryStore, PostFixture};

fn store() -> Arc<MemoryStore> {
	Arc::new(MemoryStore::with_posts((1..=25).map(|post_id| {
		let tags: &[&str] = if post_id % 2 == 0 { &["web", "rust"] } else { &["rust"] };

		PostFixture::new(post_id, format!("Async Rust, episode {post_id}"))
			.content("<p>Futures and executors.</p>")
			.published_at(1_700_000_000 + post_id * 60)
			.likes(post_id % 4)
			.tags(tags)
	})))
}

fn state(store: Arc<MemoryStore>) -> AppState {
	AppState::with_store(agora_testkit::test_config(""), store)
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
	let response = app.oneshot(request).await.expect("Failed to call route.");
	let status = response.status();
	let bytes =
		body::to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body.");
	let json = if bytes.is_empty() {
		Value::Null
	} else {
		serde_json::from_slice(&bytes).expect("Failed to parse response body.")
	};

	(status, json)
}

fn get(uri: &str) -> Request<Body> {
	Request::builder().method("GET").uri(uri).body(Body::empty()).expect("Failed to build request.")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
	Request::builder()
		.method("POST")
		.uri(uri)
		.header("content-type", "application/json")
		.body(Body::from(body.to_string()))
		.expect("Failed to build request.")
}

#[tokio::test]
async fn health_is_ok() {
	let (status, _) = send(routes::router(state(store())), get("/health")).await;

	assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn get_search_returns_meta_and_results() {
	let app = routes::router(state(store()));
	let (status, json) =
		send(app, get("/v1/search?q=Async&tags=web,rust&page=2&orderBy=timeAsc")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["meta"]["totalCount"], 12);
	assert_eq!(json["meta"]["totalPages"], 2);
	assert_eq!(json["meta"]["searchParams"]["tags"], serde_json::json!(["web", "rust"]));
	assert_eq!(json["meta"]["searchParams"]["orderBy"], "timeAsc");
	// Equal counts fall back to tag id, and `rust` was created first.
	assert_eq!(json["meta"]["tags"][0]["tagName"], "rust");
	assert_eq!(json["meta"]["tags"][1]["tagName"], "web");
	assert_eq!(json["meta"]["tags"][1]["count"], 12);

	let results = json["results"].as_array().expect("results must be an array");

	assert_eq!(results.len(), 2);
	assert_eq!(results[0]["postId"], 22);
	assert_eq!(results[1]["postId"], 24);
	assert_eq!(results[0]["postDateUtc"], "2023-11-14T22:35:20Z");
	assert_eq!(results[0]["countComments"], 0);
	assert!(results[0].get("ogImageUrl").is_none());
}

#[tokio::test]
async fn repeated_tag_parameters_are_combined() {
	let app = routes::router(state(store()));
	let (status, json) = send(app, get("/v1/search?tags=web&tags=rust&tags=")).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["meta"]["totalCount"], 12);
	assert_eq!(json["results"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn post_search_accepts_json_bodies() {
	let app = routes::router(state(store()));
	let (status, json) = send(
		app,
		post_json("/v1/search", serde_json::json!({ "q": "episode", "orderBy": "likes" })),
	)
	.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["meta"]["totalCount"], 25);
	assert_eq!(json["meta"]["searchParams"]["page"], 1);
	assert_eq!(json["results"][0]["countLikes"], 3);
}

#[tokio::test]
async fn invalid_page_is_a_bad_request() {
	for uri in ["/v1/search?page=0", "/v1/search?page=abc"] {
		let app = routes::router(state(store()));
		let (status, json) = send(app, get(uri)).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
		assert_eq!(json["error_code"], "invalid_query", "{uri}");
		assert!(json["search_params"].is_object(), "{uri}");
	}
}

#[tokio::test]
async fn unknown_order_is_a_bad_request() {
	let app = routes::router(state(store()));
	let (status, json) =
		send(app, post_json("/v1/search", serde_json::json!({ "orderBy": "hot" }))).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["search_params"]["orderBy"], "hot");
}

#[tokio::test]
async fn ill_typed_json_body_is_a_bad_request() {
	for body in [
		serde_json::json!({ "page": "abc" }),
		serde_json::json!({ "page": 1.5 }),
		serde_json::json!({ "orderBy": 3, "q": "Async" }),
	] {
		let app = routes::router(state(store()));
		let (status, json) = send(app, post_json("/v1/search", body.clone())).await;

		assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
		assert_eq!(json["error_code"], "invalid_query", "{body}");
		assert!(json["search_params"].is_object(), "{body}");
	}
}

#[tokio::test]
async fn unparsable_json_body_is_a_bad_request() {
	let request = Request::builder()
		.method("POST")
		.uri("/v1/search")
		.header("content-type", "application/json")
		.body(Body::from("{\"page\":"))
		.expect("Failed to build request.");
	let (status, json) = send(routes::router(state(store())), request).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
	assert_eq!(json["error_code"], "invalid_query");
	assert!(json["search_params"].is_null());
}

#[tokio::test]
async fn missing_index_maps_to_service_unavailable() {
	let store = store();

	store.set_full_text_available(false);

	let (status, json) = send(routes::router(state(store)), get("/v1/search?q=Async")).await;

	assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
	assert_eq!(json["error_code"], "index_unavailable");
	assert_eq!(json["search_params"]["q"], "Async");
}

#[tokio::test]
async fn slow_storage_maps_to_gateway_timeout() {
	let store = store();
	let mut cfg = agora_testkit::test_config("");

	cfg.search.timeout_ms = 20;
	store.set_latency(Some(Duration::from_millis(200)));

	let app = routes::router(AppState::with_store(cfg, store));
	let (status, json) = send(app, get("/v1/search")).await;

	assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
	assert_eq!(json["error_code"], "retrieval_timeout");
}

#[tokio::test]
async fn admin_refresh_reports_tag_count() {
	let store = store();
	let state = state(store.clone());

	store.insert_post(PostFixture::new(100, "Borrowing").tags(&["lifetimes"]));

	let (status, json) =
		send(routes::admin_router(state.clone()), post_json("/v1/admin/refresh_tags", Value::Null))
			.await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(json["tagCount"], 3);

	let (_, json) = send(routes::router(state), get("/v1/search?tags=lifetimes")).await;

	assert_eq!(json["meta"]["totalCount"], 1);
	assert_eq!(json["results"][0]["postTitle"], "Borrowing");
}

#[tokio::test]
async fn admin_routes_are_not_public() {
	let app = routes::router(state(store()));
	let (status, _) = send(app, post_json("/v1/admin/refresh_tags", Value::Null)).await;

	assert_eq!(status, StatusCode::NOT_FOUND);
}
