use std::{collections::BTreeMap, sync::Arc};

use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode},
	response::Response,
};
use serde_json::{Map, Value};
use tower::util::ServiceExt;

use nav_api::{routes, state::AppState};
use nav_config::{
	AppToken, Config, Documents, Engine, Pagination, Postgres, Search, Security, Service, Storage,
};
use nav_domain::geography::{Geography, GeographyTree};
use nav_engine::{EngineHit, EngineQuery, EngineResponse, HitFields, PassageHit};
use nav_service::{Backends, BoxFuture, CatalogStore, SearchEngine};
use nav_storage::catalog::{CatalogSnapshot, DocumentRecord, FamilyRecord, PublicationStatus};

const CORPUS: &str = "CCLW.corpus.i00000001.n0000";

struct StubEngine {
	fail: bool,
}
impl SearchEngine for StubEngine {
	fn search<'a>(
		&'a self,
		_query: &'a EngineQuery,
	) -> BoxFuture<'a, nav_engine::Result<EngineResponse>> {
		let result = if self.fail {
			Err(nav_engine::Error::InvalidResponse {
				message: "Engine returned 500 Internal Server Error.".to_string(),
			})
		} else {
			Ok(EngineResponse {
				total_family_hits: 1,
				query_time_ms: 3,
				passage_totals: BTreeMap::from([("CCLW.family.1001.0".to_string(), 1)]),
				hits: vec![EngineHit::Passage(PassageHit {
					fields: HitFields {
						family_import_id: Some("CCLW.family.1001.0".to_string()),
						family_slug: Some("italian-climate-law".to_string()),
						family_name: Some("Italian Climate Law".to_string()),
						family_description: Some("Sets national targets.".to_string()),
						family_category: Some("Legislative".to_string()),
						family_source: Some("CCLW".to_string()),
						family_geographies: Some(vec!["ITA".to_string()]),
						corpus_import_id: Some(CORPUS.to_string()),
						corpus_type_name: Some("Laws and Policies".to_string()),
						document_import_id: Some("CCLW.document.1001.0".to_string()),
						document_slug: Some("italian-climate-law-act".to_string()),
						..Default::default()
					},
					text_block: "The Republic commits to net zero.".to_string(),
					text_block_id: "p0_b4".to_string(),
					text_block_page: Some(0),
					text_block_coords: None,
					text_block_type: "Text".to_string(),
					concepts: Vec::new(),
				})],
				continuation_token: None,
				prev_continuation_token: None,
			})
		};

		Box::pin(async move { result })
	}
}

struct StubCatalog;
impl CatalogStore for StubCatalog {
	fn snapshot<'a>(
		&'a self,
		_document_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<CatalogSnapshot>> {
		let mut snapshot = CatalogSnapshot::default();

		snapshot.insert_family(FamilyRecord {
			import_id: "CCLW.family.1001.0".to_string(),
			status: PublicationStatus::Published,
			published_date: None,
			last_updated_date: None,
			metadata: serde_json::json!({}),
		});
		snapshot.insert_document(DocumentRecord {
			import_id: "CCLW.document.1001.0".to_string(),
			family_import_id: "CCLW.family.1001.0".to_string(),
			status: PublicationStatus::Published,
			title: "Italian Climate Law".to_string(),
			slug: None,
			postfix: None,
			content_type: Some("application/pdf".to_string()),
			document_type: Some("Law".to_string()),
			source_url: None,
			cdn_object: None,
		});

		Box::pin(async move { Ok(snapshot) })
	}

	fn known_corpora<'a>(
		&'a self,
		corpus_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<Vec<String>>> {
		let known = corpus_ids.iter().filter(|id| *id == CORPUS).cloned().collect();

		Box::pin(async move { Ok(known) })
	}
}

fn test_config() -> Config {
	Config {
		service: Service { http_bind: "127.0.0.1:0".to_string(), log_level: "info".to_string() },
		storage: Storage {
			postgres: Postgres {
				dsn: "postgres://navigator@127.0.0.1/navigator".to_string(),
				pool_max_conns: 1,
			},
		},
		engine: Engine {
			api_base: "http://127.0.0.1:1".to_string(),
			path: "/search".to_string(),
			api_key: None,
			timeout_ms: 1_000,
			default_headers: Map::new(),
		},
		search: Search {
			max_page_window: 500,
			max_limit: 500,
			max_hits_per_family: 500,
			default_page_size: 10,
			default_limit: 100,
			default_max_hits_per_family: 10,
		},
		pagination: Pagination { token_secret: "0123456789abcdef0123456789abcdef".to_string() },
		documents: Documents {
			cdn_domain: "cdn.example.org".to_string(),
			hidden_source_url_patterns: vec![r"climate-laws\.org".to_string()],
		},
		security: Security {
			app_tokens: vec![
				AppToken {
					token: "public-token".to_string(),
					allowed_corpora: vec![CORPUS.to_string()],
				},
				AppToken { token: "internal-token".to_string(), allowed_corpora: Vec::new() },
				AppToken {
					token: "stale-token".to_string(),
					allowed_corpora: vec!["Retired.corpus.0.0".to_string()],
				},
			],
		},
	}
}

fn geographies() -> GeographyTree {
	GeographyTree::new(vec![
		Geography {
			id: 1,
			value: "Europe & Central Asia".to_string(),
			slug: "europe-central-asia".to_string(),
			display_value: "Europe & Central Asia".to_string(),
			parent_id: None,
		},
		Geography {
			id: 2,
			value: "ITA".to_string(),
			slug: "italy".to_string(),
			display_value: "Italy".to_string(),
			parent_id: Some(1),
		},
	])
}

fn app(fail_engine: bool) -> Router {
	let backends = Backends {
		engine: Arc::new(StubEngine { fail: fail_engine }),
		catalog: Arc::new(StubCatalog),
	};
	let state = AppState::with_backends(test_config(), geographies(), backends)
		.expect("Failed to initialize app state.");

	routes::router(state)
}

async fn post_search(app: Router, token: Option<&str>, payload: Value) -> Response {
	let mut builder = Request::builder()
		.method("POST")
		.uri("/api/v1/searches")
		.header("content-type", "application/json");

	if let Some(token) = token {
		builder = builder.header("app-token", token);
	}

	app.oneshot(builder.body(Body::from(payload.to_string())).expect("Failed to build request."))
		.await
		.expect("Failed to call /api/v1/searches.")
}

async fn json_body(response: Response) -> Value {
	let body = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Failed to read response body.");

	serde_json::from_slice(&body).expect("Failed to parse response.")
}

#[tokio::test]
async fn health_ok() {
	let response = app(false)
		.oneshot(Request::builder().uri("/health").body(Body::empty()).expect("Failed to build."))
		.await
		.expect("Failed to call /health.");

	assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn search_returns_assembled_families() {
	let response = post_search(
		app(false),
		Some("public-token"),
		serde_json::json!({
			"query_string": "net zero",
			"keyword_filters": { "regions": ["europe-central-asia"], "countries": ["ITA"] }
		}),
	)
	.await;

	assert_eq!(response.status(), StatusCode::OK);
	assert!(response.headers().contains_key(routes::HEADER_REQUEST_ID));

	let json = json_body(response).await;

	assert_eq!(json["total_family_hits"], 1);
	assert_eq!(json["families"][0]["family_name"], "Italian Climate Law");

	let document = &json["families"][0]["family_documents"][0];

	assert_eq!(document["document_title"], "Italian Climate Law");
	assert_eq!(document["document_passage_matches"][0]["text_block_page"], 1);
}

#[tokio::test]
async fn search_requires_a_known_app_token() {
	for token in [None, Some("unknown-token")] {
		let response =
			post_search(app(false), token, serde_json::json!({ "query_string": "law" })).await;

		assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
		assert_eq!(json_body(response).await["error_code"], "UNAUTHORIZED");
	}
}

#[tokio::test]
async fn unknown_filter_keys_are_unprocessable() {
	let response = post_search(
		app(false),
		Some("internal-token"),
		serde_json::json!({ "query_string": "law", "keyword_filters": { "planets": ["mars"] } }),
	)
	.await;

	assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "INVALID_REQUEST");
	assert_eq!(json["retryable"], false);
}

#[tokio::test]
async fn corpora_outside_the_token_are_forbidden() {
	let response = post_search(
		app(false),
		Some("public-token"),
		serde_json::json!({
			"query_string": "law",
			"corpus_import_ids": ["UNFCCC.corpus.i00000001.n0000"]
		}),
	)
	.await;

	assert_eq!(response.status(), StatusCode::FORBIDDEN);
	assert_eq!(json_body(response).await["error_code"], "FORBIDDEN");
}

#[tokio::test]
async fn tokens_naming_no_known_corpora_are_bad_requests() {
	let response =
		post_search(app(false), Some("stale-token"), serde_json::json!({ "query_string": "law" }))
			.await;

	assert_eq!(response.status(), StatusCode::BAD_REQUEST);

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "INVALID_CALLER");
	assert_eq!(json["message"], "Error verifying corpora IDs.");
}

#[tokio::test]
async fn engine_failures_are_retryable_bad_gateways() {
	let payload = serde_json::json!({ "query_string": "law" });
	let response = post_search(app(true), Some("internal-token"), payload).await;

	assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
	assert!(response.headers().contains_key(routes::HEADER_REQUEST_ID));

	let json = json_body(response).await;

	assert_eq!(json["error_code"], "ENGINE_UNAVAILABLE");
	assert_eq!(json["retryable"], true);
}
