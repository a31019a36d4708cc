use axum::{
	Json, Router,
	extract::State,
	http::{HeaderMap, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::state::AppState;
use nav_service::{Error, SearchRequest, SearchResponse};

pub const HEADER_REQUEST_ID: &str = "x-request-id";

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/api/v1/searches", post(search))
		.with_state(state)
}

async fn health() -> &'static str {
	"ok"
}

async fn search(
	State(state): State<AppState>,
	headers: HeaderMap,
	Json(payload): Json<SearchRequest>,
) -> Response {
	let request_id = Uuid::new_v4();
	let span = tracing::info_span!("search", %request_id);
	let mut response = match run_search(&state, &headers, payload).instrument(span).await {
		Ok(body) => Json(body).into_response(),
		Err(err) => err.into_response(),
	};

	if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
		response.headers_mut().insert(HEADER_REQUEST_ID, value);
	}

	response
}

async fn run_search(
	state: &AppState,
	headers: &HeaderMap,
	payload: SearchRequest,
) -> Result<SearchResponse, ApiError> {
	let Some(caller) = state.app_tokens.caller(headers) else {
		tracing::info!("Rejected search without a valid app token.");

		return Err(json_error(
			StatusCode::UNAUTHORIZED,
			"UNAUTHORIZED",
			"A valid app-token header is required.",
		));
	};
	let response = state.service.search(caller, payload).await?;

	Ok(response)
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	retryable: bool,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	retryable: bool,
}
impl ApiError {
	fn new(status: StatusCode, error_code: impl Into<String>, message: impl Into<String>) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), retryable: false }
	}

	fn retryable(mut self) -> Self {
		self.retryable = true;

		self
	}
}

impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		let retryable = err.is_retryable();
		let api_error = match err {
			Error::InvalidRequest { message } =>
				json_error(StatusCode::UNPROCESSABLE_ENTITY, "INVALID_REQUEST", message),
			Error::InvalidCaller { message } =>
				json_error(StatusCode::BAD_REQUEST, "INVALID_CALLER", message),
			Error::Forbidden { message } => json_error(StatusCode::FORBIDDEN, "FORBIDDEN", message),
			Error::Engine { message } => {
				tracing::error!(error = %message, "Search engine request failed.");

				json_error(
					StatusCode::BAD_GATEWAY,
					"ENGINE_UNAVAILABLE",
					"The search engine is unavailable.",
				)
			},
			Error::Storage { message } => {
				tracing::error!(error = %message, "Catalog query failed.");

				json_error(
					StatusCode::SERVICE_UNAVAILABLE,
					"STORAGE_UNAVAILABLE",
					"The document catalog is unavailable.",
				)
			},
			Error::Internal { message } => {
				tracing::error!(error = %message, "Internal error.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Internal error.")
			},
		};

		if retryable { api_error.retryable() } else { api_error }
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body = ErrorBody {
			error_code: self.error_code,
			message: self.message,
			retryable: self.retryable,
		};

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(status: StatusCode, code: &str, message: impl Into<String>) -> ApiError {
	ApiError::new(status, code, message)
}
