use std::time::Duration;

use reqwest::{
	Client,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

use crate::{EngineQuery, EngineResponse, Error, Result};

/// HTTP client for the external search engine.
///
/// Built once at startup and shared by every request.
#[derive(Debug, Clone)]
pub struct EngineClient {
	http: Client,
	url: String,
	headers: HeaderMap,
}
impl EngineClient {
	pub fn new(cfg: &nav_config::Engine) -> Result<Self> {
		let http = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
		let url = format!("{}{}", cfg.api_base, cfg.path);
		let headers = request_headers(cfg.api_key.as_deref(), &cfg.default_headers)?;

		Ok(Self { http, url, headers })
	}

	pub async fn search(&self, query: &EngineQuery) -> Result<EngineResponse> {
		let res =
			self.http.post(&self.url).headers(self.headers.clone()).json(query).send().await?;
		let json: Value = res.error_for_status()?.json().await?;

		parse_search_response(json)
	}
}

pub fn request_headers(
	api_key: Option<&str>,
	default_headers: &Map<String, Value>,
) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if let Some(api_key) = api_key {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

fn parse_search_response(json: Value) -> Result<EngineResponse> {
	if json.get("total_family_hits").and_then(Value::as_u64).is_none() {
		return Err(Error::InvalidResponse {
			message: "Engine response is missing total_family_hits.".to_string(),
		});
	}

	let response: EngineResponse = serde_json::from_value(json).map_err(|err| {
		Error::InvalidResponse { message: format!("Engine response is malformed: {err}") }
	})?;

	if response.continuation_token.is_some() || response.prev_continuation_token.is_some() {
		tracing::debug!(
			next = ?response.continuation_token,
			prev = ?response.prev_continuation_token,
			"Ignoring engine-native cursors."
		);
	}

	Ok(response)
}
