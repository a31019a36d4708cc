use std::collections::HashMap;

use axum::http::HeaderMap;

use nav_service::Caller;

pub const HEADER_APP_TOKEN: &str = "app-token";

/// App tokens from `[security]`, each mapped to the caller it authenticates.
#[derive(Debug, Default)]
pub struct AppTokens {
	callers: HashMap<String, Caller>,
}
impl AppTokens {
	pub fn new(cfg: &nav_config::Security) -> Self {
		let callers = cfg
			.app_tokens
			.iter()
			.map(|entry| {
				(entry.token.clone(), Caller { allowed_corpora: entry.allowed_corpora.clone() })
			})
			.collect();

		Self { callers }
	}

	pub fn len(&self) -> usize {
		self.callers.len()
	}

	pub fn is_empty(&self) -> bool {
		self.callers.is_empty()
	}

	pub fn caller(&self, headers: &HeaderMap) -> Option<&Caller> {
		self.callers.get(read_app_token(headers)?)
	}
}

fn read_app_token(headers: &HeaderMap) -> Option<&str> {
	let token = headers.get(HEADER_APP_TOKEN)?.to_str().ok()?.trim();

	if token.is_empty() { None } else { Some(token) }
}
