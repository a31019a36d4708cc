mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	AppToken, Config, Documents, Engine, Pagination, Postgres, Search, Security, Service, Storage,
};

use std::{collections::HashSet, fs, path::Path};

use regex::Regex;

pub const MIN_TOKEN_SECRET_BYTES: usize = 32;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	if cfg.service.http_bind.trim().is_empty() {
		return Err(Error::Validation {
			message: "service.http_bind must be non-empty.".to_string(),
		});
	}
	if cfg.storage.postgres.pool_max_conns == 0 {
		return Err(Error::Validation {
			message: "storage.postgres.pool_max_conns must be greater than zero.".to_string(),
		});
	}
	if cfg.engine.api_base.trim().is_empty() {
		return Err(Error::Validation {
			message: "engine.api_base must be non-empty.".to_string(),
		});
	}
	if cfg.engine.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "engine.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.engine.default_headers.values().any(|value| !value.is_string()) {
		return Err(Error::Validation {
			message: "engine.default_headers values must be strings.".to_string(),
		});
	}

	validate_search(&cfg.search)?;

	if cfg.pagination.token_secret.trim().len() < MIN_TOKEN_SECRET_BYTES {
		return Err(Error::Validation {
			message: format!(
				"pagination.token_secret must be at least {MIN_TOKEN_SECRET_BYTES} bytes."
			),
		});
	}
	if cfg.documents.cdn_domain.trim().is_empty() {
		return Err(Error::Validation {
			message: "documents.cdn_domain must be non-empty.".to_string(),
		});
	}
	if cfg.documents.hidden_source_url_patterns.iter().any(|pattern| pattern.trim().is_empty()) {
		return Err(Error::Validation {
			message: "documents.hidden_source_url_patterns must not contain empty patterns."
				.to_string(),
		});
	}
	for pattern in &cfg.documents.hidden_source_url_patterns {
		if let Err(err) = Regex::new(pattern) {
			return Err(Error::Validation {
				message: format!(
					"documents.hidden_source_url_patterns contains an invalid pattern: {err}"
				),
			});
		}
	}

	let mut seen = HashSet::new();

	for app_token in &cfg.security.app_tokens {
		if app_token.token.trim().is_empty() {
			return Err(Error::Validation {
				message: "security.app_tokens.token must be non-empty.".to_string(),
			});
		}
		if !seen.insert(app_token.token.as_str()) {
			return Err(Error::Validation {
				message: "security.app_tokens.token values must be unique.".to_string(),
			});
		}
		if app_token.allowed_corpora.iter().any(|corpus| corpus.trim().is_empty()) {
			return Err(Error::Validation {
				message: "security.app_tokens.allowed_corpora must not contain empty ids."
					.to_string(),
			});
		}
	}

	Ok(())
}

fn validate_search(search: &Search) -> Result<()> {
	for (label, value) in [
		("search.max_page_window", search.max_page_window),
		("search.max_limit", search.max_limit),
		("search.max_hits_per_family", search.max_hits_per_family),
		("search.default_page_size", search.default_page_size),
		("search.default_limit", search.default_limit),
		("search.default_max_hits_per_family", search.default_max_hits_per_family),
	] {
		if value == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if search.default_page_size > search.max_page_window {
		return Err(Error::Validation {
			message: "search.default_page_size must not exceed search.max_page_window."
				.to_string(),
		});
	}
	if search.default_limit > search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must not exceed search.max_limit.".to_string(),
		});
	}
	if search.default_page_size > search.default_limit {
		return Err(Error::Validation {
			message: "search.default_page_size must not exceed search.default_limit.".to_string(),
		});
	}
	if search.default_max_hits_per_family > search.max_hits_per_family {
		return Err(Error::Validation {
			message:
				"search.default_max_hits_per_family must not exceed search.max_hits_per_family."
					.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.engine.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.engine.api_key = None;
	}

	while cfg.engine.api_base.ends_with('/') {
		cfg.engine.api_base.pop();
	}

	if !cfg.engine.path.is_empty() && !cfg.engine.path.starts_with('/') {
		cfg.engine.path.insert(0, '/');
	}

	let cdn_domain = cfg.documents.cdn_domain.trim().trim_end_matches('/').to_string();

	cfg.documents.cdn_domain = cdn_domain;

	for app_token in &mut cfg.security.app_tokens {
		app_token.allowed_corpora.sort();
		app_token.allowed_corpora.dedup();
	}
}
