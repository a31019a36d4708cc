use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub engine: Engine,
	pub search: Search,
	pub pagination: Pagination,
	pub documents: Documents,
	#[serde(default)]
	pub security: Security,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
	pub postgres: Postgres,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
	pub dsn: String,
	pub pool_max_conns: u32,
}

/// Connection settings for the external search engine.
#[derive(Debug, Clone, Deserialize)]
pub struct Engine {
	pub api_base: String,
	pub path: String,
	#[serde(default)]
	pub api_key: Option<String>,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

/// Paging ceilings and request defaults.
///
/// Ceilings are enforced before any external call is made.
#[derive(Debug, Clone, Deserialize)]
pub struct Search {
	/// Upper bound for `page_size + offset`.
	#[serde(default = "default_ceiling")]
	pub max_page_window: u32,
	#[serde(default = "default_ceiling")]
	pub max_limit: u32,
	#[serde(default = "default_ceiling")]
	pub max_hits_per_family: u32,
	#[serde(default = "default_page_size")]
	pub default_page_size: u32,
	#[serde(default = "default_limit")]
	pub default_limit: u32,
	#[serde(default = "default_hits_per_family")]
	pub default_max_hits_per_family: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Pagination {
	/// Secret used to derive the continuation-token signing key.
	pub token_secret: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Documents {
	pub cdn_domain: String,
	/// Source URLs matching any of these patterns are withheld from responses.
	#[serde(default = "default_hidden_source_url_patterns")]
	pub hidden_source_url_patterns: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Security {
	#[serde(default)]
	pub app_tokens: Vec<AppToken>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppToken {
	pub token: String,
	/// Empty means the token is not restricted to any corpus.
	#[serde(default)]
	pub allowed_corpora: Vec<String>,
}

fn default_ceiling() -> u32 {
	500
}

fn default_page_size() -> u32 {
	10
}

fn default_limit() -> u32 {
	100
}

fn default_hits_per_family() -> u32 {
	10
}

fn default_hidden_source_url_patterns() -> Vec<String> {
	vec![r"climate-laws\.org".to_string()]
}
