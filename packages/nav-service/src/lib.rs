pub mod assemble;
pub mod corpus;
pub mod cursor;
pub mod filters;
pub mod params;
pub mod request;
pub mod response;
pub mod search;

mod error;

pub use corpus::{AuthorizedCorpora, Caller, CorpusAccessGate};
pub use error::{Error, Result};
pub use request::{FilterKey, SearchFilter, SearchRequest};
pub use response::{DocumentResult, FamilyResult, PassageMatch, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use regex::Regex;

use crate::cursor::ContinuationTokens;
use nav_config::Config;
use nav_domain::geography::{Geography, GeographyTree};
use nav_engine::{EngineClient, EngineQuery, EngineResponse};
use nav_storage::{catalog::CatalogSnapshot, db::Db, queries};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The external search engine. Relevance ranking happens behind this seam.
pub trait SearchEngine
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		query: &'a EngineQuery,
	) -> BoxFuture<'a, nav_engine::Result<EngineResponse>>;
}

/// Read access to the relational catalog.
pub trait CatalogStore
where
	Self: Send + Sync,
{
	/// Catalog rows for these documents and their families. Unknown ids are simply absent.
	fn snapshot<'a>(
		&'a self,
		document_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<CatalogSnapshot>>;

	/// The subset of `corpus_ids` that exists in the catalog.
	fn known_corpora<'a>(
		&'a self,
		corpus_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<Vec<String>>>;
}

#[derive(Clone)]
pub struct Backends {
	pub engine: Arc<dyn SearchEngine>,
	pub catalog: Arc<dyn CatalogStore>,
}
impl Backends {
	pub fn new(engine: EngineClient, db: Db) -> Self {
		Self { engine: Arc::new(engine), catalog: Arc::new(PgCatalog { db }) }
	}
}

pub struct NavigatorService {
	pub cfg: Config,
	pub geographies: Arc<GeographyTree>,
	pub backends: Backends,
	tokens: ContinuationTokens,
	hidden_source_urls: Vec<Regex>,
}
impl NavigatorService {
	pub fn new(cfg: Config, geographies: GeographyTree, backends: Backends) -> Result<Self> {
		let tokens = ContinuationTokens::new(&cfg.pagination.token_secret);
		let hidden_source_urls = cfg
			.documents
			.hidden_source_url_patterns
			.iter()
			.map(|pattern| Regex::new(pattern))
			.collect::<std::result::Result<Vec<_>, _>>()
			.map_err(|err| Error::Internal {
				message: format!("Invalid documents.hidden_source_url_patterns entry: {err}"),
			})?;

		Ok(Self { cfg, geographies: Arc::new(geographies), backends, tokens, hidden_source_urls })
	}
}

struct PgCatalog {
	db: Db,
}

impl SearchEngine for EngineClient {
	fn search<'a>(
		&'a self,
		query: &'a EngineQuery,
	) -> BoxFuture<'a, nav_engine::Result<EngineResponse>> {
		Box::pin(EngineClient::search(self, query))
	}
}

impl CatalogStore for PgCatalog {
	fn snapshot<'a>(
		&'a self,
		document_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<CatalogSnapshot>> {
		Box::pin(queries::fetch_catalog_snapshot(&self.db, document_ids))
	}

	fn known_corpora<'a>(
		&'a self,
		corpus_ids: &'a [String],
	) -> BoxFuture<'a, nav_storage::Result<Vec<String>>> {
		Box::pin(queries::list_known_corpora(&self.db.pool, corpus_ids))
	}
}

/// Loads the geography reference tree. Called once at startup.
pub async fn load_geographies(db: &Db) -> Result<GeographyTree> {
	let rows = queries::list_geographies(&db.pool).await?;
	let nodes = rows
		.into_iter()
		.map(|row| Geography {
			id: row.id,
			value: row.value,
			slug: row.slug,
			display_value: row.display_value,
			parent_id: row.parent_id,
		})
		.collect();

	Ok(GeographyTree::new(nodes))
}
