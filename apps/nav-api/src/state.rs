use std::sync::Arc;

use crate::auth::AppTokens;
use nav_domain::geography::GeographyTree;
use nav_engine::EngineClient;
use nav_service::{Backends, NavigatorService};
use nav_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<NavigatorService>,
	pub app_tokens: Arc<AppTokens>,
}
impl AppState {
	pub async fn new(config: nav_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;
		let geographies = nav_service::load_geographies(&db).await?;

		tracing::info!(geographies = geographies.len(), "Loaded geography tree.");

		let engine = EngineClient::new(&config.engine)?;

		Self::with_backends(config, geographies, Backends::new(engine, db))
	}

	pub fn with_backends(
		config: nav_config::Config,
		geographies: GeographyTree,
		backends: Backends,
	) -> color_eyre::Result<Self> {
		let app_tokens = AppTokens::new(&config.security);

		if app_tokens.is_empty() {
			tracing::warn!("No app tokens configured; every search will be rejected.");
		}

		let service = NavigatorService::new(config, geographies, backends)?;

		Ok(Self { service: Arc::new(service), app_tokens: Arc::new(app_tokens) })
	}
}
