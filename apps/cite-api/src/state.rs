use std::sync::Arc;

use cite_service::CiteService;
use cite_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<CiteService>,
}
impl AppState {
	/// Connects to Postgres, bootstraps the chunk schema and wires the default providers.
	pub async fn new(config: cite_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(config.providers.embedding.dimensions).await?;

		Ok(Self::from_service(CiteService::new(config, Arc::new(db))))
	}

	pub fn from_service(service: CiteService) -> Self {
		Self { service: Arc::new(service) }
	}
}
