use std::sync::Arc;

use agora_service::{AgoraService, SearchStore};
use agora_storage::db::Db;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<AgoraService>,
}
impl AppState {
	pub async fn new(config: agora_config::Config) -> color_eyre::Result<Self> {
		let db = Db::connect(&config.storage.postgres).await?;

		db.ensure_schema(&config.search.text_search_config).await?;

		let service = AgoraService::new(config, db);

		Ok(Self { service: Arc::new(service) })
	}

	pub fn with_store(config: agora_config::Config, store: Arc<dyn SearchStore>) -> Self {
		Self { service: Arc::new(AgoraService::with_store(config, store)) }
	}
}
