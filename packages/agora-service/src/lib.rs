pub mod search;
pub mod tags;

mod error;

pub use agora_storage::store::{BoxFuture, SearchStore};
pub use error::{Error, Result, SearchError};
pub use search::{
	FacetItem, PostSummary, SearchMeta, SearchParams, SearchRequest, SearchResponse, TagItem,
};
pub use tags::TagDirectory;

use std::{sync::Arc, time::Duration};

use agora_config::Config;
use agora_storage::{db::Db, store::PgSearchStore};

pub struct AgoraService {
	pub cfg: Config,
	pub store: Arc<dyn SearchStore>,
	pub tags: TagDirectory,
}
impl AgoraService {
	pub fn new(cfg: Config, db: Db) -> Self {
		let store = PgSearchStore::new(db, cfg.search.text_search_config.clone());

		Self::with_store(cfg, Arc::new(store))
	}

	pub fn with_store(cfg: Config, store: Arc<dyn SearchStore>) -> Self {
		let tags = TagDirectory::new(Duration::from_secs(cfg.search.tag_cache_ttl_secs));

		Self { cfg, store, tags }
	}

	/// Reloads the tag-name table immediately and returns the number of known tags.
	pub async fn refresh_tags(&self) -> Result<usize> {
		Ok(self.tags.refresh(self.store.as_ref()).await?)
	}
}
