use std::{
	collections::HashMap,
	sync::{Arc, RwLock},
	time::{Duration, Instant},
};

use tracing::debug;

use agora_domain::TagId;
use agora_storage::{Result, store::SearchStore};

struct TagSnapshot {
	by_name: HashMap<String, TagId>,
	loaded_at: Instant,
}

/// Tag-name to identifier lookup with a bounded staleness.
///
/// A snapshot older than `max_age` is reloaded by the next resolve. Tags created after the
/// snapshot was taken are therefore unknown for at most `max_age`, or until [`Self::refresh`].
/// A zero `max_age` reloads on every resolve.
pub struct TagDirectory {
	max_age: Duration,
	snapshot: RwLock<Option<Arc<TagSnapshot>>>,
}
impl TagDirectory {
	pub fn new(max_age: Duration) -> Self {
		Self { max_age, snapshot: RwLock::new(None) }
	}

	/// Resolves every name, or returns `None` when any of them is unknown.
	pub async fn resolve(
		&self,
		store: &dyn SearchStore,
		names: &[String],
	) -> Result<Option<Vec<TagId>>> {
		let snapshot = match self.fresh_snapshot() {
			Some(snapshot) => snapshot,
			None => self.reload(store).await?,
		};

		Ok(names.iter().map(|name| snapshot.by_name.get(name).copied()).collect())
	}

	pub async fn refresh(&self, store: &dyn SearchStore) -> Result<usize> {
		Ok(self.reload(store).await?.by_name.len())
	}

	fn fresh_snapshot(&self) -> Option<Arc<TagSnapshot>> {
		let guard = self.snapshot.read().unwrap_or_else(|err| err.into_inner());

		guard.as_ref().filter(|snapshot| snapshot.loaded_at.elapsed() < self.max_age).cloned()
	}

	async fn reload(&self, store: &dyn SearchStore) -> Result<Arc<TagSnapshot>> {
		let tags = store.load_tags().await?;
		let snapshot = Arc::new(TagSnapshot {
			by_name: tags.into_iter().map(|tag| (tag.name, tag.tag_id)).collect(),
			loaded_at: Instant::now(),
		});

		debug!(tag_count = snapshot.by_name.len(), "Tag directory reloaded.");

		*self.snapshot.write().unwrap_or_else(|err| err.into_inner()) = Some(snapshot.clone());

		Ok(snapshot)
	}
}

#[cfg(test)]
mod tests {
	use std::time::Duration;

	use agora_testkit::{MemoryStore, PostFixture};

	use crate::tags::TagDirectory;

	fn names(values: &[&str]) -> Vec<String> {
		values.iter().map(|value| value.to_string()).collect()
	}

	#[tokio::test]
	async fn unknown_name_resolves_to_none() {
		let store = MemoryStore::with_posts([PostFixture::new(1, "a").tags(&["rust", "web"])]);
		let directory = TagDirectory::new(Duration::from_secs(60));

		assert_eq!(
			directory.resolve(&store, &names(&["web", "rust"])).await.expect("resolve"),
			Some(vec![2, 1])
		);
		assert_eq!(directory.resolve(&store, &names(&["rust", "go"])).await.expect("resolve"), None);
		assert_eq!(store.tag_loads(), 1);
	}

	#[tokio::test]
	async fn fresh_snapshot_hides_new_tags_until_refresh() {
		let store = MemoryStore::with_posts([PostFixture::new(1, "a").tags(&["rust"])]);
		let directory = TagDirectory::new(Duration::from_secs(60));

		directory.resolve(&store, &names(&["rust"])).await.expect("resolve");
		store.insert_post(PostFixture::new(2, "b").tags(&["async"]));

		assert_eq!(directory.resolve(&store, &names(&["async"])).await.expect("resolve"), None);
		assert_eq!(directory.refresh(&store).await.expect("refresh"), 2);
		assert_eq!(directory.resolve(&store, &names(&["async"])).await.expect("resolve"), Some(vec![2]));
	}

	#[tokio::test]
	async fn zero_max_age_reloads_every_time() {
		let store = MemoryStore::with_posts([PostFixture::new(1, "a").tags(&["rust"])]);
		let directory = TagDirectory::new(Duration::ZERO);

		for _ in 0..3 {
			directory.resolve(&store, &names(&["rust"])).await.expect("resolve");
		}

		assert_eq!(store.tag_loads(), 3);
	}
}
