use std::{future::Future, pin::Pin};

use crate::{
	Result,
	db::Db,
	models::{CommentCountRow, PostRecord, PostSortRow, PostTagRow, Tag, TagFacetRow},
	queries,
};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The storage operations the search engine consumes.
pub trait SearchStore
where
	Self: Send + Sync,
{
	fn title_matches<'a>(&'a self, terms: &'a [String]) -> BoxFuture<'a, Result<Vec<PostSortRow>>>;

	fn content_matches<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<Vec<PostSortRow>>>;

	fn all_posts(&self) -> BoxFuture<'_, Result<Vec<PostSortRow>>>;

	fn load_tags(&self) -> BoxFuture<'_, Result<Vec<Tag>>>;

	fn posts_with_all_tags<'a>(
		&'a self,
		tag_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<PostSortRow>>>;

	fn tag_facets<'a>(
		&'a self,
		post_ids: Option<&'a [i64]>,
	) -> BoxFuture<'a, Result<Vec<TagFacetRow>>>;

	fn fetch_posts<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostRecord>>>;

	fn post_tags<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostTagRow>>>;

	fn comment_counts<'a>(
		&'a self,
		post_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<CommentCountRow>>>;
}

/// Postgres-backed store.
pub struct PgSearchStore {
	db: Db,
	text_search_config: String,
}
impl PgSearchStore {
	pub fn new(db: Db, text_search_config: impl Into<String>) -> Self {
		Self { db, text_search_config: text_search_config.into() }
	}
}
impl SearchStore for PgSearchStore {
	fn title_matches<'a>(&'a self, terms: &'a [String]) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(queries::title_matches(&self.db, terms))
	}

	fn content_matches<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(queries::content_matches(&self.db, &self.text_search_config, phrase))
	}

	fn all_posts(&self) -> BoxFuture<'_, Result<Vec<PostSortRow>>> {
		Box::pin(queries::all_posts(&self.db))
	}

	fn load_tags(&self) -> BoxFuture<'_, Result<Vec<Tag>>> {
		Box::pin(queries::load_tags(&self.db))
	}

	fn posts_with_all_tags<'a>(
		&'a self,
		tag_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(queries::posts_with_all_tags(&self.db, tag_ids))
	}

	fn tag_facets<'a>(
		&'a self,
		post_ids: Option<&'a [i64]>,
	) -> BoxFuture<'a, Result<Vec<TagFacetRow>>> {
		Box::pin(queries::tag_facets(&self.db, post_ids))
	}

	fn fetch_posts<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostRecord>>> {
		Box::pin(queries::fetch_posts(&self.db, post_ids))
	}

	fn post_tags<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostTagRow>>> {
		Box::pin(queries::post_tags(&self.db, post_ids))
	}

	fn comment_counts<'a>(
		&'a self,
		post_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<CommentCountRow>>> {
		Box::pin(queries::comment_counts(&self.db, post_ids))
	}
}
