use std::{
	collections::{BTreeMap, BTreeSet, HashSet},
	sync::{
		Mutex,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
	time::Duration,
};

use time::OffsetDateTime;

use agora_storage::{
	Error, Result,
	models::{CommentCountRow, PostRecord, PostSortRow, PostTagRow, Tag, TagFacetRow},
	store::{BoxFuture, SearchStore},
};

/// A post to seed into [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct PostFixture {
	pub post_id: i64,
	pub title: String,
	pub content: String,
	pub published_at: OffsetDateTime,
	pub like_count: i64,
	pub dislike_count: i64,
	pub og_image_url: Option<String>,
	pub tags: Vec<String>,
	pub comments: i64,
}
impl PostFixture {
	pub fn new(post_id: i64, title: impl Into<String>) -> Self {
		Self {
			post_id,
			title: title.into(),
			content: String::new(),
			published_at: OffsetDateTime::UNIX_EPOCH,
			like_count: 0,
			dislike_count: 0,
			og_image_url: None,
			tags: Vec::new(),
			comments: 0,
		}
	}

	pub fn content(mut self, content: impl Into<String>) -> Self {
		self.content = content.into();

		self
	}

	pub fn published_at(mut self, unix_seconds: i64) -> Self {
		self.published_at =
			OffsetDateTime::from_unix_timestamp(unix_seconds).unwrap_or(OffsetDateTime::UNIX_EPOCH);

		self
	}

	pub fn likes(mut self, like_count: i64) -> Self {
		self.like_count = like_count;

		self
	}

	pub fn dislikes(mut self, dislike_count: i64) -> Self {
		self.dislike_count = dislike_count;

		self
	}

	pub fn tags(mut self, tags: &[&str]) -> Self {
		self.tags = tags.iter().map(|tag| tag.to_string()).collect();

		self
	}

	pub fn comments(mut self, comments: i64) -> Self {
		self.comments = comments;

		self
	}

	pub fn og_image(mut self, url: impl Into<String>) -> Self {
		self.og_image_url = Some(url.into());

		self
	}
}

#[derive(Default)]
struct Corpus {
	posts: BTreeMap<i64, PostFixture>,
	tags: BTreeMap<String, i64>,
	post_tags: BTreeSet<(i64, i64)>,
}
impl Corpus {
	fn tag_id(&mut self, name: &str) -> i64 {
		let next = self.tags.len() as i64 + 1;

		*self.tags.entry(name.to_string()).or_insert(next)
	}

	fn tag_name(&self, tag_id: i64) -> Option<&str> {
		self.tags.iter().find(|(_, id)| **id == tag_id).map(|(name, _)| name.as_str())
	}
}

/// An in-memory [`SearchStore`] with the same matching semantics as the Postgres store.
///
/// The full-text predicate lowercases content and terms, ignores markup, and requires every term
/// to appear as a whole token, like the `simple` text search configuration.
#[derive(Default)]
pub struct MemoryStore {
	corpus: Mutex<Corpus>,
	full_text_unavailable: AtomicBool,
	latency: Mutex<Option<Duration>>,
	tag_loads: AtomicUsize,
}
impl MemoryStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_posts(posts: impl IntoIterator<Item = PostFixture>) -> Self {
		let store = Self::new();

		for post in posts {
			store.insert_post(post);
		}

		store
	}

	pub fn insert_post(&self, post: PostFixture) {
		let mut corpus = self.corpus.lock().unwrap_or_else(|err| err.into_inner());
		let tag_ids = post.tags.iter().map(|name| corpus.tag_id(name)).collect::<Vec<_>>();

		for tag_id in tag_ids {
			corpus.post_tags.insert((post.post_id, tag_id));
		}

		corpus.posts.insert(post.post_id, post);
	}

	pub fn set_full_text_available(&self, available: bool) {
		self.full_text_unavailable.store(!available, Ordering::SeqCst);
	}

	/// Every store call sleeps this long before answering.
	pub fn set_latency(&self, latency: Option<Duration>) {
		*self.latency.lock().unwrap_or_else(|err| err.into_inner()) = latency;
	}

	pub fn tag_loads(&self) -> usize {
		self.tag_loads.load(Ordering::SeqCst)
	}

	async fn pause(&self) {
		let latency = *self.latency.lock().unwrap_or_else(|err| err.into_inner());

		if let Some(latency) = latency {
			tokio::time::sleep(latency).await;
		}
	}

	fn read<T>(&self, f: impl FnOnce(&Corpus) -> T) -> T {
		let corpus = self.corpus.lock().unwrap_or_else(|err| err.into_inner());

		f(&corpus)
	}

	fn sort_rows(&self, keep: impl Fn(&PostFixture) -> bool) -> Vec<PostSortRow> {
		self.read(|corpus| {
			corpus
				.posts
				.values()
				.filter(|post| keep(post))
				.map(|post| PostSortRow {
					post_id: post.post_id,
					like_count: post.like_count,
					published_at: post.published_at,
				})
				.collect()
		})
	}
}
impl SearchStore for MemoryStore {
	fn title_matches<'a>(&'a self, terms: &'a [String]) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(async move {
			self.pause().await;

			Ok(self.sort_rows(|post| terms.iter().all(|term| post.title.contains(term.as_str()))))
		})
	}

	fn content_matches<'a>(&'a self, phrase: &'a str) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(async move {
			self.pause().await;

			if self.full_text_unavailable.load(Ordering::SeqCst) {
				return Err(Error::IndexUnavailable(
					"text search configuration is not installed".to_string(),
				));
			}

			let wanted = text_tokens(phrase);

			if wanted.is_empty() {
				return Ok(Vec::new());
			}

			Ok(self.sort_rows(|post| {
				let tokens = text_tokens(&post.content);

				wanted.iter().all(|token| tokens.contains(token))
			}))
		})
	}

	fn all_posts(&self) -> BoxFuture<'_, Result<Vec<PostSortRow>>> {
		Box::pin(async move {
			self.pause().await;

			Ok(self.sort_rows(|_| true))
		})
	}

	fn load_tags(&self) -> BoxFuture<'_, Result<Vec<Tag>>> {
		Box::pin(async move {
			self.pause().await;
			self.tag_loads.fetch_add(1, Ordering::SeqCst);

			let mut tags = self.read(|corpus| {
				corpus
					.tags
					.iter()
					.map(|(name, tag_id)| Tag { tag_id: *tag_id, name: name.clone() })
					.collect::<Vec<_>>()
			});

			tags.sort_by_key(|tag| tag.tag_id);

			Ok(tags)
		})
	}

	fn posts_with_all_tags<'a>(
		&'a self,
		tag_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<PostSortRow>>> {
		Box::pin(async move {
			self.pause().await;

			let wanted = tag_ids.iter().copied().collect::<HashSet<_>>();
			let matched = self.read(|corpus| {
				corpus
					.posts
					.keys()
					.copied()
					.filter(|post_id| {
						let carried = corpus
							.post_tags
							.iter()
							.filter(|(id, tag_id)| id == post_id && wanted.contains(tag_id))
							.count();

						carried == wanted.len()
					})
					.collect::<HashSet<_>>()
			});

			Ok(self.sort_rows(|post| matched.contains(&post.post_id)))
		})
	}

	fn tag_facets<'a>(
		&'a self,
		post_ids: Option<&'a [i64]>,
	) -> BoxFuture<'a, Result<Vec<TagFacetRow>>> {
		Box::pin(async move {
			self.pause().await;

			let scope = post_ids.map(|ids| ids.iter().copied().collect::<HashSet<_>>());

			Ok(self.read(|corpus| {
				let mut counts = BTreeMap::<i64, i64>::new();

				for (post_id, tag_id) in &corpus.post_tags {
					if scope.as_ref().map(|scope| scope.contains(post_id)).unwrap_or(true) {
						*counts.entry(*tag_id).or_default() += 1;
					}
				}

				// GROUP BY gives no order; callers must sort.
				let mut rows = counts
					.into_iter()
					.map(|(tag_id, post_count)| TagFacetRow {
						tag_id,
						name: corpus.tag_name(tag_id).unwrap_or_default().to_string(),
						post_count,
					})
					.collect::<Vec<_>>();

				rows.reverse();

				rows
			}))
		})
	}

	fn fetch_posts<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostRecord>>> {
		Box::pin(async move {
			self.pause().await;

			let mut rows = self.read(|corpus| {
				post_ids
					.iter()
					.filter_map(|post_id| corpus.posts.get(post_id))
					.map(|post| PostRecord {
						post_id: post.post_id,
						title: post.title.clone(),
						published_at: post.published_at,
						like_count: post.like_count,
						dislike_count: post.dislike_count,
						og_image_url: post.og_image_url.clone(),
					})
					.collect::<Vec<_>>()
			});

			// Bulk fetches make no ordering promise.
			rows.sort_by_key(|row| row.post_id);

			Ok(rows)
		})
	}

	fn post_tags<'a>(&'a self, post_ids: &'a [i64]) -> BoxFuture<'a, Result<Vec<PostTagRow>>> {
		Box::pin(async move {
			self.pause().await;

			let wanted = post_ids.iter().copied().collect::<HashSet<_>>();

			Ok(self.read(|corpus| {
				corpus
					.post_tags
					.iter()
					.filter(|(post_id, _)| wanted.contains(post_id))
					.map(|(post_id, tag_id)| PostTagRow {
						post_id: *post_id,
						tag_id: *tag_id,
						name: corpus.tag_name(*tag_id).unwrap_or_default().to_string(),
					})
					.collect()
			}))
		})
	}

	fn comment_counts<'a>(
		&'a self,
		post_ids: &'a [i64],
	) -> BoxFuture<'a, Result<Vec<CommentCountRow>>> {
		Box::pin(async move {
			self.pause().await;

			Ok(self.read(|corpus| {
				post_ids
					.iter()
					.filter_map(|post_id| corpus.posts.get(post_id))
					.filter(|post| post.comments > 0)
					.map(|post| CommentCountRow { post_id: post.post_id, comment_count: post.comments })
					.collect()
			}))
		})
	}
}

fn text_tokens(text: &str) -> HashSet<String> {
	let mut visible = String::with_capacity(text.len());
	let mut in_markup = false;

	for c in text.chars() {
		match c {
			'<' => in_markup = true,
			'>' if in_markup => {
				in_markup = false;

				visible.push(' ');
			},
			_ if !in_markup => visible.push(c),
			_ => {},
		}
	}

	visible
		.split(|c: char| !c.is_alphanumeric())
		.filter(|token| !token.is_empty())
		.map(str::to_lowercase)
		.collect()
}
