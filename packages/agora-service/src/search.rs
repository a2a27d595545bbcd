use std::{collections::HashMap, fmt, time::Duration};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::{debug, warn};

use agora_domain::{
	PostId,
	facets::{self, Facet},
	keyword,
	matching::{self, MatchSet},
	ordering::{self, OrderBy, SortKey},
	paging::{self, Page},
};
use agora_storage::models::{PostRecord, PostSortRow};

use crate::{AgoraService, Error, Result, SearchError};

/// A search as received from the caller, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchRequest {
	pub q: String,
	pub tags: Vec<String>,
	pub page: Option<i64>,
	pub order_by: Option<String>,
}
impl fmt::Display for SearchRequest {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "q={:?} tags={:?} page=", self.q, self.tags)?;

		match self.page {
			Some(page) => write!(f, "{page}")?,
			None => f.write_str("default")?,
		}

		match self.order_by.as_deref() {
			Some(order_by) => write!(f, " orderBy={order_by:?}"),
			None => f.write_str(" orderBy=default"),
		}
	}
}

/// Validated search parameters, echoed back in the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
	pub q: String,
	pub tags: Vec<String>,
	pub page: u32,
	pub order_by: OrderBy,
}
impl SearchParams {
	pub fn from_request(req: &SearchRequest) -> Result<Self> {
		let page = match req.page {
			None => 1,
			Some(raw) => u32::try_from(raw).ok().filter(|page| *page >= 1).ok_or_else(|| {
				Error::InvalidQuery { message: format!("page must be a positive integer, got {raw}.") }
			})?,
		};
		let order_by = match req.order_by.as_deref().map(str::trim) {
			None | Some("") => OrderBy::default(),
			Some(raw) => OrderBy::parse(raw).ok_or_else(|| Error::InvalidQuery {
				message: format!("orderBy must be one of likes, timeDesc, or timeAsc, got {raw:?}."),
			})?,
		};
		let mut tags: Vec<String> = Vec::with_capacity(req.tags.len());

		for tag in &req.tags {
			let tag = tag.trim();

			if !tag.is_empty() && !tags.iter().any(|seen| seen == tag) {
				tags.push(tag.to_string());
			}
		}

		Ok(Self { q: req.q.clone(), tags, page, order_by })
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacetItem {
	pub tag_name: String,
	pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagItem {
	pub tag_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
	pub post_id: PostId,
	pub post_title: String,
	#[serde(with = "time::serde::rfc3339")]
	pub post_date_utc: OffsetDateTime,
	pub count_likes: i64,
	pub count_dislikes: i64,
	pub count_comments: i64,
	pub tags: Vec<TagItem>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub og_image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMeta {
	pub total_count: u64,
	pub total_pages: u64,
	pub tags: Vec<FacetItem>,
	pub search_params: SearchParams,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
	pub meta: SearchMeta,
	pub results: Vec<PostSummary>,
}

impl AgoraService {
	pub async fn search(
		&self,
		req: SearchRequest,
	) -> std::result::Result<SearchResponse, SearchError> {
		let outcome = match SearchParams::from_request(&req) {
			Ok(params) => self.search_within_budget(params).await,
			Err(err) => Err(err),
		};

		outcome.map_err(|source| {
			warn!(
				error = %source,
				retryable = source.is_retryable(),
				q = %req.q,
				tags = ?req.tags,
				page = ?req.page,
				order_by = ?req.order_by,
				"Search failed."
			);

			SearchError { request: req, source }
		})
	}

	async fn search_within_budget(&self, params: SearchParams) -> Result<SearchResponse> {
		let budget_ms = self.cfg.search.timeout_ms;

		match tokio::time::timeout(Duration::from_millis(budget_ms), self.execute(params)).await {
			Ok(outcome) => outcome,
			Err(_) => Err(Error::RetrievalTimeout {
				message: format!("storage round-trips exceeded the {budget_ms} ms budget."),
			}),
		}
	}

	async fn execute(&self, params: SearchParams) -> Result<SearchResponse> {
		let terms = keyword::keyword_terms(&params.q);
		let (keyword_set, tag_set) =
			tokio::try_join!(self.match_keyword(&terms), self.match_tags(&params.tags))?;
		let filtered = matching::combine(keyword_set, tag_set);
		let facet_scope = filtered.as_ref().map(MatchSet::ids);
		let matched = match filtered {
			Some(matched) => matched,
			None => MatchSet::from_keys(self.store.all_posts().await?.into_iter().map(sort_key)),
		};
		let total_count = matched.len();

		debug!(
			terms = terms.len(),
			tags = params.tags.len(),
			total_count,
			unfiltered = facet_scope.is_none(),
			"Matched set resolved."
		);

		let order_by = params.order_by;
		let (facets, sorted) = tokio::try_join!(self.count_facets(facet_scope.as_deref()), async {
			Ok::<_, Error>(matched.into_sorted(order_by))
		})?;
		let page_size = self.cfg.search.page_size;
		let page = Page::new(params.page, page_size);
		let results = self.assemble(order_by, page.slice(&sorted)).await?;

		Ok(SearchResponse {
			meta: SearchMeta {
				total_count: total_count as u64,
				total_pages: paging::total_pages(total_count, page_size) as u64,
				tags: facets,
				search_params: params,
			},
			results,
		})
	}

	/// Title substring matches united with full-text content matches. `None` when there are no
	/// terms.
	async fn match_keyword(&self, terms: &[String]) -> Result<Option<MatchSet>> {
		if terms.is_empty() {
			return Ok(None);
		}

		let phrase = keyword::content_phrase(terms);
		let (by_title, by_content) = tokio::try_join!(
			self.store.title_matches(terms),
			self.store.content_matches(&phrase)
		)?;

		debug!(title = by_title.len(), content = by_content.len(), "Keyword matched.");

		let by_title = MatchSet::from_keys(by_title.into_iter().map(sort_key));
		let by_content = MatchSet::from_keys(by_content.into_iter().map(sort_key));

		Ok(Some(by_title.union(by_content)))
	}

	/// Posts carrying every requested tag. `None` when no tags were requested.
	async fn match_tags(&self, names: &[String]) -> Result<Option<MatchSet>> {
		if names.is_empty() {
			return Ok(None);
		}

		let Some(tag_ids) = self.tags.resolve(self.store.as_ref(), names).await? else {
			debug!(?names, "Unknown tag requested.");

			return Ok(Some(MatchSet::default()));
		};
		let rows = self.store.posts_with_all_tags(&tag_ids).await?;

		Ok(Some(MatchSet::from_keys(rows.into_iter().map(sort_key))))
	}

	/// Facets over `scope`, or over the whole corpus when `scope` is `None`.
	async fn count_facets(&self, scope: Option<&[PostId]>) -> Result<Vec<FacetItem>> {
		if scope.is_some_and(<[PostId]>::is_empty) {
			return Ok(Vec::new());
		}

		let rows = self.store.tag_facets(scope).await?;
		let facets = rows
			.into_iter()
			.map(|row| Facet { tag_id: row.tag_id, tag_name: row.name, count: row.post_count })
			.collect();

		Ok(facets::order_facets(facets)
			.into_iter()
			.map(|facet| FacetItem { tag_name: facet.tag_name, count: facet.count })
			.collect())
	}

	/// Hydrates one page. Records are re-sorted with the keys that produced the page slice, so
	/// the display order always agrees with the slice.
	async fn assemble(&self, order_by: OrderBy, page_keys: &[SortKey]) -> Result<Vec<PostSummary>> {
		if page_keys.is_empty() {
			return Ok(Vec::new());
		}

		let post_ids = page_keys.iter().map(|key| key.post_id).collect::<Vec<_>>();
		let (records, tag_rows, comment_rows) = tokio::try_join!(
			self.store.fetch_posts(&post_ids),
			self.store.post_tags(&post_ids),
			self.store.comment_counts(&post_ids)
		)?;
		let keys = page_keys.iter().map(|key| (key.post_id, *key)).collect::<HashMap<_, _>>();
		let mut tags_by_post = HashMap::<PostId, Vec<(i64, String)>>::new();

		for row in tag_rows {
			tags_by_post.entry(row.post_id).or_default().push((row.tag_id, row.name));
		}

		let comments = comment_rows
			.into_iter()
			.map(|row| (row.post_id, row.comment_count))
			.collect::<HashMap<_, _>>();
		let mut records = records
			.into_iter()
			.filter_map(|record| keys.get(&record.post_id).map(|key| (*key, record)))
			.collect::<Vec<_>>();

		records.sort_by(|(a, _), (b, _)| ordering::compare(order_by, a, b));

		Ok(records
			.into_iter()
			.map(|(_, record)| {
				let mut tags = tags_by_post.remove(&record.post_id).unwrap_or_default();

				tags.sort_by_key(|(tag_id, _)| *tag_id);

				let count_comments = comments.get(&record.post_id).copied().unwrap_or(0);

				summarize(record, tags, count_comments)
			})
			.collect())
	}
}

fn sort_key(row: PostSortRow) -> SortKey {
	SortKey { post_id: row.post_id, like_count: row.like_count, published_at: row.published_at }
}

fn summarize(record: PostRecord, tags: Vec<(i64, String)>, count_comments: i64) -> PostSummary {
	PostSummary {
		post_id: record.post_id,
		post_title: record.title,
		post_date_utc: record.published_at,
		count_likes: record.like_count,
		count_dislikes: record.dislike_count,
		count_comments,
		tags: tags.into_iter().map(|(_, tag_name)| TagItem { tag_name }).collect(),
		og_image_url: record.og_image_url,
	}
}
