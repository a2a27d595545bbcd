use crate::{
	Error, Result,
	db::Db,
	models::{CommentCountRow, PostRecord, PostSortRow, PostTagRow, Tag, TagFacetRow},
};

/// Posts whose title contains every term as a case-sensitive substring.
pub async fn title_matches(db: &Db, terms: &[String]) -> Result<Vec<PostSortRow>> {
	let rows = sqlx::query_as::<_, PostSortRow>(
		"\
SELECT p.post_id, p.like_count, p.published_at
FROM posts p
WHERE NOT EXISTS (
	SELECT 1
	FROM unnest($1::text[]) AS term
	WHERE strpos(p.title, term) = 0
)",
	)
	.bind(terms)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Posts whose content satisfies the full-text predicate for every term of `phrase`.
///
/// `text_search_config` is interpolated so the predicate matches the expression index; callers
/// pass the validated configuration value.
pub async fn content_matches(
	db: &Db,
	text_search_config: &str,
	phrase: &str,
) -> Result<Vec<PostSortRow>> {
	if !agora_config::is_sql_identifier(text_search_config) {
		return Err(Error::InvalidArgument(format!(
			"text search configuration {text_search_config:?} is not a plain identifier"
		)));
	}

	let sql = format!(
		"\
SELECT post_id, like_count, published_at
FROM posts
WHERE to_tsvector('{text_search_config}'::regconfig, content)
	@@ plainto_tsquery('{text_search_config}'::regconfig, $1)"
	);
	let rows = sqlx::query_as::<_, PostSortRow>(&sql)
		.bind(phrase)
		.fetch_all(&db.pool)
		.await
		.map_err(Error::from_full_text)?;

	Ok(rows)
}

pub async fn all_posts(db: &Db) -> Result<Vec<PostSortRow>> {
	let rows = sqlx::query_as::<_, PostSortRow>(
		"SELECT post_id, like_count, published_at FROM posts",
	)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn load_tags(db: &Db) -> Result<Vec<Tag>> {
	let rows = sqlx::query_as::<_, Tag>("SELECT tag_id, name FROM tags ORDER BY tag_id")
		.fetch_all(&db.pool)
		.await?;

	Ok(rows)
}

/// Posts carrying every tag in `tag_ids`. The identifiers must be distinct.
pub async fn posts_with_all_tags(db: &Db, tag_ids: &[i64]) -> Result<Vec<PostSortRow>> {
	let rows = sqlx::query_as::<_, PostSortRow>(
		"\
SELECT p.post_id, p.like_count, p.published_at
FROM posts p
JOIN post_tags pt ON pt.post_id = p.post_id
WHERE pt.tag_id = ANY($1)
GROUP BY p.post_id, p.like_count, p.published_at
HAVING count(DISTINCT pt.tag_id) = $2",
	)
	.bind(tag_ids)
	.bind(tag_ids.len() as i64)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Distinct post counts per tag, over `post_ids` or over the whole corpus when `None`.
pub async fn tag_facets(db: &Db, post_ids: Option<&[i64]>) -> Result<Vec<TagFacetRow>> {
	let rows = match post_ids {
		Some(post_ids) =>
			sqlx::query_as::<_, TagFacetRow>(
				"\
SELECT t.tag_id, t.name, count(DISTINCT pt.post_id) AS post_count
FROM post_tags pt
JOIN tags t ON t.tag_id = pt.tag_id
WHERE pt.post_id = ANY($1)
GROUP BY t.tag_id, t.name",
			)
			.bind(post_ids)
			.fetch_all(&db.pool)
			.await?,
		None =>
			sqlx::query_as::<_, TagFacetRow>(
				"\
SELECT t.tag_id, t.name, count(DISTINCT pt.post_id) AS post_count
FROM post_tags pt
JOIN tags t ON t.tag_id = pt.tag_id
GROUP BY t.tag_id, t.name",
			)
			.fetch_all(&db.pool)
			.await?,
	};

	Ok(rows)
}

/// Bulk fetch by identifier; row order is unspecified.
pub async fn fetch_posts(db: &Db, post_ids: &[i64]) -> Result<Vec<PostRecord>> {
	let rows = sqlx::query_as::<_, PostRecord>(
		"\
SELECT post_id, title, published_at, like_count, dislike_count, og_image_url
FROM posts
WHERE post_id = ANY($1)",
	)
	.bind(post_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

pub async fn post_tags(db: &Db, post_ids: &[i64]) -> Result<Vec<PostTagRow>> {
	let rows = sqlx::query_as::<_, PostTagRow>(
		"\
SELECT pt.post_id, t.tag_id, t.name
FROM post_tags pt
JOIN tags t ON t.tag_id = pt.tag_id
WHERE pt.post_id = ANY($1)
ORDER BY pt.post_id, t.tag_id",
	)
	.bind(post_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}

/// Posts without comments are absent from the result.
pub async fn comment_counts(db: &Db, post_ids: &[i64]) -> Result<Vec<CommentCountRow>> {
	let rows = sqlx::query_as::<_, CommentCountRow>(
		"\
SELECT post_id, count(*) AS comment_count
FROM comments
WHERE post_id = ANY($1)
GROUP BY post_id",
	)
	.bind(post_ids)
	.fetch_all(&db.pool)
	.await?;

	Ok(rows)
}
