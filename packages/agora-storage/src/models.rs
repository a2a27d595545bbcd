use time::OffsetDateTime;

/// The fields of a post needed to sort it.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostSortRow {
	pub post_id: i64,
	pub like_count: i64,
	pub published_at: OffsetDateTime,
}

/// A post as shown in search results; the HTML content is not hydrated.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
	pub post_id: i64,
	pub title: String,
	pub published_at: OffsetDateTime,
	pub like_count: i64,
	pub dislike_count: i64,
	pub og_image_url: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Tag {
	pub tag_id: i64,
	pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostTagRow {
	pub post_id: i64,
	pub tag_id: i64,
	pub name: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TagFacetRow {
	pub tag_id: i64,
	pub name: String,
	pub post_count: i64,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentCountRow {
	pub post_id: i64,
	pub comment_count: i64,
}
