use std::{cmp::Ordering, fmt};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::PostId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderBy {
	#[serde(rename = "likes", alias = "likesDesc")]
	LikesDesc,
	#[default]
	#[serde(rename = "timeDesc")]
	TimeDesc,
	#[serde(rename = "timeAsc")]
	TimeAsc,
}
impl OrderBy {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw {
			"likes" | "likesDesc" => Some(Self::LikesDesc),
			"timeDesc" => Some(Self::TimeDesc),
			"timeAsc" => Some(Self::TimeAsc),
			_ => None,
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			Self::LikesDesc => "likes",
			Self::TimeDesc => "timeDesc",
			Self::TimeAsc => "timeAsc",
		}
	}
}
impl fmt::Display for OrderBy {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The fields a matched post contributes to ordering, materialized before sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
	pub post_id: PostId,
	pub like_count: i64,
	pub published_at: OffsetDateTime,
}

/// The single comparator used both to slice pages and to order hydrated records.
///
/// Every order ends on the post identifier, so two distinct posts never compare equal.
pub fn compare(order: OrderBy, a: &SortKey, b: &SortKey) -> Ordering {
	match order {
		OrderBy::LikesDesc => b
			.like_count
			.cmp(&a.like_count)
			.then_with(|| b.published_at.cmp(&a.published_at))
			.then_with(|| b.post_id.cmp(&a.post_id)),
		OrderBy::TimeDesc =>
			b.published_at.cmp(&a.published_at).then_with(|| b.post_id.cmp(&a.post_id)),
		OrderBy::TimeAsc =>
			a.published_at.cmp(&b.published_at).then_with(|| a.post_id.cmp(&b.post_id)),
	}
}

pub fn sort_keys(order: OrderBy, keys: &mut [SortKey]) {
	keys.sort_by(|a, b| compare(order, a, b));
}
