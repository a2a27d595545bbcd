use std::collections::BTreeMap;

use crate::{
	PostId,
	ordering::{OrderBy, SortKey, sort_keys},
};

/// A set of matched posts, each carrying the fields needed to sort it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchSet {
	keys: BTreeMap<PostId, SortKey>,
}
impl MatchSet {
	pub fn from_keys(keys: impl IntoIterator<Item = SortKey>) -> Self {
		Self { keys: keys.into_iter().map(|key| (key.post_id, key)).collect() }
	}

	pub fn len(&self) -> usize {
		self.keys.len()
	}

	pub fn is_empty(&self) -> bool {
		self.keys.is_empty()
	}

	pub fn contains(&self, post_id: PostId) -> bool {
		self.keys.contains_key(&post_id)
	}

	/// Ascending post identifiers.
	pub fn ids(&self) -> Vec<PostId> {
		self.keys.keys().copied().collect()
	}

	pub fn union(mut self, other: Self) -> Self {
		for (post_id, key) in other.keys {
			self.keys.entry(post_id).or_insert(key);
		}

		self
	}

	pub fn intersect(mut self, other: &Self) -> Self {
		self.keys.retain(|post_id, _| other.keys.contains_key(post_id));

		self
	}

	pub fn into_sorted(self, order: OrderBy) -> Vec<SortKey> {
		let mut keys = self.keys.into_values().collect::<Vec<_>>();

		sort_keys(order, &mut keys);

		keys
	}
}

/// Combines the keyword and tag matcher outputs. `None` for a matcher means it was inactive.
///
/// Returns `None` when neither matcher is active, in which case the whole corpus matches.
pub fn combine(keyword: Option<MatchSet>, tagged: Option<MatchSet>) -> Option<MatchSet> {
	match (keyword, tagged) {
		(None, None) => None,
		(Some(keyword), None) => Some(keyword),
		(None, Some(tagged)) => Some(tagged),
		(Some(keyword), Some(tagged)) => Some(keyword.intersect(&tagged)),
	}
}

#[cfg(test)]
mod tests {
	use time::OffsetDateTime;

	use crate::{
		matching::{MatchSet, combine},
		ordering::{OrderBy, SortKey},
	};

	fn set(ids: &[i64]) -> MatchSet {
		MatchSet::from_keys(ids.iter().map(|&post_id| SortKey {
			post_id,
			like_count: post_id * 2,
			published_at: OffsetDateTime::from_unix_timestamp(1_700_000_000 + post_id)
				.expect("timestamp"),
		}))
	}

	#[test]
	fn union_keeps_each_post_once() {
		let merged = set(&[1, 2, 3]).union(set(&[3, 4]));

		assert_eq!(merged.ids(), vec![1, 2, 3, 4]);
	}

	#[test]
	fn combine_covers_all_four_branches() {
		assert_eq!(combine(None, None), None);
		assert_eq!(combine(Some(set(&[1, 2])), None), Some(set(&[1, 2])));
		assert_eq!(combine(None, Some(set(&[2, 5]))), Some(set(&[2, 5])));
		assert_eq!(combine(Some(set(&[1, 2, 3])), Some(set(&[2, 3, 9]))), Some(set(&[2, 3])));
	}

	#[test]
	fn empty_active_matcher_empties_the_intersection() {
		let combined = combine(Some(set(&[1, 2])), Some(MatchSet::default()))
			.expect("Both matchers are active.");

		assert!(combined.is_empty());
	}

	#[test]
	fn into_sorted_applies_order() {
		let sorted = set(&[4, 1, 3]).into_sorted(OrderBy::TimeAsc);

		assert_eq!(sorted.iter().map(|key| key.post_id).collect::<Vec<_>>(), vec![1, 3, 4]);
	}
}
