use crate::TagId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
	pub tag_id: TagId,
	pub tag_name: String,
	pub count: i64,
}

/// Orders facets by descending count, breaking ties by ascending tag identifier.
pub fn order_facets(mut facets: Vec<Facet>) -> Vec<Facet> {
	facets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.tag_id.cmp(&b.tag_id)));

	facets
}
