/// A 1-based page over a sorted list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
	number: u32,
	size: u32,
}
impl Page {
	pub fn new(number: u32, size: u32) -> Self {
		Self { number: number.max(1), size: size.max(1) }
	}

	pub fn offset(&self) -> usize {
		(self.number as usize).saturating_sub(1).saturating_mul(self.size as usize)
	}

	/// Clamped to the list length; a page past the end is empty.
	pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
		let start = self.offset().min(items.len());
		let end = start.saturating_add(self.size as usize).min(items.len());

		&items[start..end]
	}

	pub fn expected_len(&self, total: usize) -> usize {
		total.saturating_sub(self.offset()).min(self.size as usize)
	}
}

pub fn total_pages(total: usize, page_size: u32) -> usize {
	total.div_ceil(page_size.max(1) as usize)
}
