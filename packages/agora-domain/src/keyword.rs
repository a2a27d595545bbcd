/// Collapses every whitespace run, ideographic space (U+3000) included, into a single ASCII
/// space and trims both ends.
pub fn normalize_keyword(raw: &str) -> String {
	raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a raw keyword into the AND-combined search terms. Case is preserved because title
/// matching is case-sensitive.
pub fn keyword_terms(raw: &str) -> Vec<String> {
	normalize_keyword(raw).split(' ').filter(|term| !term.is_empty()).map(str::to_string).collect()
}

/// The phrase handed to the full-text predicate: all terms, space-joined.
pub fn content_phrase(terms: &[String]) -> String {
	terms.join(" ")
}

#[cfg(test)]
mod tests {
	use crate::keyword::{content_phrase, keyword_terms, normalize_keyword};

	#[test]
	fn collapses_mixed_width_whitespace() {
		assert_eq!(normalize_keyword("\u{3000}rust\u{3000}\u{3000} async \t io "), "rust async io");
	}

	#[test]
	fn blank_keyword_has_no_terms() {
		assert!(keyword_terms("").is_empty());
		assert!(keyword_terms(" \u{3000} \n").is_empty());
	}

	#[test]
	fn terms_keep_case_and_order() {
		assert_eq!(keyword_terms("Tokio  tokio\u{3000}TOKIO"), vec!["Tokio", "tokio", "TOKIO"]);
	}

	#[test]
	fn normalization_is_idempotent() {
		for raw in ["", "a", "  a\u{3000}b  ", "x\u{3000}\u{3000}\u{3000}y\tz", "\u{3000}"] {
			let once = keyword_terms(raw);
			let twice = keyword_terms(&once.join(" "));

			assert_eq!(once, twice, "raw keyword {raw:?}");
			assert_eq!(normalize_keyword(&normalize_keyword(raw)), normalize_keyword(raw));
		}
	}

	#[test]
	fn phrase_joins_terms_with_single_spaces() {
		let terms = keyword_terms("borrow\u{3000}checker");

		assert_eq!(content_phrase(&terms), "borrow checker");
	}
}
