pub mod facets;
pub mod keyword;
pub mod matching;
pub mod ordering;
pub mod paging;

pub type PostId = i64;

pub type TagId = i64;
