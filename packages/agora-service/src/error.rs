use crate::SearchRequest;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid query: {message}")]
	InvalidQuery { message: String },
	#[error("Full-text index unavailable: {message}")]
	IndexUnavailable { message: String },
	#[error("Retrieval timed out: {message}")]
	RetrievalTimeout { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
}
impl Error {
	/// Searches are read-only, so a timed-out one can be retried as is.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::RetrievalTimeout { .. })
	}
}
impl From<agora_storage::Error> for Error {
	fn from(err: agora_storage::Error) -> Self {
		match err {
			agora_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			agora_storage::Error::IndexUnavailable(message) => Self::IndexUnavailable { message },
			agora_storage::Error::Timeout(message) => Self::RetrievalTimeout { message },
			agora_storage::Error::InvalidArgument(message) => Self::Storage { message },
		}
	}
}

/// A failed search, carrying the request that produced it.
#[derive(Debug, thiserror::Error)]
#[error("Search failed for {request}: {source}")]
pub struct SearchError {
	pub request: SearchRequest,
	#[source]
	pub source: Error,
}
