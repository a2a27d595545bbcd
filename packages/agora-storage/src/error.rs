#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error(transparent)]
	Sqlx(sqlx::Error),
	#[error("Full-text index unavailable: {0}")]
	IndexUnavailable(String),
	#[error("Storage timed out: {0}")]
	Timeout(String),
	#[error("Invalid argument: {0}")]
	InvalidArgument(String),
}
impl Error {
	/// Reclassifies failures of the full-text predicate whose cause is a missing index primitive
	/// (function, text search configuration, or extension) rather than the query itself.
	pub fn from_full_text(err: sqlx::Error) -> Self {
		let missing_primitive = err
			.as_database_error()
			.and_then(|db_err| db_err.code())
			.map(|code| matches!(code.as_ref(), "42883" | "42704" | "58P01" | "0A000"))
			.unwrap_or(false);

		if missing_primitive {
			return Self::IndexUnavailable(err.to_string());
		}

		err.into()
	}
}
impl From<sqlx::Error> for Error {
	fn from(err: sqlx::Error) -> Self {
		match err {
			sqlx::Error::PoolTimedOut => Self::Timeout("connection pool acquire timed out".to_string()),
			other => Self::Sqlx(other),
		}
	}
}
