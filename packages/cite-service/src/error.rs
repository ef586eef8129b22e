pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Provider error: {message}")]
	Provider { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Retrieval exceeded its {elapsed_ms} ms deadline.")]
	Timeout { elapsed_ms: u64 },
}
impl From<cite_providers::Error> for Error {
	fn from(err: cite_providers::Error) -> Self {
		Self::Provider { message: err.to_string() }
	}
}

impl From<cite_storage::Error> for Error {
	fn from(err: cite_storage::Error) -> Self {
		match err {
			cite_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
			cite_storage::Error::InvalidArgument(message) => Self::InvalidRequest { message },
		}
	}
}

impl From<cite_domain::RankError> for Error {
	fn from(err: cite_domain::RankError) -> Self {
		Self::Storage { message: err.to_string() }
	}
}
