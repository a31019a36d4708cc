pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
	#[error("Invalid caller token: {message}")]
	InvalidCaller { message: String },
	#[error("Forbidden: {message}")]
	Forbidden { message: String },
	#[error("Engine error: {message}")]
	Engine { message: String },
	#[error("Storage error: {message}")]
	Storage { message: String },
	#[error("Internal error: {message}")]
	Internal { message: String },
}
impl Error {
	/// Upstream failures may succeed when retried unchanged. Everything else will not.
	pub fn is_retryable(&self) -> bool {
		matches!(self, Self::Engine { .. } | Self::Storage { .. })
	}
}

impl From<nav_domain::Error> for Error {
	fn from(err: nav_domain::Error) -> Self {
		Self::InvalidRequest { message: err.to_string() }
	}
}

impl From<nav_engine::Error> for Error {
	fn from(err: nav_engine::Error) -> Self {
		Self::Engine { message: err.to_string() }
	}
}

impl From<nav_storage::Error> for Error {
	fn from(err: nav_storage::Error) -> Self {
		match err {
			nav_storage::Error::Sqlx(inner) => Self::Storage { message: inner.to_string() },
		}
	}
}
