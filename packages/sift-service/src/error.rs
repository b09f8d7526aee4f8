pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Retrieval failed: {message}")]
	RetrievalFailed { message: String },
	#[error("Invalid request: {message}")]
	InvalidRequest { message: String },
}
