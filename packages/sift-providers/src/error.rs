pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Embedding request failed: {0}")]
	Http(#[from] reqwest::Error),
	#[error("Header {name:?} cannot be sent: {reason}")]
	Header { name: String, reason: String },
	#[error("{message}")]
	InvalidConfig { message: String },
	#[error("Unusable embedding response: {message}")]
	InvalidResponse { message: String },
}
