use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Cannot read sift config {path:?}: {source}")]
	Read { path: PathBuf, source: std::io::Error },
	#[error("Sift config {path:?} is not valid TOML: {source}")]
	Parse { path: PathBuf, source: Box<toml::de::Error> },
	#[error("Invalid sift config: {message}")]
	Validation { message: String },
}
