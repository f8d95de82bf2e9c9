pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("Failed to read index artifact at {path:?}.")]
	ReadArtifact { path: std::path::PathBuf, source: std::io::Error },
	#[error("Failed to parse index artifact at {path:?}, line {line}.")]
	ParseArtifact { path: std::path::PathBuf, line: usize, source: serde_json::Error },
	#[error("Duplicate passage id {id}.")]
	DuplicatePassage { id: String },
	#[error("Embedding for {context} has {actual} dimensions, expected {expected}.")]
	DimensionMismatch { context: String, expected: usize, actual: usize },
}
