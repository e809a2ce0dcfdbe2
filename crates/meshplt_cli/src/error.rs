use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
	#[error(transparent)]
	Core(#[from] meshplt::Error),
	#[error("cannot read {}: {source}", path.display())]
	Read { path: PathBuf, source: std::io::Error },
	#[error("invalid block description {}: {source}", path.display())]
	Problem { path: PathBuf, source: serde_json::Error },
	#[error("field not found: {name}")]
	FieldNotFound { name: String },
}
