use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("{}: {source}", path.display())]
    FileIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("reference table i/o: {0}")]
    Io(#[from] io::Error),

    #[error("malformed reference table at line {line}: {reason}")]
    MalformedReferenceTable { line: usize, reason: String },

    #[error(transparent)]
    Region(#[from] tt_core::Error),
}
