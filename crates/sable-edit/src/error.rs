use camino::Utf8PathBuf;
use thiserror::Error;

pub type Result<T, E = EditError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum EditError {
    /// The request is structurally impossible: a removed node was used, a
    /// kind assertion failed, a cache key was replaced twice.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Structure the engine recognizes but does not handle.
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// An out-of-range index or position.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The reparsed tree does not line up with the previous one. The source
    /// file this happened in is no longer usable.
    #[error("tree replacement failed: {0}")]
    TreeReplacement(String),

    #[error("file not found: {0}")]
    FileNotFound(Utf8PathBuf),

    #[error("filesystem error at {path}")]
    Io {
        path: Utf8PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EditError {
    pub(crate) fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation(message.into())
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    pub(crate) fn tree_replacement(message: impl Into<String>) -> Self {
        Self::TreeReplacement(message.into())
    }
}
