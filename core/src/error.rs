use std::path::PathBuf;

/// Fatal failure kinds.
///
/// Everything else (resolution ambiguity, incomparable dependency sets,
/// unknown rule names) downgrades to a `Reject` verdict rather than an
/// error. An `Error` is surfaced to the caller and does not imply `Reject`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to parse `{path}`: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invariant violated: {0}")]
    Invariant(String),

    #[error("unsupported {language} node kind `{kind}`")]
    Unsupported {
        language: &'static str,
        kind: String,
    },
}

impl Error {
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(message.into())
    }

    pub fn unsupported(language: &'static str, kind: impl Into<String>) -> Self {
        Self::Unsupported {
            language,
            kind: kind.into(),
        }
    }
}
