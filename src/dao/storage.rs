use std::{error::Error, fmt};
use thiserror::Error;

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Kinds of records kept by a [`ShowStore`](crate::dao::show_store::ShowStore).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Game,
    Round,
    Question,
    Viewer,
    Expert,
}

impl RecordKind {
    /// Collection (or table) name used by document stores.
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Game => "games",
            Self::Round => "rounds",
            Self::Question => "questions",
            Self::Viewer => "viewers",
            Self::Expert => "experts",
        }
    }

    /// Singular label used in error messages.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Game => "game",
            Self::Round => "round",
            Self::Question => "question",
            Self::Viewer => "viewer",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error raised by storage backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or failed the operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A stored record could not be decoded into its entity.
    #[error("stored {kind} `{id}` is unreadable: {message}")]
    Corrupted {
        kind: RecordKind,
        id: String,
        message: String,
    },
}

impl StorageError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StorageError::Unavailable {
            message,
            source: Box::new(source),
        }
    }
}
