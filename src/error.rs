use std::path::{Path, PathBuf};

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Process-level errors. Anything returned here ends the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors from terminal setup or teardown.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Recoverable errors carried as data on completion events and pane state.
///
/// None of these stop the event loop: panes render the message inline and
/// keep accepting input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// A directory could not be listed. The container is shown as empty.
    #[error("cannot list {}: {reason}", path.display())]
    Enumeration { path: PathBuf, reason: String },

    /// A structured document is malformed.
    #[error("cannot parse {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },

    /// A resource could not be read.
    #[error("cannot read {}: {reason}", path.display())]
    Load { path: PathBuf, reason: String },

    /// An edited buffer could not be written back.
    #[error("cannot save {}: {reason}", path.display())]
    Persist { path: PathBuf, reason: String },
}

impl ContentError {
    pub fn enumeration(path: &Path, reason: impl ToString) -> Self {
        Self::Enumeration {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(path: &Path, reason: impl ToString) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn load(path: &Path, reason: impl ToString) -> Self {
        Self::Load {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }

    pub fn persist(path: &Path, reason: impl ToString) -> Self {
        Self::Persist {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}
