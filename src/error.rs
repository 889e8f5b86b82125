//! Typed failures for a single transfer session

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Classification tag carried by every [`TransferError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Path,
    Io,
    Protocol,
    Transport,
    Unclassified,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Path => "path",
            ErrorKind::Io => "io",
            ErrorKind::Protocol => "protocol",
            ErrorKind::Transport => "transport",
            ErrorKind::Unclassified => "unclassified",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    /// Source file or destination path missing or not creatable
    #[error("file or path not found: {}", .path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// OS-level failure while reading or writing a file or socket
    #[error("i/o error on {context}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// Malformed, truncated or rejected handshake
    #[error("protocol error: {0}")]
    Protocol(String),

    /// bind/connect/accept failure
    #[error("transport error: {context}")]
    Transport {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("unexpected error: {0}")]
    Unclassified(String),
}

pub type Result<T, E = TransferError> = std::result::Result<T, E>;

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Path { .. } => ErrorKind::Path,
            TransferError::Io { .. } => ErrorKind::Io,
            TransferError::Protocol(_) => ErrorKind::Protocol,
            TransferError::Transport { .. } => ErrorKind::Transport,
            TransferError::Unclassified(_) => ErrorKind::Unclassified,
        }
    }

    /// Classify a filesystem error on `path`: NotFound is a path error, anything else is I/O.
    pub fn fs(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            TransferError::Path {
                path: path.to_path_buf(),
                source,
            }
        } else {
            TransferError::Io {
                context: path.display().to_string(),
                source,
            }
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn transport(context: impl Into<String>, source: io::Error) -> Self {
        TransferError::Transport {
            context: context.into(),
            source,
        }
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        TransferError::Protocol(msg.into())
    }
}
