//! GridCertLib errors.

use std::path::PathBuf;

/// A GridCertLib error.
///
/// A missing credential file is not an error: it makes the gate redirect. Everything in here
/// aborts the request.
#[derive(Debug)]
pub enum Error {
    /// A filesystem operation failed for a reason other than the file being absent.
    Filesystem {
        /// The path the operation was applied to.
        path: PathBuf,
        /// The underlying IO error.
        source: std::io::Error,
    },
    /// The host session store could not be read or written.
    Session(String),
    /// A required configuration value was not set.
    ConfigurationMissing(&'static str),
    /// The username cannot be used as a directory name.
    InvalidUsername(String),
}

impl Error {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Filesystem { path, source } => {
                write!(f, "filesystem error on {}: {source}", path.display())
            }
            Self::Session(e) => write!(f, "session error: {e}"),
            Self::ConfigurationMissing(name) => write!(f, "missing configuration: {name}"),
            Self::InvalidUsername(u) => write!(f, "invalid username: {u:?}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Filesystem { source, .. } => Some(source),
            _ => None,
        }
    }
}
