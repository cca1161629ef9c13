use std::fmt;
use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    InvalidHeaderPattern {
        pattern: String,
        reason: String,
    },
    InvalidConfig {
        reason: String,
    },
    AlreadyInitialized {
        path: PathBuf,
    },
    MissingUnreleasedSection {
        path: PathBuf,
    },
    EmptyReleaseNotAllowed {
        version: String,
    },
    DuplicateVersion {
        version: String,
    },
    VersionNotFound {
        version: String,
    },
    FileReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    FileWriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    TomlParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    IoError(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidHeaderPattern { pattern, reason } => {
                write!(f, "invalid header pattern '{}': {}", pattern, reason)
            }
            Error::InvalidConfig { reason } => {
                write!(f, "invalid changelog configuration: {}", reason)
            }
            Error::AlreadyInitialized { path } => {
                write!(f, "changelog already initialized: {}", path.display())
            }
            Error::MissingUnreleasedSection { path } => {
                write!(f, "no unreleased section found in: {}", path.display())
            }
            Error::EmptyReleaseNotAllowed { version } => {
                write!(
                    f,
                    "refusing to release {}: unreleased section has no items",
                    version
                )
            }
            Error::DuplicateVersion { version } => {
                write!(f, "version {} is already present in the changelog", version)
            }
            Error::VersionNotFound { version } => {
                write!(f, "version not found in changelog: {}", version)
            }
            Error::FileReadError { path, source } => {
                write!(f, "failed to read file: {} ({})", path.display(), source)
            }
            Error::FileWriteError { path, source } => {
                write!(f, "failed to write file: {} ({})", path.display(), source)
            }
            Error::TomlParseError { path, source } => {
                write!(
                    f,
                    "failed to parse toml file: {} ({})",
                    path.display(),
                    source
                )
            }
            Error::IoError(err) => {
                write!(f, "io error: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FileReadError { source, .. } => Some(source),
            Error::FileWriteError { source, .. } => Some(source),
            Error::TomlParseError { source, .. } => Some(source),
            Error::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl Error {
    /// true for the "not found" outcome of a version lookup
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::VersionNotFound { .. })
    }
}
