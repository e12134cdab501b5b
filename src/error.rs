use thiserror::Error;

/// Library error type for caption editing operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A font family was requested that the catalog does not contain.
    #[error("unknown font family: {0}")]
    UnknownFont(String),

    /// The color catalog lists the same token more than once.
    #[error("duplicate color option: {0}")]
    DuplicateColor(String),

    /// The font catalog lists the same family more than once.
    #[error("duplicate font family: {0}")]
    DuplicateFont(String),

    /// A web-font query could not be parsed.
    #[error("invalid web-font query: {0:?}")]
    InvalidWebFontQuery(String),

    /// None of the requested web fonts could be made available.
    #[error("font load failed: {0}")]
    FontLoad(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
