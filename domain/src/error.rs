use std::num::{ParseFloatError, ParseIntError};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0} for {1}")]
    ParseInt(#[source] ParseIntError, &'static str),
    #[error("{0} for {1}")]
    ParseFloat(#[source] ParseFloatError, &'static str),
    #[error("page must be at least 1, got {0}")]
    InvalidPage(i32),
    #[error("page size must be at least 1, got {0}")]
    InvalidPageSize(i32),
    #[error("episode count {current} overflows when adding {delta}")]
    EpisodeOverflow { current: i32, delta: i32 },
}

impl Error {
    /// Whether the error was caused by the caller's input rather than the stored data.
    #[must_use]
    pub fn is_bad_request(&self) -> bool {
        matches!(self, Self::InvalidPage(_) | Self::InvalidPageSize(_))
    }
}
