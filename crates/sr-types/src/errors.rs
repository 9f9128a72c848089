//! Error taxonomy for a discovery run.
//!
//! Only [`FetchError`] crosses the pipeline boundary. Probe failures are values
//! ([`crate::ProbeOutcome::Unreachable`]) and empty results are plain empty sequences.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// High-level error classification for logging and API responses.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Connection, TLS, timeout or non-success HTTP status while fetching.
    Transport,
    /// The payload could not be decoded into a candidate list.
    Parse,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Transport => "transport",
            Self::Parse => "parse",
        };
        f.write_str(s)
    }
}

/// Fatal failure of the candidate source. A run that hits this has nothing to work with.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Transport(String),

    #[error("failed to parse candidate list: {0}")]
    Parse(String),
}

impl FetchError {
    #[inline]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transport(_) => ErrorClass::Transport,
            Self::Parse(_) => ErrorClass::Parse,
        }
    }

    #[inline]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    #[inline]
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }
}
