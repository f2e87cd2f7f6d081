use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of error that occurred.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The backend could not be reached, or the connection broke.
    Transport,
    /// The backend answered with a non-success status.
    Status,
    /// The response body could not be decoded.
    Decode,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Transport => write!(f, "Transport error"),
            ErrorKind::Status => write!(f, "Backend error"),
            ErrorKind::Decode => write!(f, "Malformed response"),
            ErrorKind::Other => write!(f, "Unknown error"),
        }
    }
}
