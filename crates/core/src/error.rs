use std::error::Error;
use std::fmt::{self, Display};

use rag_explorer_backend::BackendError;

/// Picks the message to show for a failed backend call.
///
/// The structured detail the backend sent wins, then the generic transport
/// message, then `fallback`. Empty strings are skipped.
pub fn display_message(err: &dyn BackendError, fallback: &str) -> String {
    if let Some(detail) = err.detail().filter(|detail| !detail.is_empty()) {
        return detail.to_owned();
    }
    let message = err.to_string();
    if !message.is_empty() {
        return message;
    }
    fallback.to_owned()
}

/// Why a question was not submitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The question was empty or whitespace only.
    EmptyQuestion,
    /// Another question is still waiting for its answer.
    AlreadyInFlight,
    /// The conversation has shut down.
    Closed,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyQuestion => write!(f, "Ask a question first."),
            Rejection::AlreadyInFlight => {
                write!(f, "Wait for the current answer first.")
            }
            Rejection::Closed => write!(f, "The conversation has ended."),
        }
    }
}

impl Error for Rejection {}

/// Describes a failed upload.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum UploadError {
    /// No file was selected.
    NoFileSelected,
    /// Another upload is still in progress.
    Busy,
    /// The backend call failed. Carries the message to show.
    TransportFailure(String),
}

impl Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NoFileSelected => write!(f, "Select a file first."),
            UploadError::Busy => write!(f, "An upload is already in progress."),
            UploadError::TransportFailure(detail) => f.write_str(detail),
        }
    }
}

impl Error for UploadError {}
