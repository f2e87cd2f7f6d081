use serde::{Deserialize, Serialize};

/// A question to be sent to the backend.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryRequest {
    /// The question text, already trimmed by the caller.
    pub query: String,
    /// How many passages the backend should retrieve. The backend picks
    /// its own default when this is `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

impl QueryRequest {
    /// Creates a request for the given question.
    #[inline]
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            query: query.into(),
            top_k: None,
        }
    }

    /// Sets the number of passages to retrieve.
    #[inline]
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.top_k = Some(top_k);
        self
    }
}
