use std::error::Error;

use crate::document::Document;
use crate::error::ErrorKind;
use crate::request::QueryRequest;
use crate::response::{QueryResponse, UploadResponse};

/// The error type for a backend.
///
/// `Display` should render a generic, transport-level description of the
/// failure. Anything the backend itself reported goes to [`detail`].
///
/// [`detail`]: BackendError::detail
pub trait BackendError: Error + Send + Sync + 'static {
    /// Returns the kind of this error.
    fn kind(&self) -> ErrorKind;

    /// Returns the structured detail the backend attached to the failure,
    /// if there was one.
    fn detail(&self) -> Option<&str> {
        None
    }
}

/// A type that represents a document-question-answering backend.
///
/// Once the backend is created, it should behave like a stateless object.
/// It can still have internal state (connection pools, counters), but
/// callers should not rely on it, and the backend should be prepared for
/// being dropped anytime.
pub trait Backend: Send + Sync {
    /// The error type that may be returned by the backend.
    type Error: BackendError;

    /// Submits a document for ingestion.
    fn upload_document(
        &self,
        doc: &Document,
    ) -> impl Future<Output = Result<UploadResponse, Self::Error>> + Send + 'static;

    /// Asks a question against the ingested documents.
    fn query_documents(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static;
}
