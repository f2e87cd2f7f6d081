use std::pin::Pin;
use std::sync::Arc;

use rag_explorer_backend::{
    Backend, BackendError, Document, QueryRequest, QueryResponse,
    UploadResponse,
};
use tracing::Instrument;

type BoxedResult<T> = Result<T, Box<dyn BackendError>>;
type BoxedFuture<T> = Pin<Box<dyn Future<Output = BoxedResult<T>> + Send>>;
#[rustfmt::skip]
type QueryFn = Arc<
    dyn Fn(QueryRequest) -> BoxedFuture<QueryResponse> + Send + Sync
>;
#[rustfmt::skip]
type UploadFn = Arc<
    dyn Fn(Document) -> BoxedFuture<UploadResponse> + Send + Sync
>;

/// A wrapper around a backend that provides a type-erased interface for
/// the other modules.
///
/// Cloning is cheap, all clones share the same backend.
#[derive(Clone)]
pub struct BackendClient {
    query_fn: QueryFn,
    upload_fn: UploadFn,
}

impl BackendClient {
    /// Wraps the given backend.
    pub fn new<B: Backend + 'static>(backend: B) -> Self {
        // We have to erase the type `B`, since `BackendClient` doesn't have a
        // generic parameter and we don't want it either.
        let backend = Arc::new(backend);

        let query_fn: QueryFn = {
            let backend = Arc::clone(&backend);
            Arc::new(move |req: QueryRequest| -> BoxedFuture<QueryResponse> {
                let fut = backend.query_documents(&req);
                Box::pin(
                    async move {
                        trace!("got a query: {:?}", req.query);
                        let resp_or_err = fut.await.map_err(erase_error::<B>);
                        trace!("finished a query");
                        resp_or_err
                    }
                    .instrument(trace_span!("backend query")),
                )
            })
        };

        let upload_fn: UploadFn = Arc::new(
            move |doc: Document| -> BoxedFuture<UploadResponse> {
                let fut = backend.upload_document(&doc);
                Box::pin(
                    async move {
                        trace!("got an upload: {}", doc.file_name());
                        let resp_or_err =
                            fut.await.map_err(erase_error::<B>);
                        trace!("finished an upload");
                        resp_or_err
                    }
                    .instrument(trace_span!("backend upload")),
                )
            },
        );

        Self {
            query_fn,
            upload_fn,
        }
    }

    /// Asks a question and returns the backend's answer.
    #[inline]
    pub async fn query_documents(
        &self,
        req: QueryRequest,
    ) -> Result<QueryResponse, Box<dyn BackendError>> {
        (self.query_fn)(req).await
    }

    /// Submits a document for ingestion.
    #[inline]
    pub async fn upload_document(
        &self,
        doc: Document,
    ) -> Result<UploadResponse, Box<dyn BackendError>> {
        (self.upload_fn)(doc).await
    }
}

fn erase_error<B: Backend>(err: B::Error) -> Box<dyn BackendError> {
    error!("got an error: {err:?}");
    Box::new(err)
}
