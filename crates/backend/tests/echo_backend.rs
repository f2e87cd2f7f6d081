use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::future::ready;
use std::time::Duration;

use rag_explorer_backend::{
    Backend, BackendError, Document, ErrorKind, QueryRequest, QueryResponse,
    Source, UploadResponse,
};
use tokio::time::sleep;

#[derive(Debug)]
struct EchoBackendError {
    kind: ErrorKind,
    detail: Option<String>,
}

impl Display for EchoBackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

impl Error for EchoBackendError {}

impl BackendError for EchoBackendError {
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// Answers every question by repeating it, citing every document it has
/// been given so far.
struct EchoBackend {
    documents: Vec<String>,
}

impl Backend for EchoBackend {
    type Error = EchoBackendError;

    fn upload_document(
        &self,
        doc: &Document,
    ) -> impl Future<Output = Result<UploadResponse, Self::Error>> + Send + 'static
    {
        let result = if doc.is_empty() {
            Err(EchoBackendError {
                kind: ErrorKind::Status,
                detail: Some(format!("{} is empty", doc.file_name())),
            })
        } else {
            Ok(UploadResponse::success(format!(
                "Indexed 1 chunks from {}",
                doc.file_name()
            )))
        };
        ready(result)
    }

    fn query_documents(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static
    {
        let query = req.query.clone();
        let documents = self.documents.clone();
        async move {
            sleep(Duration::from_millis(1)).await;
            if documents.is_empty() {
                return Err(EchoBackendError {
                    kind: ErrorKind::Other,
                    detail: None,
                });
            }
            Ok(QueryResponse {
                answer: Some(format!("You asked: {query}")),
                sources: Some(
                    documents.into_iter().map(Source::named).collect(),
                ),
            })
        }
    }
}

#[tokio::test]
async fn test_query() {
    let backend = EchoBackend {
        documents: vec!["a.pdf".to_owned(), "b.txt".to_owned()],
    };
    let resp = backend
        .query_documents(&QueryRequest::new("Good morning"))
        .await
        .unwrap();
    assert_eq!(resp.answer.as_deref(), Some("You asked: Good morning"));
    let labels: Vec<_> = resp
        .sources
        .unwrap()
        .iter()
        .map(|source| source.label().into_owned())
        .collect();
    assert_eq!(labels, ["a.pdf", "b.txt"]);
}

#[tokio::test]
async fn test_query_error() {
    let backend = EchoBackend { documents: vec![] };
    let err = backend
        .query_documents(&QueryRequest::new("Anyone there?"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Other);
    assert!(err.detail().is_none());
}

#[tokio::test]
async fn test_upload() {
    let backend = EchoBackend { documents: vec![] };
    let resp = backend
        .upload_document(&Document::new("a.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(resp.message.as_deref(), Some("Indexed 1 chunks from a.txt"));

    let err = backend
        .upload_document(&Document::new("b.txt", ""))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Status);
    assert_eq!(err.detail(), Some("b.txt is empty"));
}
