//! A local fake backend for testing purpose.

mod preset;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rag_explorer_backend::{
    Backend, BackendError, Document, ErrorKind, QueryRequest, QueryResponse,
    UploadResponse,
};
use tokio::sync::watch;
use tokio::time::sleep;

pub use preset::*;

#[derive(Debug)]
pub struct Error {
    message: String,
    detail: Option<String>,
    kind: ErrorKind,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for Error {}

impl BackendError for Error {
    #[inline]
    fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

impl From<PresetFailure> for Error {
    fn from(failure: PresetFailure) -> Self {
        Self {
            message: failure.message,
            detail: failure.detail,
            kind: failure.kind,
        }
    }
}

#[derive(Default)]
struct Script {
    queries: VecDeque<PresetReply<QueryResponse>>,
    uploads: VecDeque<PresetReply<UploadResponse>>,
    received_queries: Vec<QueryRequest>,
    received_uploads: Vec<String>,
}

struct Inner {
    script: Mutex<Script>,
    query_calls: AtomicUsize,
    upload_calls: AtomicUsize,
    delay: Mutex<Option<Duration>>,
    paused: watch::Sender<bool>,
}

/// A local fake backend for testing purpose.
///
/// Replies are scripted up front and consumed in call order, queries and
/// uploads from separate queues. A call with nothing left in its queue
/// fails with [`ErrorKind::Other`].
///
/// Clones share the script and the counters, so a test can keep one clone
/// for assertions after handing another to the code under test.
///
/// # Note
///
/// This type is not optimized for production use. You should only use it
/// for testing.
#[derive(Clone)]
pub struct TestBackend {
    inner: Arc<Inner>,
}

impl Default for TestBackend {
    fn default() -> Self {
        let (paused, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                script: Default::default(),
                query_calls: Default::default(),
                upload_calls: Default::default(),
                delay: Default::default(),
                paused,
            }),
        }
    }
}

impl TestBackend {
    /// Appends a scripted reply for the next unanswered query.
    #[inline]
    pub fn add_query_reply(&self, reply: PresetReply<QueryResponse>) {
        self.script().queries.push_back(reply);
    }

    /// Scripts a successful answer citing the named sources.
    pub fn add_answer<S, I>(&self, answer: S, sources: I)
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.add_query_reply(PresetReply::Success(QueryResponse::with_answer(
            answer, sources,
        )));
    }

    /// Scripts a failed query.
    #[inline]
    pub fn add_query_failure(&self, failure: PresetFailure) {
        self.add_query_reply(PresetReply::Failure(failure));
    }

    /// Appends a scripted reply for the next unanswered upload.
    #[inline]
    pub fn add_upload_reply(&self, reply: PresetReply<UploadResponse>) {
        self.script().uploads.push_back(reply);
    }

    /// Scripts an accepted upload with the given confirmation.
    #[inline]
    pub fn add_upload_accepted<S: Into<String>>(&self, message: S) {
        self.add_upload_reply(PresetReply::Success(UploadResponse::success(
            message,
        )));
    }

    /// Scripts a failed upload.
    #[inline]
    pub fn add_upload_failure(&self, failure: PresetFailure) {
        self.add_upload_reply(PresetReply::Failure(failure));
    }

    /// Delays every reply by `duration`.
    #[inline]
    pub fn set_delay(&self, duration: Duration) {
        *self.inner.delay.lock().unwrap_or_else(PoisonError::into_inner) =
            Some(duration);
    }

    /// Holds every reply, including ones already in progress, until
    /// [`resume`](Self::resume) is called.
    #[inline]
    pub fn pause(&self) {
        self.inner.paused.send_replace(true);
    }

    /// Releases held replies.
    #[inline]
    pub fn resume(&self) {
        self.inner.paused.send_replace(false);
    }

    /// Returns how many times `query_documents` has been called.
    #[inline]
    pub fn query_calls(&self) -> usize {
        self.inner.query_calls.load(Ordering::SeqCst)
    }

    /// Returns how many times `upload_document` has been called.
    #[inline]
    pub fn upload_calls(&self) -> usize {
        self.inner.upload_calls.load(Ordering::SeqCst)
    }

    /// Returns every query received so far, in call order.
    pub fn received_queries(&self) -> Vec<QueryRequest> {
        self.script().received_queries.clone()
    }

    /// Returns the file names of every upload received so far.
    pub fn received_uploads(&self) -> Vec<String> {
        self.script().received_uploads.clone()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.inner
            .script
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reply<T: Send + 'static>(
        &self,
        preset: Option<PresetReply<T>>,
    ) -> impl Future<Output = Result<T, Error>> + Send + 'static {
        let delay = *self
            .inner
            .delay
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut paused = self.inner.paused.subscribe();
        async move {
            // An error means every clone of the backend is gone, there is
            // nobody left to resume us.
            let _ = paused.wait_for(|paused| !*paused).await;
            sleep(delay.unwrap_or(Duration::from_millis(1))).await;
            match preset {
                Some(PresetReply::Success(value)) => Ok(value),
                Some(PresetReply::Failure(failure)) => Err(failure.into()),
                None => Err(Error {
                    message: "no preset reply left".to_owned(),
                    detail: None,
                    kind: ErrorKind::Other,
                }),
            }
        }
    }
}

impl Backend for TestBackend {
    type Error = crate::Error;

    fn upload_document(
        &self,
        doc: &Document,
    ) -> impl Future<Output = Result<UploadResponse, Self::Error>> + Send + 'static
    {
        self.inner.upload_calls.fetch_add(1, Ordering::SeqCst);
        let preset = {
            let mut script = self.script();
            script.received_uploads.push(doc.file_name().to_owned());
            script.uploads.pop_front()
        };
        self.reply(preset)
    }

    fn query_documents(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static
    {
        self.inner.query_calls.fetch_add(1, Ordering::SeqCst);
        let preset = {
            let mut script = self.script();
            script.received_queries.push(req.clone());
            script.queries.pop_front()
        };
        self.reply(preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_queries() {
        let backend = TestBackend::default();
        backend.add_answer("30 days", ["policy.pdf"]);
        backend.add_query_failure(PresetFailure::rejected("index not ready"));

        let resp = backend
            .query_documents(&QueryRequest::new("What is the refund policy?"))
            .await
            .unwrap();
        assert_eq!(resp.answer.as_deref(), Some("30 days"));
        assert_eq!(resp.sources.unwrap()[0].label(), "policy.pdf");

        let err = backend
            .query_documents(&QueryRequest::new("Who wrote this?"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.detail(), Some("index not ready"));

        let err = backend
            .query_documents(&QueryRequest::new("And now?"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Other);
        assert_eq!(err.to_string(), "no preset reply left");

        assert_eq!(backend.query_calls(), 3);
        assert_eq!(backend.upload_calls(), 0);
        let queries: Vec<_> = backend
            .received_queries()
            .into_iter()
            .map(|req| req.query)
            .collect();
        assert_eq!(
            queries,
            ["What is the refund policy?", "Who wrote this?", "And now?"]
        );
    }

    #[tokio::test]
    async fn test_scripted_uploads() {
        let backend = TestBackend::default();
        backend.add_upload_accepted("Indexed 3 chunks from a.txt");
        backend.add_upload_failure(PresetFailure::transport("Network Error"));

        let shared = backend.clone();
        let resp = shared
            .upload_document(&Document::new("a.txt", "hello"))
            .await
            .unwrap();
        assert_eq!(
            resp.message.as_deref(),
            Some("Indexed 3 chunks from a.txt")
        );

        let err = shared
            .upload_document(&Document::new("b.txt", "world"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "Network Error");
        assert!(err.detail().is_none());

        assert_eq!(backend.upload_calls(), 2);
        assert_eq!(backend.received_uploads(), ["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_pause_holds_replies() {
        let backend = TestBackend::default();
        backend.add_answer("later", Vec::<String>::new());
        backend.pause();

        let fut = backend.query_documents(&QueryRequest::new("Hold on"));
        let task = tokio::spawn(fut);
        sleep(Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        backend.resume();
        let resp = task.await.unwrap().unwrap();
        assert_eq!(resp.answer.as_deref(), Some("later"));
    }
}
