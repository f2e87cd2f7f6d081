//! A backend that talks to the document-question-answering REST API.
//!
//! Two endpoints are used, both relative to the configured base URL:
//!
//! - `POST /upload` with a `multipart/form-data` body holding one `file`
//!   field.
//! - `POST /query` with a JSON body `{"query": "...", "top_k": 3}`.
//!
//! Failed requests may carry a JSON body `{"detail": ...}`, which is exposed
//! through [`BackendError::detail`]. Bodies of successful requests are read
//! leniently: anything that doesn't fit the expected shape is dropped and
//! never reported as an error.

#[macro_use]
extern crate tracing;

mod config;
mod proto;

use std::error::Error as StdError;
use std::fmt::{self, Display};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use rag_explorer_backend::{
    Backend, BackendError, Document, ErrorKind, QueryRequest, QueryResponse,
    UploadResponse,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use tracing::Instrument;

pub use config::{
    DEFAULT_BASE_URL, HttpBackendConfig, HttpBackendConfigBuilder,
};

/// Error type for [`HttpBackend`].
#[derive(Debug)]
pub struct Error {
    message: String,
    detail: Option<String>,
    status: Option<u16>,
    kind: ErrorKind,
}

impl Error {
    fn new(message: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            message: message.into(),
            detail: None,
            status: None,
            kind,
        }
    }

    fn transport(err: reqwest::Error) -> Self {
        Self::new(format!("{err}"), ErrorKind::Transport)
    }

    /// Returns the error message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code, if the backend answered at all.
    #[inline]
    pub fn status(&self) -> Option<u16> {
        self.status
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
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

/// Backend reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    config: Arc<HttpBackendConfig>,
}

impl HttpBackend {
    /// Creates a new `HttpBackend` with the given configuration.
    #[inline]
    pub fn new(config: HttpBackendConfig) -> Self {
        Self {
            client: Client::new(),
            config: Arc::new(config),
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    fn post(&self, path: &str) -> RequestBuilder {
        let req = self.client.post(self.config.endpoint(path));
        with_timeout(req, self.config.timeout)
    }
}

impl Backend for HttpBackend {
    type Error = Error;

    fn upload_document(
        &self,
        doc: &Document,
    ) -> impl Future<Output = Result<UploadResponse, Self::Error>> + Send + 'static
    {
        debug!(
            "uploading {} ({} bytes, {})",
            doc.file_name(),
            doc.len(),
            doc.content_type()
        );
        let part = Part::bytes(doc.contents().to_vec())
            .file_name(doc.file_name().to_owned())
            .mime_str(doc.content_type().as_ref());
        let resp_fut = part.map(|part| {
            self.post("upload")
                .multipart(Form::new().part("file", part))
                .send()
        });

        async move {
            let resp_fut = resp_fut.map_err(|err| {
                Error::new(format!("Invalid upload: {err}"), ErrorKind::Other)
            })?;
            let body = read_body(resp_fut.await).await?;
            Ok(proto::parse_upload_response(&body))
        }
        .instrument(debug_span!("upload"))
    }

    fn query_documents(
        &self,
        req: &QueryRequest,
    ) -> impl Future<Output = Result<QueryResponse, Self::Error>> + Send + 'static
    {
        let body = proto::create_query_body(req, &self.config);
        trace!("sending query: {body:?}");
        let resp_fut = self.post("query").json(&body).send();

        async move {
            let body = read_body(resp_fut.await).await?;
            Ok(proto::parse_query_response(&body))
        }
        .instrument(debug_span!("query"))
    }
}

#[inline]
fn with_timeout(
    req: RequestBuilder,
    timeout: Option<Duration>,
) -> RequestBuilder {
    match timeout {
        Some(timeout) => req.timeout(timeout),
        None => req,
    }
}

/// Reads the body of a successful response.
async fn read_body(
    resp_or_err: reqwest::Result<Response>,
) -> Result<Bytes, Error> {
    let resp = resp_or_err.map_err(|err| {
        warn!("request failed: {err}");
        Error::transport(err)
    })?;

    let status = resp.status();
    if !status.is_success() {
        // The body is only used for the detail, so a broken body still
        // yields a status error.
        let body = resp.bytes().await.unwrap_or_default();
        let detail = proto::parse_error_detail(&body);
        warn!("backend answered {status}, detail: {detail:?}");
        return Err(Error {
            message: format!(
                "Request failed with status code {}",
                status.as_u16()
            ),
            detail,
            status: Some(status.as_u16()),
            kind: ErrorKind::Status,
        });
    }

    let body = resp.bytes().await.map_err(Error::transport)?;
    trace!("received {} bytes", body.len());
    Ok(body)
}
