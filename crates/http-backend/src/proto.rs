use rag_explorer_backend::{
    QueryRequest, QueryResponse, Source, UploadResponse,
};
use serde::Deserialize;
use serde_json::Value;

use crate::HttpBackendConfig;

/// The body of a failed request, as produced by the backend's framework.
///
/// `detail` is usually a string, but validation failures carry a list of
/// objects instead.
#[derive(Clone, Debug, PartialEq, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

#[inline]
pub fn create_query_body(
    req: &QueryRequest,
    config: &HttpBackendConfig,
) -> QueryRequest {
    QueryRequest {
        query: req.query.clone(),
        top_k: req.top_k.or(config.top_k),
    }
}

/// Decodes the body of a successful query.
///
/// Successful responses never fail to decode. Fields that are missing or
/// have an unexpected type are left unset, and callers apply their own
/// defaults.
pub fn parse_query_response(body: &[u8]) -> QueryResponse {
    let body = parse_lenient(body);
    QueryResponse {
        answer: string_field(&body, "answer"),
        sources: body
            .get("sources")
            .and_then(Value::as_array)
            .map(|sources| sources.iter().cloned().map(Source::new).collect()),
    }
}

/// Decodes the body of a successful upload, the same way
/// [`parse_query_response`] does.
pub fn parse_upload_response(body: &[u8]) -> UploadResponse {
    let body = parse_lenient(body);
    UploadResponse {
        status: string_field(&body, "status"),
        message: string_field(&body, "message"),
    }
}

fn parse_lenient(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap_or_else(|err| {
        warn!("ignoring malformed response body: {err}");
        Value::Null
    })
}

fn string_field(body: &Value, name: &str) -> Option<String> {
    body.get(name).and_then(Value::as_str).map(str::to_owned)
}

pub fn parse_error_detail(body: &[u8]) -> Option<String> {
    let body: ErrorBody = serde_json::from_slice(body).ok()?;
    match body.detail? {
        Value::Null => None,
        Value::String(detail) if detail.is_empty() => None,
        Value::String(detail) => Some(detail),
        other => Some(other.to_string()),
    }
}
