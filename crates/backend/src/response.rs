use std::borrow::Cow;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// The backend's answer to a [`QueryRequest`].
///
/// Both fields are optional on the wire. A missing `answer` or `sources`
/// is not an error, consumers are expected to fall back to their own
/// defaults.
///
/// [`QueryRequest`]: crate::QueryRequest
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    /// The generated answer.
    #[serde(default)]
    pub answer: Option<String>,
    /// Evidence the answer was generated from, in ranking order.
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
}

impl QueryResponse {
    /// Creates a response with an answer and the names of its sources.
    pub fn with_answer<S, I>(answer: S, sources: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            answer: Some(answer.into()),
            sources: Some(sources.into_iter().map(Source::named).collect()),
        }
    }
}

/// A reference to a document or passage backing an answer.
///
/// The descriptor is opaque, it is whatever metadata the backend stored
/// alongside the passage. Most backends include a `source` field with the
/// file name, which is what [`Source::label`] prefers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Source(Value);

impl Source {
    /// Wraps a raw descriptor.
    #[inline]
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Creates a descriptor with only a `source` field.
    #[inline]
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self(json!({ "source": name.into() }))
    }

    /// Returns the raw descriptor.
    #[inline]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Returns the `source` field if it is a non-empty string.
    pub fn name(&self) -> Option<&str> {
        self.0
            .get("source")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    /// Returns a human-readable label for this source.
    ///
    /// A present, non-empty `source` field is used as is, numbers and
    /// booleans included. Anything else is rendered as compact JSON, so
    /// nothing the backend cited is silently dropped.
    pub fn label(&self) -> Cow<'_, str> {
        match self.0.get("source") {
            Some(Value::String(name)) if !name.is_empty() => {
                Cow::Borrowed(name.as_str())
            }
            Some(Value::Number(number)) if !is_zero(number) => {
                Cow::Owned(number.to_string())
            }
            Some(Value::Bool(true)) => Cow::Borrowed("true"),
            _ => Cow::Owned(self.0.to_string()),
        }
    }
}

#[inline]
fn is_zero(number: &serde_json::Number) -> bool {
    number.as_f64().is_some_and(|n| n == 0.0)
}

impl Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The backend's acknowledgement of an uploaded document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Machine-readable status, e.g. `"success"`.
    #[serde(default)]
    pub status: Option<String>,
    /// Human-readable confirmation.
    #[serde(default)]
    pub message: Option<String>,
}

impl UploadResponse {
    /// Creates a successful response with the given confirmation.
    #[inline]
    pub fn success<S: Into<String>>(message: S) -> Self {
        Self {
            status: Some("success".to_owned()),
            message: Some(message.into()),
        }
    }
}
