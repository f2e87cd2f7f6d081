use rag_explorer_backend::ErrorKind;
use serde::{Deserialize, Serialize};

/// A scripted reply for one backend call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PresetReply<T> {
    #[serde(rename = "success")]
    Success(T),
    #[serde(rename = "failure")]
    Failure(PresetFailure),
}

/// A scripted failure.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PresetFailure {
    /// The kind reported by the error.
    pub kind: ErrorKind,
    /// The generic, transport-level message.
    pub message: String,
    /// The structured detail the backend attached, if any.
    #[serde(default)]
    pub detail: Option<String>,
}

impl PresetFailure {
    /// A failure that never reached the backend.
    #[inline]
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self {
            kind: ErrorKind::Transport,
            message: message.into(),
            detail: None,
        }
    }

    /// A failure the backend reported with a structured detail.
    #[inline]
    pub fn rejected<S: Into<String>>(detail: S) -> Self {
        Self {
            kind: ErrorKind::Status,
            message: "Request failed with status code 500".to_owned(),
            detail: Some(detail.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use rag_explorer_backend::QueryResponse;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_deserialize_script() {
        let script: Vec<PresetReply<QueryResponse>> =
            serde_json::from_value(json!([
                {
                    "type": "success",
                    "data": {
                        "answer": "30 days",
                        "sources": [{ "source": "policy.pdf" }]
                    }
                },
                {
                    "type": "failure",
                    "data": {
                        "kind": "status",
                        "message": "Request failed with status code 500",
                        "detail": "index not ready"
                    }
                }
            ]))
            .unwrap();

        assert_eq!(
            script,
            vec![
                PresetReply::Success(QueryResponse::with_answer(
                    "30 days",
                    ["policy.pdf"]
                )),
                PresetReply::Failure(PresetFailure::rejected(
                    "index not ready"
                )),
            ]
        );
    }
}
