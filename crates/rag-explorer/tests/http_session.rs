use axum::Router;
use axum::body::Bytes;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use rag_explorer::SessionBuilder;
use rag_explorer::backend::Document;
use rag_explorer::core::conversation::{Role, SENTINEL_ANSWER};
use rag_explorer::core::{SubmissionOutcome, UPLOADED_MESSAGE};
use rag_explorer::http::{HttpBackend, HttpBackendConfigBuilder};
use serde_json::{Value, json};
use tokio::net::TcpListener;

async fn handle_query(body: String) -> Response {
    let payload: Value = serde_json::from_str(&body).unwrap_or_default();
    match payload["query"].as_str().unwrap_or_default() {
        "Garbled?" => "OK".into_response(),
        "Mistyped?" => {
            axum::Json(json!({ "answer": 42, "sources": {} })).into_response()
        }
        _ => (
            StatusCode::SERVICE_UNAVAILABLE,
            axum::Json(json!({ "detail": "index not ready" })),
        )
            .into_response(),
    }
}

async fn spawn_server() -> HttpBackend {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/api/query", post(handle_query))
        .route("/api/upload", post(|_: Bytes| async { "<html>ok</html>" }));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    HttpBackend::new(
        HttpBackendConfigBuilder::new()
            .with_base_url(format!("http://{addr}/api"))
            .build(),
    )
}

#[tokio::test]
async fn test_malformed_answers_fall_back_silently() {
    let session = SessionBuilder::with_backend(spawn_server().await).build();

    for question in ["Garbled?", "Mistyped?"] {
        let outcome = session.ask(question).await;
        assert_eq!(outcome, SubmissionOutcome::Answered);

        let state = session.conversation().snapshot().await.unwrap();
        let turn = state.transcript().last().unwrap();
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.content(), SENTINEL_ANSWER);
        assert!(turn.sources().is_empty());
        assert!(state.error_message().is_none());
        assert!(!state.in_flight());
    }
}

#[tokio::test]
async fn test_failed_answer_shows_detail() {
    let session = SessionBuilder::with_backend(spawn_server().await).build();

    let outcome = session.ask("Who wrote this?").await;
    assert_eq!(
        outcome,
        SubmissionOutcome::FellBack {
            error: "index not ready".to_owned()
        }
    );
    let state = session.conversation().snapshot().await.unwrap();
    assert_eq!(state.error_message(), Some("index not ready"));
}

#[tokio::test]
async fn test_malformed_upload_confirmation() {
    let session = SessionBuilder::with_backend(spawn_server().await).build();

    let receipt = session
        .upload(Document::new("notes.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(receipt.message, UPLOADED_MESSAGE);
    assert_eq!(
        session.last_upload_message().as_deref(),
        Some(UPLOADED_MESSAGE)
    );
}
