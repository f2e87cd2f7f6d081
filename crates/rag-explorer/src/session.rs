use std::sync::{Arc, Mutex, PoisonError};

use rag_explorer_backend::{Backend, Document};
use rag_explorer_core::conversation::ConversationState;
use rag_explorer_core::{
    BackendClient, Conversation, ConversationBuilder, Submission, UploadError,
    UploadReceipt, Uploader,
};

type UploadedFn = Box<dyn Fn(&str) + Send + Sync>;

/// A session builder.
///
/// See [`Session`].
pub struct SessionBuilder {
    client: BackendClient,
    conversation_builder: ConversationBuilder,
    on_uploaded: Option<UploadedFn>,
}

impl SessionBuilder {
    /// Creates a session builder with a specified backend.
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        let client = BackendClient::new(backend);
        let conversation_builder =
            ConversationBuilder::with_client(client.clone());
        Self {
            client,
            conversation_builder,
            on_uploaded: None,
        }
    }

    /// Attaches a callback to be invoked whenever the conversation changes.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&ConversationState) + Send + Sync + 'static,
    ) -> Self {
        self.conversation_builder =
            self.conversation_builder.on_change(on_change);
        self
    }

    /// Attaches a callback to be invoked when a question has been settled.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.conversation_builder = self.conversation_builder.on_idle(on_idle);
        self
    }

    /// Attaches a callback to be invoked with the confirmation of every
    /// successful upload.
    #[inline]
    pub fn on_uploaded(
        mut self,
        on_uploaded: impl Fn(&str) + Send + Sync + 'static,
    ) -> Self {
        self.on_uploaded = Some(Box::new(on_uploaded));
        self
    }

    /// Builds a new session.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> Session {
        let last_upload_message = Arc::new(Mutex::new(None));
        let on_uploaded = self.on_uploaded;
        let uploader = Uploader::with_client(self.client).on_uploaded({
            let last_upload_message = Arc::clone(&last_upload_message);
            move |message: &str| {
                *last_upload_message
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) =
                    Some(message.to_owned());
                if let Some(on_uploaded) = &on_uploaded {
                    on_uploaded(message);
                }
            }
        });

        Session {
            conversation: self.conversation_builder.build(),
            uploader,
            last_upload_message,
        }
    }
}

/// A client session, like a page with an upload form and a chat panel.
///
/// Both surfaces share one backend. The session is basically a wrapper
/// around a [`Conversation`] and an [`Uploader`], plus the last upload
/// confirmation.
pub struct Session {
    conversation: Conversation,
    uploader: Uploader,
    last_upload_message: Arc<Mutex<Option<String>>>,
}

impl Session {
    /// Asks a question.
    #[inline]
    pub fn ask(&self, question: &str) -> Submission {
        self.conversation.submit_question(question)
    }

    /// Selects `doc` and uploads it.
    ///
    /// Fails with [`UploadError::Busy`] while another upload is running,
    /// leaving that upload's selection alone.
    #[inline]
    pub async fn upload(
        &self,
        doc: Document,
    ) -> Result<UploadReceipt, UploadError> {
        self.uploader.upload_file(doc).await
    }

    /// Returns the conversation.
    #[inline]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the uploader.
    #[inline]
    pub fn uploader(&self) -> &Uploader {
        &self.uploader
    }

    /// Returns the confirmation of the last successful upload.
    pub fn last_upload_message(&self) -> Option<String> {
        self.last_upload_message
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use rag_explorer_core::SubmissionOutcome;
    use rag_explorer_test_backend::{PresetFailure, TestBackend};

    use super::*;

    #[tokio::test]
    async fn test_upload_then_ask() {
        let backend = TestBackend::default();
        backend.add_upload_accepted("Indexed 12 chunks from policy.pdf");
        backend.add_answer("30 days", ["policy.pdf"]);

        let session = SessionBuilder::with_backend(backend.clone()).build();
        assert!(session.last_upload_message().is_none());

        let receipt = session
            .upload(Document::new("policy.pdf", "%PDF"))
            .await
            .unwrap();
        assert_eq!(receipt.message, "Indexed 12 chunks from policy.pdf");
        assert_eq!(
            session.last_upload_message().as_deref(),
            Some("Indexed 12 chunks from policy.pdf")
        );

        let outcome = session.ask("What is the refund policy?").await;
        assert_eq!(outcome, SubmissionOutcome::Answered);
        let state = session.conversation().snapshot().await.unwrap();
        assert_eq!(state.transcript().len(), 2);
        assert_eq!(backend.upload_calls(), 1);
        assert_eq!(backend.query_calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_keeps_last_message() {
        let backend = TestBackend::default();
        backend.add_upload_accepted("Indexed 1 chunks from a.txt");
        backend.add_upload_failure(PresetFailure::rejected("disk full"));

        let uploads = Arc::new(Mutex::new(vec![]));
        let session = SessionBuilder::with_backend(backend)
            .on_uploaded({
                let uploads = Arc::clone(&uploads);
                move |message| uploads.lock().unwrap().push(message.to_owned())
            })
            .build();

        session.upload(Document::new("a.txt", "a")).await.unwrap();
        let err = session
            .upload(Document::new("b.txt", "b"))
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::TransportFailure("disk full".to_owned()));
        assert_eq!(
            session.last_upload_message().as_deref(),
            Some("Indexed 1 chunks from a.txt")
        );
        assert_eq!(*uploads.lock().unwrap(), ["Indexed 1 chunks from a.txt"]);
    }

    #[tokio::test]
    async fn test_concurrent_upload_is_rejected() {
        let backend = TestBackend::default();
        backend.add_upload_accepted("Indexed 2 chunks from a.pdf");
        backend.pause();

        let session =
            Arc::new(SessionBuilder::with_backend(backend.clone()).build());
        let first = tokio::spawn({
            let session = Arc::clone(&session);
            async move { session.upload(Document::new("a.pdf", "%PDF")).await }
        });
        while !session.uploader().is_busy() {
            tokio::task::yield_now().await;
        }

        let err = session
            .upload(Document::new("b.pdf", "%PDF"))
            .await
            .unwrap_err();
        assert_eq!(err, UploadError::Busy);
        assert_eq!(
            session.uploader().selected_file().as_deref(),
            Some("a.pdf")
        );

        backend.resume();
        assert_eq!(first.await.unwrap().unwrap().file_name, "a.pdf");
        assert_eq!(backend.received_uploads(), ["a.pdf"]);
    }
}
