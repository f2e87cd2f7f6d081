use std::sync::Arc;

use rag_explorer_backend::Backend;
use tracing::Instrument;

use super::Conversation;
use super::mailbox::{Mailbox, run_controller};
use super::state::{ChangeFn, Controller, IdleFn};
use crate::client::BackendClient;
use crate::conversation::ConversationState;

/// [`Conversation`] builder.
pub struct ConversationBuilder {
    client: BackendClient,
    on_change: Option<ChangeFn>,
    on_idle: Option<IdleFn>,
}

impl ConversationBuilder {
    /// Creates a new builder with the specified backend.
    #[inline]
    pub fn with_backend<B: Backend + 'static>(backend: B) -> Self {
        Self::with_client(BackendClient::new(backend))
    }

    /// Creates a new builder sharing an existing client.
    #[inline]
    pub fn with_client(client: BackendClient) -> Self {
        Self {
            client,
            on_change: None,
            on_idle: None,
        }
    }

    /// Attaches a callback to be invoked with the new state after every
    /// change.
    #[inline]
    pub fn on_change(
        mut self,
        on_change: impl Fn(&ConversationState) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Box::new(on_change));
        self
    }

    /// Attaches a callback to be invoked when a question has been settled.
    #[inline]
    pub fn on_idle(
        mut self,
        on_idle: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        self.on_idle = Some(Box::new(on_idle));
        self
    }

    /// Builds the conversation.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn build(self) -> Conversation {
        let (mailbox, cmd_rx) = Mailbox::new();
        let controller = Controller {
            client: self.client,
            state: ConversationState::default(),
            on_change: self.on_change,
            on_idle: self.on_idle,
        };
        tokio::spawn(
            run_controller(controller, cmd_rx)
                .instrument(trace_span!("conversation")),
        );
        Conversation {
            mailbox: Arc::new(mailbox),
        }
    }
}
