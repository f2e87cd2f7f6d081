use std::sync::Arc;

use rag_explorer_backend::{QueryRequest, QueryResponse};
use tokio::sync::oneshot;
use tracing::Instrument;

use super::SubmissionOutcome;
use super::mailbox::{Command, Mailbox};
use crate::client::BackendClient;
use crate::conversation::{ConversationState, QUERY_FAILED_MESSAGE};
use crate::error::{Rejection, display_message};

pub type ChangeFn = Box<dyn Fn(&ConversationState) + Send + Sync>;
pub type IdleFn = Box<dyn Fn() + Send + Sync>;

pub struct Controller {
    pub(super) client: BackendClient,
    pub(super) state: ConversationState,
    pub(super) on_change: Option<ChangeFn>,
    pub(super) on_idle: Option<IdleFn>,
}

impl Controller {
    pub fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::Submit {
                text,
                reply,
                mailbox,
            } => self.submit(text, reply, mailbox),
            Command::SetInput(input) => {
                self.state.set_input(input);
                self.notify_change();
            }
            Command::DismissError => {
                self.state.dismiss_error();
                self.notify_change();
            }
            Command::Snapshot(tx) => {
                tx.send(self.state.clone()).ok();
            }
            Command::QueryFinished { result, reply } => {
                self.finish_query(result, reply);
            }
        }
    }

    fn submit(
        &mut self,
        text: Option<String>,
        reply: oneshot::Sender<SubmissionOutcome>,
        mailbox: Arc<Mailbox>,
    ) {
        let text = text.unwrap_or_else(|| self.state.input().to_owned());
        let question = match self.state.begin_submission(&text) {
            Ok(question) => question,
            Err(rejection) => {
                debug!("rejected submission: {rejection:?}");
                if rejection == Rejection::EmptyQuestion {
                    self.notify_change();
                }
                reply.send(SubmissionOutcome::Rejected(rejection)).ok();
                return;
            }
        };
        self.notify_change();

        trace!("sending question: {question:?}");
        let client = self.client.clone();
        let query = tokio::spawn(async move {
            client
                .query_documents(QueryRequest::new(question))
                .await
                .map_err(|err| display_message(&*err, QUERY_FAILED_MESSAGE))
        });
        tokio::spawn(
            async move {
                // A panicking backend must still settle the submission.
                let result = query.await.unwrap_or_else(|err| {
                    error!("query task failed: {err}");
                    Err(QUERY_FAILED_MESSAGE.to_owned())
                });
                mailbox.send(Command::QueryFinished { result, reply }).ok();
            }
            .instrument(debug_span!("query")),
        );
    }

    fn finish_query(
        &mut self,
        result: Result<QueryResponse, String>,
        reply: oneshot::Sender<SubmissionOutcome>,
    ) {
        let outcome = match result {
            Ok(resp) => {
                self.state.resolve_answer(resp);
                SubmissionOutcome::Answered
            }
            Err(error) => {
                warn!("query failed: {error}");
                self.state.resolve_failure(error.clone());
                SubmissionOutcome::FellBack { error }
            }
        };
        self.notify_change();
        reply.send(outcome).ok();

        if let Some(on_idle) = &self.on_idle {
            on_idle();
        }
    }

    #[inline]
    fn notify_change(&self) {
        if let Some(on_change) = &self.on_change {
            on_change(&self.state);
        }
    }
}
