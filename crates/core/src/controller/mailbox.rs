use std::fmt::{self, Debug};
use std::sync::Arc;

use rag_explorer_backend::QueryResponse;
use tokio::sync::{mpsc, oneshot};

use super::SubmissionOutcome;
use super::state::Controller;
use crate::conversation::ConversationState;

/// The events a conversation handles, in arrival order.
pub enum Command {
    Submit {
        text: Option<String>,
        reply: oneshot::Sender<SubmissionOutcome>,
        /// Keeps the mailbox open until the answer has been recorded.
        mailbox: Arc<Mailbox>,
    },
    SetInput(String),
    DismissError,
    Snapshot(oneshot::Sender<ConversationState>),
    QueryFinished {
        /// The answer, or the message to show for the failure.
        result: Result<QueryResponse, String>,
        reply: oneshot::Sender<SubmissionOutcome>,
    },
}

impl Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Submit { text, .. } => f
                .debug_struct("Submit")
                .field("text", text)
                .finish_non_exhaustive(),
            Command::SetInput(input) => {
                f.debug_tuple("SetInput").field(input).finish()
            }
            Command::DismissError => f.write_str("DismissError"),
            Command::Snapshot(_) => f.write_str("Snapshot"),
            Command::QueryFinished { result, .. } => f
                .debug_struct("QueryFinished")
                .field("result", result)
                .finish_non_exhaustive(),
        }
    }
}

/// The conversation has stopped.
#[derive(Debug)]
pub struct MailboxClosed;

pub struct Mailbox {
    cmd_tx: mpsc::UnboundedSender<Command>,
}

impl Mailbox {
    #[inline]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        (Mailbox { cmd_tx }, cmd_rx)
    }

    #[inline]
    pub fn send(&self, cmd: Command) -> Result<(), MailboxClosed> {
        self.cmd_tx.send(cmd).map_err(|_| MailboxClosed)
    }
}

pub async fn run_controller(
    mut controller: Controller,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
) {
    debug!("started");
    // Senders are held by the handles, queued submissions and the query in
    // flight, so the loop outlives the last handle until every pending
    // answer is recorded.
    while let Some(cmd) = cmd_rx.recv().await {
        trace!("received command: {cmd:?}");

        let proc_span = trace_span!("proc cmd");
        proc_span.in_scope(|| {
            controller.handle(cmd);
            trace!("finished");
        });
    }
    debug!("will terminate");
}
