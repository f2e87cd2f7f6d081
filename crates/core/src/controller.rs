mod builder;
mod mailbox;
mod state;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use pin_project_lite::pin_project;
use tokio::sync::oneshot;

pub use builder::ConversationBuilder;
use mailbox::{Command, Mailbox};

use crate::conversation::ConversationState;
use crate::error::Rejection;

/// What became of a submitted question.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionOutcome {
    /// The backend answered and the answer was recorded.
    Answered,
    /// The query failed. The sentinel answer was recorded and `error` is
    /// being shown.
    FellBack {
        /// The error message being shown.
        error: String,
    },
    /// Nothing was sent to the backend.
    Rejected(Rejection),
}

/// A handle to a running conversation.
///
/// The conversation owns the transcript and processes one event at a time,
/// so no caller ever observes a half-applied submission. Handles are cheap
/// to clone. The conversation stops once every handle is dropped and the
/// question in flight, if any, has been answered.
#[derive(Clone)]
pub struct Conversation {
    mailbox: Arc<Mailbox>,
}

impl Conversation {
    /// Submits a question.
    ///
    /// The returned [`Submission`] resolves once the question is settled.
    /// It can be dropped if the caller isn't interested in the outcome, the
    /// question is still processed.
    #[inline]
    pub fn submit_question<S: Into<String>>(&self, text: S) -> Submission {
        self.submit(Some(text.into()))
    }

    /// Submits whatever is currently in the input box.
    #[inline]
    pub fn submit_input(&self) -> Submission {
        self.submit(None)
    }

    /// Replaces the contents of the input box.
    #[inline]
    pub fn set_input<S: Into<String>>(&self, input: S) {
        self.send(Command::SetInput(input.into()));
    }

    /// Hides the error currently shown.
    #[inline]
    pub fn dismiss_error(&self) {
        self.send(Command::DismissError);
    }

    /// Returns a copy of the current state, or `None` if the conversation
    /// has stopped.
    pub async fn snapshot(&self) -> Option<ConversationState> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Snapshot(tx));
        rx.await.ok()
    }

    fn submit(&self, text: Option<String>) -> Submission {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit {
            text,
            reply,
            mailbox: Arc::clone(&self.mailbox),
        });
        Submission { rx }
    }

    #[inline]
    fn send(&self, cmd: Command) {
        // A dead conversation drops the command, and with it any reply
        // channel, so waiting callers see `Rejection::Closed`.
        if self.mailbox.send(cmd).is_err() {
            warn!("conversation has stopped, command discarded");
        }
    }
}

pin_project! {
    /// A future resolving to the outcome of a submitted question.
    #[must_use = "dropping a submission does not cancel the question"]
    pub struct Submission {
        #[pin]
        rx: oneshot::Receiver<SubmissionOutcome>,
    }
}

impl Future for Submission {
    type Output = SubmissionOutcome;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let outcome = ready!(self.project().rx.poll(cx));
        Poll::Ready(
            outcome.unwrap_or(SubmissionOutcome::Rejected(Rejection::Closed)),
        )
    }
}
