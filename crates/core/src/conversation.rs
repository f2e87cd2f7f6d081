//! Conversation-related types.

use rag_explorer_backend::{QueryResponse, Source};

use crate::error::Rejection;

/// The answer recorded when no real answer is available.
pub const SENTINEL_ANSWER: &str = "I don't know.";

/// The error shown when an empty question is submitted.
pub const EMPTY_QUESTION_MESSAGE: &str = "Ask a question first.";

/// The error shown when a query fails without any usable message.
pub const QUERY_FAILED_MESSAGE: &str = "Query failed.";

/// The hints shown while the transcript is still empty.
pub const EMPTY_TRANSCRIPT_HINTS: [&str; 2] = [
    "Ask anything about your uploaded documents.",
    "The assistant will only answer from that context.",
];

/// Who authored a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// The person asking questions.
    User,
    /// The backend answering them.
    Assistant,
}

/// One message in the transcript.
#[derive(Clone, Debug, PartialEq)]
pub struct Turn {
    role: Role,
    content: String,
    sources: Vec<Source>,
}

impl Turn {
    #[inline]
    pub(crate) fn user(content: String) -> Self {
        Self {
            role: Role::User,
            content,
            sources: vec![],
        }
    }

    #[inline]
    pub(crate) fn assistant(content: String, sources: Vec<Source>) -> Self {
        Self {
            role: Role::Assistant,
            content,
            sources,
        }
    }

    /// Returns who authored this turn.
    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the text of this turn.
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns the sources backing this turn. Always empty for user turns.
    #[inline]
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }
}

/// Everything the chat surface displays.
///
/// The transcript only ever grows. `in_flight` and `error_message` are
/// transient and are reset by every submission attempt.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConversationState {
    transcript: Vec<Turn>,
    input: String,
    in_flight: bool,
    error_message: Option<String>,
}

impl ConversationState {
    /// Returns the transcript in submission order.
    #[inline]
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Returns the text currently in the input box.
    #[inline]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns `true` while a question is waiting for its answer.
    #[inline]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Returns the error currently shown, if any.
    #[inline]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    #[inline]
    pub(crate) fn set_input(&mut self, input: String) {
        self.input = input;
    }

    #[inline]
    pub(crate) fn dismiss_error(&mut self) {
        self.error_message = None;
    }

    /// Validates `text` and records it as a user turn, returning the
    /// question to send.
    pub(crate) fn begin_submission(
        &mut self,
        text: &str,
    ) -> Result<String, Rejection> {
        if self.in_flight {
            return Err(Rejection::AlreadyInFlight);
        }

        let question = text.trim();
        if question.is_empty() {
            self.error_message = Some(EMPTY_QUESTION_MESSAGE.to_owned());
            return Err(Rejection::EmptyQuestion);
        }

        self.error_message = None;
        self.input.clear();
        self.in_flight = true;
        self.transcript.push(Turn::user(question.to_owned()));
        Ok(question.to_owned())
    }

    /// Records the backend's answer.
    pub(crate) fn resolve_answer(&mut self, resp: QueryResponse) {
        let content = resp
            .answer
            .filter(|answer| !answer.is_empty())
            .unwrap_or_else(|| SENTINEL_ANSWER.to_owned());
        let sources = resp.sources.unwrap_or_default();
        self.transcript.push(Turn::assistant(content, sources));
        self.in_flight = false;
    }

    /// Records a failed query: the error is shown and the question is
    /// still answered, with the sentinel.
    pub(crate) fn resolve_failure(&mut self, message: String) {
        self.error_message = Some(message);
        self.transcript
            .push(Turn::assistant(SENTINEL_ANSWER.to_owned(), vec![]));
        self.in_flight = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_submission_trims() {
        let mut state = ConversationState::default();
        state.set_input("  What is the refund policy?\n".to_owned());

        let question = state.begin_submission(&state.input.clone()).unwrap();
        assert_eq!(question, "What is the refund policy?");
        assert!(state.in_flight());
        assert_eq!(state.input(), "");
        assert_eq!(state.transcript().len(), 1);
        assert_eq!(state.transcript()[0].role(), Role::User);
        assert_eq!(
            state.transcript()[0].content(),
            "What is the refund policy?"
        );
        assert!(state.transcript()[0].sources().is_empty());
    }

    #[test]
    fn test_empty_question_is_rejected() {
        for text in ["", "   ", "\t\n"] {
            let mut state = ConversationState::default();
            state.set_input(text.to_owned());
            assert_eq!(
                state.begin_submission(text),
                Err(Rejection::EmptyQuestion)
            );
            assert!(state.transcript().is_empty());
            assert!(!state.in_flight());
            assert_eq!(state.input(), text);
            assert_eq!(state.error_message(), Some(EMPTY_QUESTION_MESSAGE));
        }
    }

    #[test]
    fn test_valid_submission_clears_error() {
        let mut state = ConversationState::default();
        state.begin_submission(" ").unwrap_err();
        assert!(state.error_message().is_some());

        state.begin_submission("Hello?").unwrap();
        assert!(state.error_message().is_none());
    }

    #[test]
    fn test_second_submission_while_in_flight() {
        let mut state = ConversationState::default();
        state.begin_submission("First?").unwrap();
        let before = state.clone();

        assert_eq!(
            state.begin_submission("Second?"),
            Err(Rejection::AlreadyInFlight)
        );
        assert_eq!(state, before);
    }

    #[test]
    fn test_resolve_answer_defaults() {
        let mut state = ConversationState::default();
        state.begin_submission("Anything?").unwrap();
        state.resolve_answer(QueryResponse {
            answer: Some(String::new()),
            sources: None,
        });

        let turn = &state.transcript()[1];
        assert_eq!(turn.role(), Role::Assistant);
        assert_eq!(turn.content(), SENTINEL_ANSWER);
        assert!(turn.sources().is_empty());
        assert!(!state.in_flight());
        assert!(state.error_message().is_none());
    }

    #[test]
    fn test_resolve_failure_surfaces_both() {
        let mut state = ConversationState::default();
        state.begin_submission("Who wrote this?").unwrap();
        state.resolve_failure("index not ready".to_owned());

        assert_eq!(state.transcript().len(), 2);
        assert_eq!(state.transcript()[1].content(), SENTINEL_ANSWER);
        assert!(state.transcript()[1].sources().is_empty());
        assert_eq!(state.error_message(), Some("index not ready"));
        assert!(!state.in_flight());

        state.dismiss_error();
        assert!(state.error_message().is_none());
        assert_eq!(state.transcript().len(), 2);
    }
}
