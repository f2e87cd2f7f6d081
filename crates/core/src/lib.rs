//! Core logic of the explorer client: the conversation controller, the
//! upload adapter and the type-erased backend client they share.

#![deny(missing_docs)]
#![deny(clippy::missing_safety_doc)]

#[macro_use]
extern crate tracing;

mod client;
mod controller;
pub mod conversation;
mod error;
mod upload;

pub use client::BackendClient;
pub use controller::{
    Conversation, ConversationBuilder, Submission, SubmissionOutcome,
};
pub use error::{Rejection, UploadError, display_message};
pub use upload::{
    UPLOAD_FAILED_MESSAGE, UPLOADED_MESSAGE, UploadReceipt, Uploader,
};
