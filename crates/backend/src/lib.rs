//! The transport contract between the explorer client and its
//! document-question-answering backend.
//!
//! The backend exposes exactly two operations: ingesting a document and
//! answering a question against everything ingested so far. Types in this
//! crate describe those operations and their payloads, they don't define
//! any behavior. Implementors (HTTP, fakes for testing, etc.) live in their
//! own crates.

#![deny(missing_docs)]

mod backend;
mod document;
mod error;
mod request;
mod response;

pub use backend::*;
pub use document::*;
pub use error::*;
pub use request::*;
pub use response::*;
