//! An out-of-the-box client for a document-question-answering backend.
//!
//! The crate includes a CLI tool for using in the terminal. And you can also
//! use it as a library to bring the chat and upload surfaces into your own
//! host apps.

#![deny(missing_docs)]

#[allow(unused_imports)]
#[macro_use]
extern crate tracing;

mod session;

pub use session::{Session, SessionBuilder};

/// Re-exports of [`rag_explorer_core`] crate.
pub mod core {
    pub use rag_explorer_core::*;
}

/// Re-exports of [`rag_explorer_backend`] crate.
pub mod backend {
    pub use rag_explorer_backend::*;
}

/// Re-exports of [`rag_explorer_http_backend`] crate.
pub mod http {
    pub use rag_explorer_http_backend::*;
}
