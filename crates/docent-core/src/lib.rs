//! Configuration, document workspace, per-session state, and the
//! retrieval-augmented answering service.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod prompt;
pub mod rag;
pub mod session;
pub mod vault;
pub mod workspace;

pub use error::CoreError;
pub use rag::{Answer, IndexStats, RagService};
