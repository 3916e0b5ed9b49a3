//! Chat completion and embedding providers.

pub mod error;
pub mod http;
#[cfg(feature = "mock")]
pub mod mock;
pub mod openai;
pub mod provider;
mod retry;

pub use error::LlmError;
pub use provider::{LlmProvider, Message, Role};
