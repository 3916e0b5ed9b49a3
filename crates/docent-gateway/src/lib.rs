//! HTTP API over the document workspace and answering service, with optional bearer auth.

mod error;
mod handlers;
mod router;
mod server;

pub use error::{ApiError, GatewayError};
pub use router::build_router;
pub use server::{AppState, GatewayServer};

/// Header carrying the chat session id.
pub const SESSION_HEADER: &str = "x-session-id";
