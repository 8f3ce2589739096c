//! HTTP API for the message assistant
//!
//! Every inbound operation is a POST against a session; state changes stream
//! back over SSE.

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::runtime::SessionManager;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }
}
