//! HTTP API
//!
//! REST control surface plus the SSE push channel, split across three
//! route groups: public viewer endpoints, the DJ console, and the
//! secret-gated player agent endpoints.

pub mod handlers;
pub mod server;
pub mod sse;

pub use server::{create_router, run, AppContext};
