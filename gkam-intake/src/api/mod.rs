//! HTTP API handlers for gkam-intake
//!
//! REST endpoints carry typed inbound events to the session service; SSE
//! streams the resulting lifecycle events.

pub mod health;
pub mod sessions;
pub mod sse;

pub use health::health_routes;
pub use sessions::session_routes;
pub use sse::event_stream;
