//! # GKAM Common Library
//!
//! Shared code for the Gatekeepers Album Maker crates:
//! - Error type and result alias
//! - TOML configuration loading and path resolution
//! - Intake stage type and event bus (IntakeEvent enum)
//! - SSE helpers

pub mod config;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::{EventBus, IntakeEvent, IntakeStage};
