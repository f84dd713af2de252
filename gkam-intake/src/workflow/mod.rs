//! Intake workflow: the per-session state machine and its prompts
//!
//! Everything here is synchronous and side-effect free. Storage, follower
//! enrichment and event publishing happen in
//! [`crate::services::intake_service`].

pub mod machine;
pub mod prompts;

pub use machine::{step, Completion, InboundEvent, MachineContext, NextSession, Outcome, Step};
pub use prompts::Prompt;
