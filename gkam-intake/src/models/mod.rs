//! Data models for gkam-intake
//!
//! - Session record and its typed fields
//! - Media references with kind tags
//! - Album output batches

pub mod album;
pub mod media;
pub mod session;

pub use album::{Album, LeadPlacement};
pub use media::{MediaKind, MediaRef};
pub use session::{
    Field, Followers, IntakeFields, Session, SessionKey, SocialLink, StageTransition,
};
pub use gkam_common::IntakeStage;
