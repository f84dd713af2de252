//! Service modules for the intake workflow
//!
//! Pure helpers (partitioning, link parsing, summary) plus the async
//! pieces that touch the outside world (enrichment, delivery) and the
//! session service tying them to the store and event bus.

pub mod delivery;
pub mod enricher;
pub mod intake_service;
pub mod partitioner;
pub mod socials;
pub mod summary;

pub use delivery::{deliver_albums, DeliveryReport, MediaTransport, RetryPolicy, TransportError};
pub use enricher::{enrich_socials, DisabledLookup, FollowerLookup, ScrapingFollowerLookup};
pub use intake_service::{IntakeService, StepResponse};
pub use partitioner::{partition, AlbumPlan};
pub use socials::{ParsedSocials, PlatformClassifier};
pub use summary::build_summary;
