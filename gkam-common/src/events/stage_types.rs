//! Intake stage type shared by the state machine and the event stream

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position in the fixed, linear intake sequence
///
/// Declaration order is the stage order; `Ord` follows it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntakeStage {
    /// Waiting for the single face image
    LeadMedia,
    /// Quietly collecting photos until "next"
    GalleryPhotos,
    /// Quietly collecting videos/animations until "next"
    GalleryVideos,
    Name,
    Alias,
    Country,
    Fame,
    /// Collecting social links until "done"
    Socials,
    /// Waiting for the confirm signal
    Finalize,
}

impl IntakeStage {
    /// All stages in order
    pub const ALL: [IntakeStage; 9] = [
        IntakeStage::LeadMedia,
        IntakeStage::GalleryPhotos,
        IntakeStage::GalleryVideos,
        IntakeStage::Name,
        IntakeStage::Alias,
        IntakeStage::Country,
        IntakeStage::Fame,
        IntakeStage::Socials,
        IntakeStage::Finalize,
    ];

    /// Stage that follows this one, `None` for the last stage
    pub fn next(self) -> Option<IntakeStage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            IntakeStage::LeadMedia => "LEAD_MEDIA",
            IntakeStage::GalleryPhotos => "GALLERY_PHOTOS",
            IntakeStage::GalleryVideos => "GALLERY_VIDEOS",
            IntakeStage::Name => "NAME",
            IntakeStage::Alias => "ALIAS",
            IntakeStage::Country => "COUNTRY",
            IntakeStage::Fame => "FAME",
            IntakeStage::Socials => "SOCIALS",
            IntakeStage::Finalize => "FINALIZE",
        }
    }
}

impl fmt::Display for IntakeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
