//! Media references collected during intake

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a collected media item
///
/// Attached when the item is collected so the outbound renderer knows how
/// to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Photo,
    Video,
    /// GIF-style animation
    Animation,
}

impl MediaKind {
    /// Videos and animations are collected by the same stage
    pub fn is_motion(self) -> bool {
        matches!(self, MediaKind::Video | MediaKind::Animation)
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MediaKind::Photo => "photo",
            MediaKind::Video => "video",
            MediaKind::Animation => "animation",
        };
        f.write_str(name)
    }
}

/// Opaque transport reference (e.g. a file id) tagged with its kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub reference: String,
}

impl MediaRef {
    pub fn new(kind: MediaKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
        }
    }

    pub fn photo(reference: impl Into<String>) -> Self {
        Self::new(MediaKind::Photo, reference)
    }

    pub fn video(reference: impl Into<String>) -> Self {
        Self::new(MediaKind::Video, reference)
    }

    pub fn animation(reference: impl Into<String>) -> Self {
        Self::new(MediaKind::Animation, reference)
    }
}
