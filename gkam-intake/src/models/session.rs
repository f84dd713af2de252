//! Intake session record
//!
//! One session per external identity. The session moves forward through
//! [`IntakeStage`] and only goes back on restart, which clears everything.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::MediaRef;
use gkam_common::IntakeStage;

/// Opaque identifier of the identity owning a session (user, chat, ...)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for SessionKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

/// Biographical text field, in collection order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Alias,
    Country,
    Fame,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Alias, Field::Country, Field::Fame];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Alias => "alias",
            Field::Country => "country",
            Field::Fame => "fame",
        }
    }

    /// Label used in the summary template
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Alias => "Alias",
            Field::Country => "Country",
            Field::Fame => "Fame",
        }
    }

    /// Stage that collects this field
    pub fn stage(self) -> IntakeStage {
        match self {
            Field::Name => IntakeStage::Name,
            Field::Alias => IntakeStage::Alias,
            Field::Country => IntakeStage::Country,
            Field::Fame => IntakeStage::Fame,
        }
    }

    /// Field collected by `stage`, if it is a text stage
    pub fn for_stage(stage: IntakeStage) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.stage() == stage)
    }
}

/// The four free-text fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeFields {
    pub name: Option<String>,
    pub alias: Option<String>,
    pub country: Option<String>,
    pub fame: Option<String>,
}

impl IntakeFields {
    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Name => &self.name,
            Field::Alias => &self.alias,
            Field::Country => &self.country,
            Field::Fame => &self.fame,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Alias => &mut self.alias,
            Field::Country => &mut self.country,
            Field::Fame => &mut self.fame,
        };
        *slot = Some(value);
    }
}

/// Follower figure attached to a social link
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum Followers {
    /// Nothing known; rendered as a placeholder
    #[default]
    Unknown,
    /// Metric typed by the user next to the link, kept verbatim (e.g. `3.1M`)
    Reported(String),
    /// Count returned by the follower enricher
    Fetched(u64),
}

impl Followers {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Followers::Unknown)
    }
}

impl fmt::Display for Followers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Followers::Unknown => f.write_str("unknown"),
            Followers::Reported(metric) => f.write_str(metric),
            Followers::Fetched(count) => write!(f, "{}", count),
        }
    }
}

/// One classified social link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub url: String,
    pub followers: Followers,
}

/// Stage transition record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub old_stage: IntakeStage,
    pub new_stage: IntakeStage,
    pub transitioned_at: DateTime<Utc>,
}

/// Full mutable record of one in-progress intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,

    /// Current stage
    pub stage: IntakeStage,

    /// Face image, set once in LEAD_MEDIA
    pub lead_item: Option<MediaRef>,

    /// Photos then videos/animations, in arrival order
    pub gallery_items: Vec<MediaRef>,

    pub fields: IntakeFields,

    /// Platform label -> link; later links for a label replace earlier ones
    pub socials: BTreeMap<String, SocialLink>,

    pub started_at: DateTime<Utc>,
}

impl Session {
    /// Create a session at the first stage
    pub fn new(key: SessionKey) -> Self {
        Self {
            key,
            stage: IntakeStage::LeadMedia,
            lead_item: None,
            gallery_items: Vec::new(),
            fields: IntakeFields::default(),
            socials: BTreeMap::new(),
            started_at: Utc::now(),
        }
    }

    /// Clear all collected data and return to the first stage
    pub fn reset(&mut self) {
        *self = Session::new(self.key.clone());
    }

    /// Move to the following stage
    ///
    /// Returns `None` at the last stage, where the session stays put.
    pub fn advance(&mut self) -> Option<StageTransition> {
        let new_stage = self.stage.next()?;
        let transition = StageTransition {
            old_stage: self.stage,
            new_stage,
            transitioned_at: Utc::now(),
        };
        self.stage = new_stage;
        Some(transition)
    }

    pub fn photo_count(&self) -> usize {
        self.gallery_items
            .iter()
            .filter(|m| !m.kind.is_motion())
            .count()
    }

    pub fn motion_count(&self) -> usize {
        self.gallery_items
            .iter()
            .filter(|m| m.kind.is_motion())
            .count()
    }

    /// First required item still missing, in collection order
    pub fn first_missing(&self) -> Option<&'static str> {
        if self.lead_item.is_none() {
            return Some("lead_item");
        }
        Field::ALL
            .into_iter()
            .find(|f| self.fields.get(*f).is_none())
            .map(Field::as_str)
    }
}
