//! User-facing prompts
//!
//! Every reply the state machine produces carries a stable code, so a
//! transport can pick its own keyboard or localization, plus default text.

use serde::{Serialize, Serializer};

use crate::models::IntakeStage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    Welcome,
    Restarted,
    AskLeadMedia,
    LeadSaved,
    PhotosSaved { count: usize },
    VideosSaved { count: usize },
    AskName,
    AskAlias,
    AskCountry,
    AskFame,
    AskSocials,
    InvalidLinks { rejected: usize },
    SocialsSaved,
    ReadyToFinalize,
    Completed,
}

impl Prompt {
    pub fn code(&self) -> &'static str {
        match self {
            Prompt::Welcome => "welcome",
            Prompt::Restarted => "restarted",
            Prompt::AskLeadMedia => "ask_lead_media",
            Prompt::LeadSaved => "lead_saved",
            Prompt::PhotosSaved { .. } => "photos_saved",
            Prompt::VideosSaved { .. } => "videos_saved",
            Prompt::AskName => "ask_name",
            Prompt::AskAlias => "ask_alias",
            Prompt::AskCountry => "ask_country",
            Prompt::AskFame => "ask_fame",
            Prompt::AskSocials => "ask_socials",
            Prompt::InvalidLinks { .. } => "invalid_links",
            Prompt::SocialsSaved => "socials_saved",
            Prompt::ReadyToFinalize => "ready_to_finalize",
            Prompt::Completed => "completed",
        }
    }

    pub fn text(&self) -> String {
        match self {
            Prompt::Welcome => "Welcome to Gatekeepers Album Maker.\n\n\
                 Step 1: Send a normal face photo of the celebrity."
                .to_string(),
            Prompt::Restarted => {
                "Restarting. Send the celebrity face photo to begin again.".to_string()
            }
            Prompt::AskLeadMedia => "Please send a photo (as a regular image).".to_string(),
            Prompt::LeadSaved => "Face photo saved. Now send all pictures you want to post \
                 (send as many as you like). When you're done sending pictures, click '✅ Next'."
                .to_string(),
            Prompt::PhotosSaved { count } => format!(
                "Saved {} photo(s). Now send all videos/gifs you want to add. \
                 When you're done, click '✅ Next'.",
                count
            ),
            Prompt::VideosSaved { count } => format!("Saved {} video(s)/gif(s).", count),
            Prompt::AskName => "Send the person's full name.".to_string(),
            Prompt::AskAlias => {
                "Got it. Now send alias / social handles (or '-' if none).".to_string()
            }
            Prompt::AskCountry => "Now send the person's country of origin.".to_string(),
            Prompt::AskFame => "Now send why the person is famous (a short phrase).".to_string(),
            Prompt::AskSocials => "Send the person's social links, one per line or comma \
                 separated. You may add a follower count after a link (e.g. \
                 'https://tiktok.com/@name 3.1M'). Click '✅ Done' when finished."
                .to_string(),
            Prompt::InvalidLinks { rejected } => format!(
                "Ignored {} entr{} that {} not a full link. Please send links starting with \
                 http:// or https:// (or send '✅ Done').",
                rejected,
                if *rejected == 1 { "y" } else { "ies" },
                if *rejected == 1 { "is" } else { "are" }
            ),
            Prompt::SocialsSaved => {
                "Social links saved. Send more, or click '✅ Done' to continue.".to_string()
            }
            Prompt::ReadyToFinalize => {
                "When you're ready, click '✅ Done' to finalize and create albums.".to_string()
            }
            Prompt::Completed => "All done. You can forward the summary. \
                 Send /restart to create another album."
                .to_string(),
        }
    }

    /// Prompt repeated when input does not fit `stage`
    pub fn for_stage(stage: IntakeStage) -> Option<Prompt> {
        match stage {
            IntakeStage::LeadMedia => Some(Prompt::AskLeadMedia),
            IntakeStage::Name => Some(Prompt::AskName),
            IntakeStage::Alias => Some(Prompt::AskAlias),
            IntakeStage::Country => Some(Prompt::AskCountry),
            IntakeStage::Fame => Some(Prompt::AskFame),
            IntakeStage::Socials => Some(Prompt::AskSocials),
            IntakeStage::Finalize => Some(Prompt::ReadyToFinalize),
            // Gallery stages collect quietly
            IntakeStage::GalleryPhotos | IntakeStage::GalleryVideos => None,
        }
    }
}

/// Serialized as `{"code": ..., "text": ...}`
impl Serialize for Prompt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("Prompt", 2)?;
        state.serialize_field("code", self.code())?;
        state.serialize_field("text", &self.text())?;
        state.end()
    }
}
