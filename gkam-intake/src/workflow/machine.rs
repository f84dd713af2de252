//! Intake state machine
//!
//! `step` is pure: it takes the current session and one inbound event and
//! returns the next session (or termination) plus what to tell the user.
//! Restart is checked first from any stage; everything else goes to the
//! handler registered for the session's stage.

use serde::{Deserialize, Serialize};

use super::prompts::Prompt;
use crate::error::ValidationError;
use crate::models::{Album, Field, IntakeStage, MediaRef, Session, StageTransition};
use crate::services::partitioner::AlbumPlan;
use crate::services::socials::PlatformClassifier;
use crate::services::summary::build_summary;
use gkam_common::config::{SignalConfig, TomlConfig};

/// One typed inbound event from a chat transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Photo { reference: String },
    Video { reference: String },
    Animation { reference: String },
    Text { text: String },
    /// Button-style next/done/confirm signal
    Advance,
    Restart,
}

impl InboundEvent {
    pub fn text(text: impl Into<String>) -> Self {
        InboundEvent::Text { text: text.into() }
    }

    pub fn photo(reference: impl Into<String>) -> Self {
        InboundEvent::Photo {
            reference: reference.into(),
        }
    }

    pub fn video(reference: impl Into<String>) -> Self {
        InboundEvent::Video {
            reference: reference.into(),
        }
    }

    /// Media carried by the event, tagged with its kind
    pub fn media(&self) -> Option<MediaRef> {
        match self {
            InboundEvent::Photo { reference } => Some(MediaRef::photo(reference.as_str())),
            InboundEvent::Video { reference } => Some(MediaRef::video(reference.as_str())),
            InboundEvent::Animation { reference } => {
                Some(MediaRef::animation(reference.as_str()))
            }
            _ => None,
        }
    }

    fn is_restart(&self, signals: &SignalConfig) -> bool {
        match self {
            InboundEvent::Restart => true,
            InboundEvent::Text { text } => signals.is_restart(text),
            _ => false,
        }
    }

    /// Advance signal, as a button or as a typed word
    fn is_advance(&self, signals: &SignalConfig) -> bool {
        match self {
            InboundEvent::Advance => true,
            InboundEvent::Text { text } => signals.is_advance(text),
            _ => false,
        }
    }
}

/// Read-only settings the handlers work with
#[derive(Debug, Clone)]
pub struct MachineContext {
    pub signals: SignalConfig,
    pub classifier: PlatformClassifier,
    pub plan: AlbumPlan,
}

impl MachineContext {
    pub fn from_config(config: &TomlConfig) -> Self {
        Self {
            signals: config.signals.clone(),
            classifier: PlatformClassifier::new(config.socials.clone()),
            plan: AlbumPlan::new(config.albums.max_group_size, config.albums.lead_placement),
        }
    }
}

impl Default for MachineContext {
    fn default() -> Self {
        Self::from_config(&TomlConfig::default())
    }
}

/// Finalization output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Completion {
    pub albums: Vec<Album>,
    pub summary: String,
}

/// What one step produced besides the next session
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outcome {
    pub prompts: Vec<Prompt>,
    pub transition: Option<StageTransition>,
    /// Stage the session was reset from, when the event was a restart
    pub restarted_from: Option<IntakeStage>,
    pub completion: Option<Completion>,
}

impl Outcome {
    fn prompt(prompt: Prompt) -> Self {
        Self {
            prompts: vec![prompt],
            ..Default::default()
        }
    }

    /// Re-prompt for the current stage (nothing for quiet stages)
    fn reprompt(stage: IntakeStage) -> Self {
        Self {
            prompts: Prompt::for_stage(stage).into_iter().collect(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NextSession {
    Continue(Session),
    /// Session finished; the caller discards it
    Terminated,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: NextSession,
    pub outcome: Outcome,
}

impl Step {
    fn stay(session: Session, outcome: Outcome) -> Self {
        Self {
            next: NextSession::Continue(session),
            outcome,
        }
    }

    /// Advance `session` one stage and attach the transition
    fn advance(mut session: Session, prompts: Vec<Prompt>) -> Self {
        let transition = session.advance();
        Self {
            next: NextSession::Continue(session),
            outcome: Outcome {
                prompts,
                transition,
                ..Default::default()
            },
        }
    }
}

type Handler = fn(Session, InboundEvent, &MachineContext) -> Result<Step, ValidationError>;

/// Handler responsible for `stage`
fn handler_for(stage: IntakeStage) -> Handler {
    match stage {
        IntakeStage::LeadMedia => on_lead_media,
        IntakeStage::GalleryPhotos => on_gallery_photos,
        IntakeStage::GalleryVideos => on_gallery_videos,
        IntakeStage::Name | IntakeStage::Alias | IntakeStage::Country | IntakeStage::Fame => {
            on_text_field
        }
        IntakeStage::Socials => on_socials,
        IntakeStage::Finalize => on_finalize,
    }
}

/// Apply one inbound event to `session`
///
/// # Errors
/// [`ValidationError`] when finalization is requested with required data
/// missing. The input session is untouched in that case.
pub fn step(
    session: &Session,
    event: InboundEvent,
    ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    let mut session = session.clone();

    if event.is_restart(&ctx.signals) {
        let from_stage = session.stage;
        session.reset();
        return Ok(Step::stay(
            session,
            Outcome {
                prompts: vec![Prompt::Restarted],
                restarted_from: Some(from_stage),
                ..Default::default()
            },
        ));
    }

    handler_for(session.stage)(session, event, ctx)
}

fn on_lead_media(
    mut session: Session,
    event: InboundEvent,
    _ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    match event {
        InboundEvent::Photo { reference } => {
            session.lead_item = Some(MediaRef::photo(reference));
            Ok(Step::advance(session, vec![Prompt::LeadSaved]))
        }
        _ => Ok(Step::stay(session, Outcome::reprompt(IntakeStage::LeadMedia))),
    }
}

fn on_gallery_photos(
    mut session: Session,
    event: InboundEvent,
    ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    if event.is_advance(&ctx.signals) {
        let count = session.photo_count();
        return Ok(Step::advance(session, vec![Prompt::PhotosSaved { count }]));
    }
    if let InboundEvent::Photo { reference } = event {
        session.gallery_items.push(MediaRef::photo(reference));
    }
    Ok(Step::stay(session, Outcome::default()))
}

fn on_gallery_videos(
    mut session: Session,
    event: InboundEvent,
    ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    if event.is_advance(&ctx.signals) {
        let count = session.motion_count();
        return Ok(Step::advance(
            session,
            vec![Prompt::VideosSaved { count }, Prompt::AskName],
        ));
    }
    if let Some(item) = event.media().filter(|m| m.kind.is_motion()) {
        session.gallery_items.push(item);
    }
    Ok(Step::stay(session, Outcome::default()))
}

fn on_text_field(
    mut session: Session,
    event: InboundEvent,
    _ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    let stage = session.stage;
    let Some(field) = Field::for_stage(stage) else {
        return Ok(Step::stay(session, Outcome::reprompt(stage)));
    };

    match event {
        InboundEvent::Text { text } if !text.trim().is_empty() => {
            session.fields.set(field, text.trim().to_string());
            let next_prompt = stage.next().and_then(Prompt::for_stage);
            Ok(Step::advance(session, next_prompt.into_iter().collect()))
        }
        _ => Ok(Step::stay(session, Outcome::reprompt(stage))),
    }
}

fn on_socials(
    mut session: Session,
    event: InboundEvent,
    ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    if event.is_advance(&ctx.signals) {
        return Ok(Step::advance(session, vec![Prompt::ReadyToFinalize]));
    }

    let InboundEvent::Text { text } = event else {
        return Ok(Step::stay(session, Outcome::reprompt(IntakeStage::Socials)));
    };

    let parsed = ctx.classifier.parse(&text);
    let mut outcome = Outcome::default();
    if !parsed.rejected.is_empty() {
        outcome.prompts.push(Prompt::InvalidLinks {
            rejected: parsed.rejected.len(),
        });
    }
    if !parsed.links.is_empty() {
        outcome.prompts.push(Prompt::SocialsSaved);
    }
    if outcome.prompts.is_empty() {
        outcome.prompts.push(Prompt::AskSocials);
    }
    for (label, link) in parsed.links {
        session.socials.insert(label, link);
    }
    Ok(Step::stay(session, outcome))
}

fn on_finalize(
    session: Session,
    event: InboundEvent,
    ctx: &MachineContext,
) -> Result<Step, ValidationError> {
    if !event.is_advance(&ctx.signals) {
        return Ok(Step::stay(session, Outcome::prompt(Prompt::ReadyToFinalize)));
    }

    if let Some(missing) = session.first_missing() {
        return Err(ValidationError::MissingField(missing));
    }

    let albums = ctx
        .plan
        .partition(session.lead_item.as_ref(), &session.gallery_items)?;
    let summary = build_summary(&session.fields, &session.socials, ctx.classifier.labels());

    Ok(Step {
        next: NextSession::Terminated,
        outcome: Outcome {
            prompts: vec![Prompt::Completed],
            completion: Some(Completion { albums, summary }),
            ..Default::default()
        },
    })
}
