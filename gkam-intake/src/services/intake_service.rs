//! Session service
//!
//! Runs inbound events through the state machine against the session
//! store, enriches social links when a session leaves SOCIALS and publishes
//! lifecycle events on the bus.

use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::enricher::{enrich_socials, FollowerLookup};
use crate::error::IntakeResult;
use crate::models::{IntakeStage, Session, SessionKey};
use crate::store::SessionStore;
use crate::workflow::{step, Completion, InboundEvent, MachineContext, NextSession, Prompt, Step};
use gkam_common::{EventBus, IntakeEvent};

/// Reply to one inbound event
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepResponse {
    pub session_key: SessionKey,
    /// Stage after the event (FINALIZE for a completed session)
    pub stage: IntakeStage,
    pub prompts: Vec<Prompt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<Completion>,
}

pub struct IntakeService {
    store: Arc<dyn SessionStore>,
    lookup: Arc<dyn FollowerLookup>,
    ctx: MachineContext,
    event_bus: EventBus,
}

impl IntakeService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        lookup: Arc<dyn FollowerLookup>,
        ctx: MachineContext,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            lookup,
            ctx,
            event_bus,
        }
    }

    pub fn context(&self) -> &MachineContext {
        &self.ctx
    }

    /// Begin a session under `key`, restarting it if one is in progress
    pub async fn start(&self, key: SessionKey) -> IntakeResult<StepResponse> {
        match self.store.get(&key).await? {
            Some(mut session) => {
                let from_stage = session.stage;
                session.reset();
                self.store.update(session).await?;
                info!(session = %key, from = %from_stage, "Session restarted");
                self.event_bus.emit_lossy(IntakeEvent::SessionRestarted {
                    session_key: key.to_string(),
                    from_stage,
                    timestamp: Utc::now(),
                });
            }
            None => {
                self.create(&key).await?;
            }
        }

        Ok(StepResponse {
            session_key: key,
            stage: IntakeStage::LeadMedia,
            prompts: vec![Prompt::Welcome],
            completion: None,
        })
    }

    /// Apply one inbound event, creating the session on first contact
    ///
    /// # Errors
    /// - `IntakeError::Validation` when finalization is refused; the stored
    ///   session is unchanged
    /// - `IntakeError::Common` on store failures
    pub async fn handle(
        &self,
        key: SessionKey,
        event: InboundEvent,
    ) -> IntakeResult<StepResponse> {
        let session = match self.store.get(&key).await? {
            Some(session) => session,
            None => self.create(&key).await?,
        };

        debug!(session = %key, stage = %session.stage, ?event, "Inbound event");

        let Step { next, outcome } = match step(&session, event, &self.ctx) {
            Ok(step) => step,
            Err(e) => {
                warn!(session = %key, "Finalize rejected: {}", e);
                self.event_bus.emit_lossy(IntakeEvent::FinalizeRejected {
                    session_key: key.to_string(),
                    reason: e.to_string(),
                    timestamp: Utc::now(),
                });
                return Err(e.into());
            }
        };

        match next {
            NextSession::Continue(mut next) => {
                if let Some(from_stage) = outcome.restarted_from {
                    info!(session = %key, from = %from_stage, "Session restarted");
                    self.event_bus.emit_lossy(IntakeEvent::SessionRestarted {
                        session_key: key.to_string(),
                        from_stage,
                        timestamp: Utc::now(),
                    });
                }

                if let Some(transition) = &outcome.transition {
                    if transition.new_stage == IntakeStage::Finalize {
                        let enriched = enrich_socials(
                            &mut next.socials,
                            &self.ctx.classifier,
                            self.lookup.as_ref(),
                        )
                        .await;
                        debug!(session = %key, enriched, "Follower enrichment finished");
                    }
                    info!(
                        session = %key,
                        old_stage = %transition.old_stage,
                        new_stage = %transition.new_stage,
                        "Stage changed"
                    );
                    self.event_bus.emit_lossy(IntakeEvent::StageChanged {
                        session_key: key.to_string(),
                        old_stage: transition.old_stage,
                        new_stage: transition.new_stage,
                        timestamp: transition.transitioned_at,
                    });
                }

                let stage = next.stage;
                self.store.update(next).await?;

                Ok(StepResponse {
                    session_key: key,
                    stage,
                    prompts: outcome.prompts,
                    completion: None,
                })
            }
            NextSession::Terminated => {
                self.store.delete(&key).await?;

                if let Some(completion) = &outcome.completion {
                    let album_count = completion.albums.len();
                    let item_count: usize = completion.albums.iter().map(|a| a.len()).sum();
                    info!(session = %key, album_count, item_count, "Session completed");
                    self.event_bus.emit_lossy(IntakeEvent::SessionCompleted {
                        session_key: key.to_string(),
                        album_count,
                        item_count,
                        timestamp: Utc::now(),
                    });
                }

                Ok(StepResponse {
                    session_key: key,
                    stage: session.stage,
                    prompts: outcome.prompts,
                    completion: outcome.completion,
                })
            }
        }
    }

    /// Current state of a session
    pub async fn snapshot(&self, key: &SessionKey) -> IntakeResult<Session> {
        self.store
            .get(key)
            .await?
            .ok_or_else(|| gkam_common::Error::NotFound(format!("session {}", key)).into())
    }

    /// Drop a session without finalizing it
    pub async fn discard(&self, key: &SessionKey) -> IntakeResult<()> {
        self.store.delete(key).await?;
        info!(session = %key, "Session discarded");
        Ok(())
    }

    async fn create(&self, key: &SessionKey) -> IntakeResult<Session> {
        let session = Session::new(key.clone());
        self.store.create(session.clone()).await?;
        info!(session = %key, "Session started");
        self.event_bus.emit_lossy(IntakeEvent::SessionStarted {
            session_key: key.to_string(),
            timestamp: session.started_at,
        });
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{IntakeError, ValidationError};
    use crate::services::enricher::DisabledLookup;
    use crate::store::InMemorySessionStore;

    fn service() -> (IntakeService, EventBus) {
        let bus = EventBus::new(64);
        let service = IntakeService::new(
            Arc::new(InMemorySessionStore::new()),
            Arc::new(DisabledLookup),
            MachineContext::default(),
            bus.clone(),
        );
        (service, bus)
    }

    #[tokio::test]
    async fn test_first_event_creates_session() {
        let (service, bus) = service();
        let mut rx = bus.subscribe();
        let key = SessionKey::from("chat-1");

        let response = service.handle(key.clone(), InboundEvent::photo("face")).await.unwrap();
        assert_eq!(response.stage, IntakeStage::GalleryPhotos);
        assert_eq!(response.prompts, vec![Prompt::LeadSaved]);

        assert_eq!(rx.recv().await.unwrap().event_type(), "SessionStarted");
        assert_eq!(rx.recv().await.unwrap().event_type(), "StageChanged");
        assert_eq!(service.snapshot(&key).await.unwrap().stage, IntakeStage::GalleryPhotos);
    }

    #[tokio::test]
    async fn test_start_resets_existing_session() {
        let (service, _bus) = service();
        let key = SessionKey::from("chat-2");
        service.handle(key.clone(), InboundEvent::photo("face")).await.unwrap();

        let response = service.start(key.clone()).await.unwrap();
        assert_eq!(response.prompts, vec![Prompt::Welcome]);
        let session = service.snapshot(&key).await.unwrap();
        assert_eq!(session.stage, IntakeStage::LeadMedia);
        assert!(session.lead_item.is_none());
    }

    #[tokio::test]
    async fn test_rejected_finalize_emits_event_and_keeps_session() {
        let (service, bus) = service();
        let key = SessionKey::from("chat-3");
        service.start(key.clone()).await.unwrap();

        let mut session = service.snapshot(&key).await.unwrap();
        session.stage = IntakeStage::Finalize;
        session.lead_item = Some(crate::models::MediaRef::photo("face"));
        service.store.update(session.clone()).await.unwrap();

        let mut rx = bus.subscribe();
        let err = service.handle(key.clone(), InboundEvent::Advance).await.unwrap_err();
        assert!(matches!(
            err,
            IntakeError::Validation(ValidationError::MissingField("name"))
        ));
        assert_eq!(rx.recv().await.unwrap().event_type(), "FinalizeRejected");
        assert_eq!(service.snapshot(&key).await.unwrap(), session);
    }

    #[tokio::test]
    async fn test_discard_unknown_session_is_not_found() {
        let (service, _bus) = service();
        let err = service.discard(&SessionKey::from("nobody")).await.unwrap_err();
        assert!(matches!(err, IntakeError::Common(gkam_common::Error::NotFound(_))));
    }
}
