//! Session API handlers
//!
//! POST /api/sessions, POST /api/sessions/:key/events,
//! GET /api/sessions/:key, DELETE /api/sessions/:key

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{IntakeFields, IntakeStage, MediaRef, Session, SessionKey, SocialLink},
    services::StepResponse,
    workflow::InboundEvent,
    AppState,
};

/// GET /api/sessions/:key response
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_key: SessionKey,
    pub stage: IntakeStage,
    pub lead_item: Option<MediaRef>,
    pub gallery_items: Vec<MediaRef>,
    pub fields: IntakeFields,
    pub socials: BTreeMap<String, SocialLink>,
    pub started_at: DateTime<Utc>,
    /// First required item still missing, if any
    pub missing: Option<&'static str>,
}

impl From<Session> for SessionSnapshot {
    fn from(session: Session) -> Self {
        let missing = session.first_missing();
        Self {
            session_key: session.key,
            stage: session.stage,
            lead_item: session.lead_item,
            gallery_items: session.gallery_items,
            fields: session.fields,
            socials: session.socials,
            started_at: session.started_at,
            missing,
        }
    }
}

/// POST /api/sessions
///
/// Opens a session under a fresh key and returns the welcome prompt.
pub async fn create_session(
    State(state): State<AppState>,
) -> ApiResult<(StatusCode, Json<StepResponse>)> {
    let key = SessionKey::new(Uuid::new_v4().to_string());
    let response = state.service.start(key).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/sessions/:key/events
///
/// Applies one inbound event. Unknown keys start a new session.
pub async fn post_event(
    State(state): State<AppState>,
    Path(key): Path<String>,
    payload: Result<Json<InboundEvent>, JsonRejection>,
) -> ApiResult<Json<StepResponse>> {
    let Json(event) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if key.trim().is_empty() {
        return Err(ApiError::BadRequest("session key is empty".to_string()));
    }
    let response = state.service.handle(SessionKey::new(key), event).await?;
    Ok(Json(response))
}

/// GET /api/sessions/:key
pub async fn get_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<SessionSnapshot>> {
    let session = state.service.snapshot(&SessionKey::new(key)).await?;
    Ok(Json(session.into()))
}

/// DELETE /api/sessions/:key
pub async fn delete_session(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<StatusCode> {
    state.service.discard(&SessionKey::new(key)).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:key", get(get_session).delete(delete_session))
        .route("/api/sessions/:key/events", post(post_event))
}
