//! Server-Sent Events for session lifecycle updates

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /api/events
///
/// Streams SessionStarted, StageChanged, SessionRestarted, FinalizeRejected
/// and SessionCompleted events.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    gkam_common::sse::create_event_sse_stream("gkam-intake", &state.event_bus)
}
