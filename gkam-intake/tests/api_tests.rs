//! Integration tests for gkam-intake HTTP endpoints

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

use gkam_common::events::EventBus;
use gkam_intake::services::{DisabledLookup, IntakeService};
use gkam_intake::store::InMemorySessionStore;
use gkam_intake::workflow::MachineContext;
use gkam_intake::AppState;

fn create_test_app() -> Router {
    let event_bus = EventBus::new(64);
    let service = IntakeService::new(
        Arc::new(InMemorySessionStore::new()),
        Arc::new(DisabledLookup),
        MachineContext::default(),
        event_bus.clone(),
    );
    gkam_intake::build_router(AppState::new(service, event_bus))
}

async fn call(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn post_event(app: &Router, key: &str, event: Value) -> (StatusCode, Value) {
    call(app, Method::POST, &format!("/api/sessions/{}/events", key), Some(event)).await
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_test_app();
    let (status, body) = call(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "gkam-intake");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_create_session_returns_key_and_welcome() {
    let app = create_test_app();
    let (status, body) = call(&app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["stage"], "LEAD_MEDIA");
    assert_eq!(body["prompts"][0]["code"], "welcome");

    let key = body["session_key"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(key).is_ok());

    let (status, snapshot) = call(&app, Method::GET, &format!("/api/sessions/{}", key), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["missing"], "lead_item");
}

#[tokio::test]
async fn test_event_flow_over_http() {
    let app = create_test_app();

    let (status, body) = post_event(&app, "chat-1", json!({"type": "photo", "reference": "face"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_key"], "chat-1");
    assert_eq!(body["stage"], "GALLERY_PHOTOS");
    assert_eq!(body["prompts"][0]["code"], "lead_saved");
    assert!(body.get("completion").is_none());

    // Quiet collection: no prompts for gallery photos
    let (_, body) = post_event(&app, "chat-1", json!({"type": "photo", "reference": "p1"})).await;
    assert_eq!(body["prompts"], json!([]));

    let (_, body) = post_event(&app, "chat-1", json!({"type": "advance"})).await;
    assert_eq!(body["prompts"][0]["code"], "photos_saved");
    assert_eq!(body["stage"], "GALLERY_VIDEOS");

    let (_, body) = post_event(&app, "chat-1", json!({"type": "text", "text": "next"})).await;
    assert_eq!(body["stage"], "NAME");
    assert_eq!(body["prompts"][1]["code"], "ask_name");

    for value in ["Ada", "Countess", "UK", "Mathematics"] {
        post_event(&app, "chat-1", json!({"type": "text", "text": value})).await;
    }
    let (_, body) = post_event(
        &app,
        "chat-1",
        json!({"type": "text", "text": "https://instagram.com/ada, nope"}),
    )
    .await;
    assert_eq!(body["stage"], "SOCIALS");
    assert_eq!(body["prompts"][0]["code"], "invalid_links");
    assert_eq!(body["prompts"][1]["code"], "socials_saved");

    let (_, body) = post_event(&app, "chat-1", json!({"type": "advance"})).await;
    assert_eq!(body["stage"], "FINALIZE");

    let (status, body) = post_event(&app, "chat-1", json!({"type": "text", "text": "confirm"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prompts"][0]["code"], "completed");
    let albums = body["completion"]["albums"].as_array().unwrap();
    assert_eq!(albums.len(), 1);
    assert_eq!(albums[0][0], json!({"kind": "photo", "reference": "face"}));
    assert!(body["completion"]["summary"]
        .as_str()
        .unwrap()
        .contains("Instagram ( x ) - https://instagram.com/ada"));

    let (status, _) = call(&app, Method::GET, "/api/sessions/chat-1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_error_bodies() {
    let app = create_test_app();
    let (status, body) = post_event(&app, "chat-2", json!({"type": "sticker"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, body) = call(&app, Method::GET, "/api/sessions/nobody", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_restart_over_http() {
    let app = create_test_app();
    post_event(&app, "chat-3", json!({"type": "photo", "reference": "face"})).await;

    let (_, body) = post_event(&app, "chat-3", json!({"type": "restart"})).await;
    assert_eq!(body["stage"], "LEAD_MEDIA");
    assert_eq!(body["prompts"][0]["code"], "restarted");

    let (_, snapshot) = call(&app, Method::GET, "/api/sessions/chat-3", None).await;
    assert_eq!(snapshot["lead_item"], Value::Null);
}

#[tokio::test]
async fn test_delete_session() {
    let app = create_test_app();
    post_event(&app, "chat-4", json!({"type": "text", "text": "hi"})).await;

    let (status, _) = call(&app, Method::DELETE, "/api/sessions/chat-4", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = call(&app, Method::DELETE, "/api/sessions/chat-4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_event_stream_opens_with_connection_status() {
    let app = create_test_app();
    let response = app
        .oneshot(Request::builder().uri("/api/events").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    let mut body = response.into_body();
    let frame = body.frame().await.unwrap().unwrap();
    let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
    assert!(text.contains("event: ConnectionStatus"));
    assert!(text.contains("data: connected"));
}
