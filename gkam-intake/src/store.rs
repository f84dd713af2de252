//! Session storage
//!
//! Sessions live only as long as the process. The store is injected into
//! the service so tests and alternative hosts can supply their own.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::models::{Session, SessionKey};
use gkam_common::{Error, Result};

/// Keyed session storage
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>>;

    /// Insert a new session; fails if the key is taken
    async fn create(&self, session: Session) -> Result<()>;

    /// Replace an existing session; fails if the key is unknown
    async fn update(&self, session: Session) -> Result<()>;

    /// Remove a session; fails if the key is unknown
    async fn delete(&self, key: &SessionKey) -> Result<()>;
}

/// Process-local store over a `RwLock`ed map
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionKey, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, key: &SessionKey) -> Result<Option<Session>> {
        Ok(self.sessions.read().await.get(key).cloned())
    }

    async fn create(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.key) {
            return Err(Error::InvalidInput(format!(
                "session {} already exists",
                session.key
            )));
        }
        sessions.insert(session.key.clone(), session);
        Ok(())
    }

    async fn update(&self, session: Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.key) {
            Some(slot) => {
                *slot = session;
                Ok(())
            }
            None => Err(Error::NotFound(format!("session {}", session.key))),
        }
    }

    async fn delete(&self, key: &SessionKey) -> Result<()> {
        self.sessions
            .write()
            .await
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("session {}", key)))
    }
}
