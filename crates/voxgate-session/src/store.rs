use crate::session::CallSession;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;
use voxgate_core::{SessionId, VoxgateError, VoxgateResult};

/// Storage for live call sessions.
///
/// The webhook layer passes the session id explicitly; nothing here depends
/// on cookies or other ambient request state.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, id: SessionId) -> VoxgateResult<Option<CallSession>>;
    /// Insert or replace the session stored under `session.id`.
    async fn put(&self, session: &CallSession) -> VoxgateResult<()>;
    /// Remove a session. Removing a missing session is not an error.
    async fn delete(&self, id: SessionId) -> VoxgateResult<()>;
    /// Look up the session started for a provider call identifier.
    async fn find_by_call_sid(&self, call_sid: &str) -> VoxgateResult<Option<SessionId>>;
    /// Drop every session idle for longer than `ttl`, returning their ids.
    async fn purge_expired(&self, ttl: Duration) -> VoxgateResult<Vec<SessionId>>;
    async fn count(&self) -> usize;
}

/// Process-local session store. Sessions die with the process.
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<SessionId, CallSession>>,
    call_sids: RwLock<HashMap<String, SessionId>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            call_sids: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, id: SessionId) -> VoxgateResult<Option<CallSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn put(&self, session: &CallSession) -> VoxgateResult<()> {
        let mut stored = session.clone();
        stored.updated_at = Utc::now();
        if let Some(sid) = &stored.call_sid {
            self.call_sids.write().await.insert(sid.clone(), stored.id);
        }
        self.sessions.write().await.insert(stored.id, stored);
        Ok(())
    }

    async fn delete(&self, id: SessionId) -> VoxgateResult<()> {
        if let Some(removed) = self.sessions.write().await.remove(&id) {
            if let Some(sid) = removed.call_sid {
                self.call_sids.write().await.remove(&sid);
            }
        }
        Ok(())
    }

    async fn find_by_call_sid(&self, call_sid: &str) -> VoxgateResult<Option<SessionId>> {
        Ok(self.call_sids.read().await.get(call_sid).copied())
    }

    async fn purge_expired(&self, ttl: Duration) -> VoxgateResult<Vec<SessionId>> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| VoxgateError::Session(format!("invalid session ttl: {e}")))?;
        let now = Utc::now();

        let mut sessions = self.sessions.write().await;
        let expired: Vec<SessionId> = sessions
            .values()
            .filter(|s| s.is_idle(ttl, now))
            .map(|s| s.id)
            .collect();

        let mut call_sids = self.call_sids.write().await;
        for id in &expired {
            if let Some(removed) = sessions.remove(id) {
                if let Some(sid) = removed.call_sid {
                    call_sids.remove(&sid);
                }
                debug!(session_id = %id, "Expired idle call session");
            }
        }
        Ok(expired)
    }

    async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
