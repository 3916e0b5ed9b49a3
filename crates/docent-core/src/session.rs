//! Per-session chat history and query accounting.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatEntry {
    pub question: String,
    pub answer: String,
    pub asked_at: String,
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub history: Vec<ChatEntry>,
    pub queries_used: u32,
    /// Questions admitted by the quota whose answer is still pending.
    pub in_flight: u32,
    last_touched: u64,
}

impl Session {
    /// Append an answered question and count it against the quota.
    pub fn record(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(ChatEntry {
            question: question.into(),
            answer: answer.into(),
            asked_at: chrono::Utc::now().to_rfc3339(),
        });
        self.queries_used = self.queries_used.saturating_add(1);
    }

    /// Drop the displayed history. The query count is kept.
    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    #[must_use]
    pub fn history_newest_first(&self) -> Vec<ChatEntry> {
        self.history.iter().rev().cloned().collect()
    }

    /// Questions left under `max`, or `None` when `max` is 0 (unlimited).
    #[must_use]
    pub fn remaining(&self, max: u32) -> Option<u32> {
        (max > 0).then(|| max.saturating_sub(self.queries_used))
    }
}

/// Caps answered questions per session. `max_queries == 0` disables the cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryQuota {
    pub max_queries: u32,
}

impl QueryQuota {
    #[must_use]
    pub fn new(max_queries: u32) -> Self {
        Self { max_queries }
    }

    #[must_use]
    pub fn is_unlimited(self) -> bool {
        self.max_queries == 0
    }

    /// # Errors
    ///
    /// Returns [`CoreError::QuotaExceeded`] once the session has used its allowance.
    pub fn check(self, session: &Session) -> Result<(), CoreError> {
        if self.is_unlimited() {
            return Ok(());
        }
        if session.queries_used.saturating_add(session.in_flight) >= self.max_queries {
            return Err(CoreError::QuotaExceeded {
                max: self.max_queries,
            });
        }
        Ok(())
    }

    /// Admit one question, holding a slot until [`QueryQuota::commit`] or
    /// [`QueryQuota::release`].
    ///
    /// # Errors
    ///
    /// Same as [`QueryQuota::check`].
    pub fn reserve(self, session: &mut Session) -> Result<(), CoreError> {
        self.check(session)?;
        session.in_flight = session.in_flight.saturating_add(1);
        Ok(())
    }

    pub fn commit(self, session: &mut Session, question: &str, answer: &str) {
        session.in_flight = session.in_flight.saturating_sub(1);
        session.record(question, answer);
    }

    pub fn release(self, session: &mut Session) {
        session.in_flight = session.in_flight.saturating_sub(1);
    }

    #[must_use]
    pub fn remaining(self, session: &Session) -> Option<u32> {
        session.remaining(self.max_queries)
    }
}

#[derive(Default)]
struct Sessions {
    map: HashMap<String, Session>,
    clock: u64,
}

impl Sessions {
    fn touch(&mut self, id: &str) -> &mut Session {
        self.clock += 1;
        let clock = self.clock;
        let session = self.map.entry(id.to_owned()).or_default();
        session.last_touched = clock;
        session
    }

    fn evict_beyond(&mut self, max: usize, keep: &str) {
        while self.map.len() > max {
            let Some(oldest) = self
                .map
                .iter()
                .filter(|(id, _)| id.as_str() != keep)
                .min_by_key(|(_, s)| s.last_touched)
                .map(|(id, _)| id.clone())
            else {
                break;
            };
            self.map.remove(&oldest);
            tracing::debug!(session = %oldest, "evicted least recently used session");
        }
    }
}

/// Shared in-memory session table with least-recently-used eviction.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<Sessions>>,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl SessionStore {
    #[must_use]
    pub fn new(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Sessions::default())),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Start a fresh session and return its id.
    pub async fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;
        inner.touch(&id);
        inner.evict_beyond(self.max_sessions, &id);
        id
    }

    /// Run `f` against the session `id`, creating it when absent.
    pub async fn with_session<R>(&self, id: &str, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut inner = self.inner.write().await;
        let out = f(inner.touch(id));
        inner.evict_beyond(self.max_sessions, id);
        out
    }

    /// Snapshot of session `id`, if it exists.
    pub async fn get(&self, id: &str) -> Option<Session> {
        self.inner.read().await.map.get(id).cloned()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.map.contains_key(id)
    }

    pub async fn remove(&self, id: &str) -> bool {
        self.inner.write().await.map.remove(id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.map.is_empty()
    }
}
