//! Session tokens.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

/// Default session lifetime.
pub const DEFAULT_SESSION_HOURS: i64 = 24;

/// A logged-in session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub cu_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Opaque bearer tokens mapped to CU IDs, each with a fixed lifetime.
pub struct SessionStore {
    lifetime: Duration,
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Start a session for `cu_id`.
    pub fn create(&self, cu_id: &str) -> Session {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            cu_id: cu_id.to_string(),
            expires_at: Utc::now()
                .checked_add_signed(self.lifetime)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// The live session for `token`. Expired sessions are dropped.
    pub fn validate(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            match sessions.get(token) {
                None => return None,
                Some(session) if !session.is_expired_at(now) => return Some(session.clone()),
                Some(_) => {}
            }
        }

        self.revoke(token);
        None
    }

    /// End a session. Returns whether it existed.
    pub fn revoke(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        sessions.remove(token).is_some()
    }

    /// Drop every expired session; returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired_at(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::hours(DEFAULT_SESSION_HOURS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate() {
        let store = SessionStore::default();
        let session = store.create("CU12345");

        let found = store.validate(&session.token).unwrap();
        assert_eq!(found.cu_id, "CU12345");
        assert!(store.validate("unknown-token").is_none());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::default();
        let session = store.create("CU12345");

        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert!(store.validate(&session.token).is_none());
    }

    #[test]
    fn test_expired_sessions_rejected() {
        let store = SessionStore::new(Duration::seconds(-1));
        let session = store.create("CU12345");

        assert!(store.validate(&session.token).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_lifetime_past_calendar_end() {
        let store = SessionStore::new(Duration::days(365 * 300_000));
        let session = store.create("CU12345");

        assert_eq!(session.expires_at, DateTime::<Utc>::MAX_UTC);
        assert!(store.validate(&session.token).is_some());
    }

    #[test]
    fn test_purge_expired() {
        let expired = SessionStore::new(Duration::seconds(-1));
        expired.create("CU111");
        expired.create("CU222");
        assert_eq!(expired.purge_expired(), 2);

        let live = SessionStore::default();
        live.create("CU333");
        assert_eq!(live.purge_expired(), 0);
        assert_eq!(live.len(), 1);
    }
}
