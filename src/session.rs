//! Server-side session store and the per-request session handle.
//!
//! Sessions are opaque key/value bags kept in process memory, keyed by a random
//! token that travels in a cookie. A record is created lazily on first write,
//! persisted back to the store at response-flush time if it was modified, and
//! ignored once its absolute expiry has passed. Access across requests is
//! last-writer-wins; the store itself is the only shared mutable resource.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Session key holding the id of the logged-in user.
pub const KEY_AUTH_USER_ID: &str = "authenticated_user_id";
/// Session key holding the one-shot flash message.
pub const KEY_FLASH: &str = "flash";
/// Session key holding the anti-forgery token.
pub const KEY_CSRF_TOKEN: &str = "csrf_token";

/// A typed value stored in a session record.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionValue {
    Int(i64),
    Str(String),
    Bool(bool),
}

impl From<i64> for SessionValue {
    fn from(v: i64) -> Self {
        SessionValue::Int(v)
    }
}

impl From<String> for SessionValue {
    fn from(v: String) -> Self {
        SessionValue::Str(v)
    }
}

impl From<&str> for SessionValue {
    fn from(v: &str) -> Self {
        SessionValue::Str(v.to_string())
    }
}

impl From<bool> for SessionValue {
    fn from(v: bool) -> Self {
        SessionValue::Bool(v)
    }
}

#[derive(Debug, Clone)]
struct SessionRecord {
    values: HashMap<String, SessionValue>,
    expires_at: DateTime<Utc>,
}

/// The process-wide session registry.
///
/// Cloning is cheap; all clones share the same map.
#[derive(Clone)]
pub struct SessionStore {
    records: Arc<RwLock<HashMap<String, SessionRecord>>>,
    lifetime: Duration,
}

impl SessionStore {
    pub fn new(lifetime_hours: u64) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            lifetime: Duration::hours(lifetime_hours as i64),
        }
    }

    /// Session lifetime in seconds, for the cookie Max-Age attribute.
    pub fn lifetime_secs(&self) -> i64 {
        self.lifetime.num_seconds()
    }

    /// Generates a fresh opaque session token.
    pub fn new_token() -> String {
        Uuid::new_v4().simple().to_string()
    }

    /// Loads the values of an unexpired session, or `None` if the token is
    /// unknown or the record has expired.
    pub async fn load(&self, token: &str) -> Option<HashMap<String, SessionValue>> {
        let records = self.records.read().await;
        let record = records.get(token)?;
        if record.expires_at <= Utc::now() {
            return None;
        }
        Some(record.values.clone())
    }

    /// Persists a session, resetting its absolute expiry.
    pub async fn save(&self, token: &str, values: HashMap<String, SessionValue>) {
        let record = SessionRecord { values, expires_at: Utc::now() + self.lifetime };
        self.records.write().await.insert(token.to_string(), record);
    }

    pub async fn remove(&self, token: &str) {
        self.records.write().await.remove(token);
    }

    /// Drops expired records. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        let now = Utc::now();
        records.retain(|_, r| r.expires_at > now);
        before - records.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[derive(Debug)]
struct SessionInner {
    values: HashMap<String, SessionValue>,
    dirty: bool,
    fresh: bool,
}

/// Per-request handle to a session, placed into request extensions by the
/// session-enable interceptor.
///
/// Handlers mutate the handle; the interceptor writes the values back to the
/// [`SessionStore`] after the terminal handler has produced its response, but
/// only if something actually changed.
#[derive(Clone)]
pub struct Session {
    token: String,
    inner: Arc<Mutex<SessionInner>>,
}

impl Session {
    /// Wraps freshly created (empty) session state. `fresh` sessions get a
    /// Set-Cookie header at response time.
    pub fn fresh(token: String) -> Self {
        Self::build(token, HashMap::new(), true)
    }

    /// Wraps state loaded from the store.
    pub fn loaded(token: String, values: HashMap<String, SessionValue>) -> Self {
        Self::build(token, values, false)
    }

    fn build(token: String, values: HashMap<String, SessionValue>, fresh: bool) -> Self {
        Self { token, inner: Arc::new(Mutex::new(SessionInner { values, dirty: false, fresh })) }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// True if this session was created during the current request.
    pub fn is_fresh(&self) -> bool {
        self.lock().fresh
    }

    /// True if the session was modified and must be persisted at flush time.
    pub fn is_dirty(&self) -> bool {
        self.lock().dirty
    }

    pub fn exists(&self, key: &str) -> bool {
        self.lock().values.contains_key(key)
    }

    pub fn insert(&self, key: &str, value: impl Into<SessionValue>) {
        let mut inner = self.lock();
        inner.values.insert(key.to_string(), value.into());
        inner.dirty = true;
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.lock();
        if inner.values.remove(key).is_some() {
            inner.dirty = true;
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.lock().values.get(key) {
            Some(SessionValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        match self.lock().values.get(key) {
            Some(SessionValue::Str(v)) => Some(v.clone()),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.lock().values.get(key) {
            Some(SessionValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    /// Flash semantics: reads a string value and deletes it in the same step.
    pub fn pop_string(&self, key: &str) -> Option<String> {
        let mut inner = self.lock();
        match inner.values.remove(key) {
            Some(SessionValue::Str(v)) => {
                inner.dirty = true;
                Some(v)
            }
            Some(other) => {
                // Value of a different type: put it back untouched.
                inner.values.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    /// Snapshot of the current values for persistence.
    pub fn values(&self) -> HashMap<String, SessionValue> {
        self.lock().values.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionInner> {
        // The handle is only shared within one request; a poisoned lock means
        // a handler panicked mid-mutation and the request is already dead.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_marks_dirty_and_is_readable() {
        let session = Session::fresh(SessionStore::new_token());
        assert!(!session.is_dirty());
        session.insert(KEY_AUTH_USER_ID, 42i64);
        assert!(session.is_dirty());
        assert_eq!(session.get_int(KEY_AUTH_USER_ID), Some(42));
        assert!(session.exists(KEY_AUTH_USER_ID));
    }

    #[test]
    fn pop_string_deletes_on_read() {
        let session = Session::fresh(SessionStore::new_token());
        session.insert(KEY_FLASH, "Snippet successfully created!");
        assert_eq!(session.pop_string(KEY_FLASH), Some("Snippet successfully created!".to_string()));
        assert_eq!(session.pop_string(KEY_FLASH), None);
        assert!(!session.exists(KEY_FLASH));
    }

    #[test]
    fn remove_of_absent_key_keeps_session_clean() {
        let session = Session::loaded(SessionStore::new_token(), HashMap::new());
        session.remove("nothing-here");
        assert!(!session.is_dirty());
    }

    #[tokio::test]
    async fn store_roundtrip_and_expiry() {
        let store = SessionStore::new(12);
        let token = SessionStore::new_token();
        assert!(store.load(&token).await.is_none());

        let mut values = HashMap::new();
        values.insert(KEY_FLASH.to_string(), SessionValue::from("hello"));
        store.save(&token, values).await;

        let loaded = store.load(&token).await.expect("session should exist");
        assert_eq!(loaded.get(KEY_FLASH), Some(&SessionValue::Str("hello".to_string())));

        store.remove(&token).await;
        assert!(store.load(&token).await.is_none());
    }

    #[tokio::test]
    async fn purge_drops_only_expired_records() {
        let store = SessionStore::new(12);
        let live = SessionStore::new_token();
        store.save(&live, HashMap::new()).await;

        // Force an already-expired record in
        {
            let mut records = store.records.write().await;
            records.insert(
                "expired-token".to_string(),
                SessionRecord { values: HashMap::new(), expires_at: Utc::now() - Duration::hours(1) },
            );
        }

        assert_eq!(store.purge_expired().await, 1);
        assert!(store.load(&live).await.is_some());
        assert!(store.load("expired-token").await.is_none());
    }
}
