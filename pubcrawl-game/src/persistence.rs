//! Snapshot persistence across two key-value scopes with day-based expiry.
//!
//! The same JSON record is written to a durable scope and a session-bound
//! scope. Reads prefer the session scope. A record saved on a different
//! calendar day (local time) is discarded and both scopes are wiped.
use chrono::{DateTime, Local, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::challenges::Challenge;
use crate::constants::STORAGE_KEY;
use crate::state::SessionState;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected: {0}")]
    WriteRejected(String),
}

/// Minimal string key-value store, shaped after the browser storage API.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store refuses the write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove(&self, key: &str);
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
    reject_writes: Rc<Cell<bool>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail, as a full or disabled browser store would.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::WriteRejected(key.to_string()));
        }
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// Source of "now" for timestamps and expiry checks.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Settable clock. Clones share the same instant.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Rc<Cell<DateTime<Local>>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(at: DateTime<Local>) -> Self {
        Self {
            now: Rc::new(Cell::new(at)),
        }
    }

    pub fn set(&self, at: DateTime<Local>) {
        self.now.set(at);
    }

    pub fn advance(&self, by: chrono::Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

/// Persisted record. Field names are fixed by the stored format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, deserialize_with = "lenient::count")]
    pub challenge_count: u32,
    #[serde(default, deserialize_with = "lenient::venue_index")]
    pub current_venue_index: Option<u32>,
    /// Venue key used by the first release. Read only as a fallback.
    #[serde(
        default,
        rename = "currentBar",
        skip_serializing,
        deserialize_with = "lenient::venue_index"
    )]
    pub legacy_venue_index: Option<u32>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub active_challenge_shown: bool,
    #[serde(default, deserialize_with = "lenient::texts")]
    pub completed_challenges: Vec<String>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_shown_share_prompt: bool,
    #[serde(default, deserialize_with = "lenient::count")]
    pub completions_at_current_venue: u32,
    #[serde(default, deserialize_with = "lenient::text")]
    pub timestamp: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::challenge"
    )]
    pub active_challenge: Option<Challenge>,
}

impl Snapshot {
    #[must_use]
    pub fn capture(state: &SessionState, now: DateTime<Local>) -> Self {
        Self {
            challenge_count: state.challenge_count,
            current_venue_index: Some(state.current_venue_index),
            legacy_venue_index: None,
            active_challenge_shown: state.active_challenge.is_some(),
            completed_challenges: state.completed_challenge_log.clone(),
            has_shown_share_prompt: state.share_prompt_shown,
            completions_at_current_venue: state.completions_at_current_venue,
            timestamp: now
                .with_timezone(&Utc)
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            active_challenge: state.active_challenge.clone(),
        }
    }

    /// Local calendar date the snapshot was written on.
    #[must_use]
    pub fn saved_on(&self) -> Option<NaiveDate> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|saved| saved.with_timezone(&Local).date_naive())
    }

    /// 1-based venue index. `currentVenueIndex` wins over the legacy key.
    #[must_use]
    pub fn venue_index(&self) -> u32 {
        self.current_venue_index
            .or(self.legacy_venue_index)
            .unwrap_or(1)
            .max(1)
    }

    /// Rebuild session state. The undo slot never survives a reload.
    #[must_use]
    pub fn into_state(self) -> SessionState {
        let current_venue_index = self.venue_index();
        let active_challenge = self
            .active_challenge
            .filter(|_| self.active_challenge_shown);
        SessionState {
            challenge_count: self.challenge_count,
            current_venue_index,
            completions_at_current_venue: self
                .completions_at_current_venue
                .min(self.challenge_count),
            last_shown_challenge: active_challenge.clone(),
            active_challenge,
            completed_challenge_log: self.completed_challenges,
            undo: None,
            share_prompt_shown: self.has_shown_share_prompt,
        }
    }
}

/// Field decoders that fall back to a default instead of failing the record.
mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use crate::challenges::Challenge;

    fn as_count(value: &Value) -> Option<u32> {
        if let Some(n) = value.as_u64() {
            return u32::try_from(n).ok();
        }
        let n = value.as_f64()?;
        if n.is_finite() && n >= 0.0 && n <= f64::from(u32::MAX) {
            // Range checked above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            return Some(n.trunc() as u32);
        }
        None
    }

    pub fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(as_count(&value).unwrap_or(0))
    }

    pub fn venue_index<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<u32>, D::Error> {
        count(deserializer).map(|index| Some(index.max(1)))
    }

    pub fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map(str::to_string).unwrap_or_default())
    }

    pub fn texts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub fn challenge<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Challenge>, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(value).ok())
    }
}

/// Save/load contract the session relies on. Never fails outward.
pub trait SessionPersistence {
    fn save(&self, state: &SessionState);
    fn load(&self) -> Option<SessionState>;
    fn clear(&self);
}

/// Two-scope snapshot store.
#[derive(Debug, Clone)]
pub struct SessionStore<D, S, C>
where
    D: KeyValueStore,
    S: KeyValueStore,
    C: Clock,
{
    durable: D,
    session: S,
    clock: C,
    key: String,
}

impl<D, S, C> SessionStore<D, S, C>
where
    D: KeyValueStore,
    S: KeyValueStore,
    C: Clock,
{
    pub fn new(durable: D, session: S, clock: C) -> Self {
        Self {
            durable,
            session,
            clock,
            key: STORAGE_KEY.to_string(),
        }
    }

    #[must_use]
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    pub const fn clock(&self) -> &C {
        &self.clock
    }

    /// Read the freshest parseable snapshot without applying expiry.
    ///
    /// The flag reports whether any raw value was present at all.
    fn read_snapshot(&self) -> (Option<Snapshot>, bool) {
        let session_raw = self.session.get(&self.key);
        let durable_raw = self.durable.get(&self.key);
        let found = session_raw.is_some() || durable_raw.is_some();
        let snapshot = session_raw
            .and_then(|raw| parse_snapshot(&raw, "session"))
            .or_else(|| durable_raw.and_then(|raw| parse_snapshot(&raw, "durable")));
        (snapshot, found)
    }

    /// Load the stored snapshot if it was written today.
    ///
    /// Stale or unreadable records are removed from both scopes.
    #[must_use]
    pub fn load_snapshot(&self) -> Option<Snapshot> {
        let (snapshot, found) = self.read_snapshot();
        let Some(snapshot) = snapshot else {
            if found {
                log::info!("discarding unreadable session snapshot");
                self.clear();
            }
            return None;
        };

        let today = self.clock.now().date_naive();
        match snapshot.saved_on() {
            Some(saved_on) if saved_on == today => Some(snapshot),
            saved_on => {
                log::info!("session snapshot from {saved_on:?} expired on {today}; starting fresh");
                self.clear();
                None
            }
        }
    }
}

fn parse_snapshot(raw: &str, scope: &str) -> Option<Snapshot> {
    match serde_json::from_str::<Snapshot>(raw) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            log::warn!("ignoring malformed {scope} snapshot: {err}");
            None
        }
    }
}

impl<D, S, C> SessionPersistence for SessionStore<D, S, C>
where
    D: KeyValueStore,
    S: KeyValueStore,
    C: Clock,
{
    fn save(&self, state: &SessionState) {
        let snapshot = Snapshot::capture(state, self.clock.now());
        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(err) => {
                log::warn!("session snapshot could not be serialized: {err}");
                return;
            }
        };
        if let Err(err) = self.durable.set(&self.key, &payload) {
            log::warn!("durable save failed: {err}");
        }
        if let Err(err) = self.session.set(&self.key, &payload) {
            log::warn!("session-scope save failed: {err}");
        }
    }

    fn load(&self) -> Option<SessionState> {
        self.load_snapshot().map(Snapshot::into_state)
    }

    fn clear(&self) {
        self.durable.remove(&self.key);
        self.session.remove(&self.key);
    }
}
