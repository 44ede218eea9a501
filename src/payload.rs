//! Claims carried inside a token.

use chrono::{DateTime, TimeDelta, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, TokenError};

/// Open-ended metadata bag. Key order is irrelevant.
pub type Metadata = Map<String, Value>;

/// Pieces of information asserted on a token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Caller-supplied identifier, e.g. a session or user ID.
    pub id: String,
    #[serde(default)]
    pub metadata: Metadata,
    /// Time at which the token was issued.
    pub issued_at: DateTime<Utc>,
    /// The token must not be accepted on or after this instant.
    pub expired_at: DateTime<Utc>,
}

impl TokenPayload {
    /// String value at `key`, or an empty string if absent or not a string.
    pub fn get_string(&self, key: &str) -> String {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_default()
    }

    /// Boolean value at `key`, or `false` if absent or not a boolean.
    pub fn get_bool(&self, key: &str) -> bool {
        self.metadata
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or_default()
    }

    /// Raw value at `key`.
    pub fn get_data(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Typed lookup. `None` when `key` is absent or does not deserialize
    /// into `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.metadata
            .get(key)
            .and_then(|value| T::deserialize(value).ok())
    }

    /// Whether the payload is past its validity window at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expired_at
    }

    pub(crate) fn validate(&self, now: DateTime<Utc>) -> Result<()> {
        if self.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        Ok(())
    }
}

/// Options used to build a [`TokenPayload`] at issuance.
///
/// `duration` defaults to zero, which yields an already expired token: always
/// set it.
#[derive(Clone, Debug, PartialEq)]
pub struct PayloadOptions {
    pub id: String,
    pub metadata: Metadata,
    /// Overrides the issuance time. Defaults to now.
    pub issued_at: Option<DateTime<Utc>>,
    /// Validity window, counted from `issued_at`. May be negative.
    pub duration: TimeDelta,
}

impl Default for PayloadOptions {
    fn default() -> Self {
        Self {
            id: String::default(),
            metadata: Metadata::new(),
            issued_at: None,
            duration: TimeDelta::zero(),
        }
    }
}

impl PayloadOptions {
    /// Create a new [`PayloadOptions`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Update `id` field on [`PayloadOptions`].
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Replace the whole metadata bag.
    pub fn metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add one metadata entry.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_metadata(key, value);
        self
    }

    /// Insert or replace one metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Update `issued_at` field on [`PayloadOptions`].
    pub fn issued_at(mut self, issued_at: DateTime<Utc>) -> Self {
        self.issued_at = Some(issued_at);
        self
    }

    /// Update `duration` field on [`PayloadOptions`].
    pub fn duration(mut self, duration: TimeDelta) -> Self {
        self.duration = duration;
        self
    }

    /// Resolve the options into a payload, `now` standing for a missing
    /// issuance time.
    pub(crate) fn build(self, now: DateTime<Utc>) -> TokenPayload {
        let issued_at = self.issued_at.unwrap_or(now);
        let expired_at = issued_at
            .checked_add_signed(self.duration)
            .unwrap_or(if self.duration < TimeDelta::zero() {
                DateTime::<Utc>::MIN_UTC
            } else {
                DateTime::<Utc>::MAX_UTC
            });

        TokenPayload {
            id: self.id,
            metadata: self.metadata,
            issued_at,
            expired_at,
        }
    }
}
