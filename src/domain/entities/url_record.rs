//! URL record entity and its read projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A persisted mapping from a long URL to a short code.
///
/// Records are never mutated in place. They are removed by an explicit delete;
/// expiration is logical, so an expired record stays stored until deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UrlRecord {
    pub id: i64,
    pub long_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UrlRecord {
    /// Creates a new UrlRecord instance.
    pub fn new(
        id: i64,
        long_url: String,
        short_code: String,
        expires_at: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            long_url,
            short_code,
            expires_at,
            created_at,
        }
    }

    /// Returns true if the record's expiry is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    /// Returns true if the record has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns the read-relevant fields of this record.
    pub fn projection(&self) -> UrlProjection {
        UrlProjection {
            long_url: self.long_url.clone(),
            short_code: self.short_code.clone(),
            expires_at: self.expires_at,
        }
    }
}

/// Input data for creating a new record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUrlRecord {
    pub long_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Read projection of a [`UrlRecord`].
///
/// This is the only shape returned by `resolve`, whether it came from the
/// registry or the cache, and it is also the cache payload:
/// `{"long_url", "short_code", "expires_at"}` with `expires_at` as RFC 3339 or null.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlProjection {
    pub long_url: String,
    pub short_code: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// The uniqueness constraint violated by an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    LongUrl,
    ShortCode,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LongUrl => f.write_str("long_url"),
            Self::ShortCode => f.write_str("short_code"),
        }
    }
}

/// Selects the record removed by a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteFilter {
    ShortCode(String),
    LongUrl(String),
}

impl DeleteFilter {
    /// Builds a filter from optional request parts.
    ///
    /// Returns `None` unless exactly one non-empty part is supplied.
    pub fn from_parts(short_code: Option<String>, long_url: Option<String>) -> Option<Self> {
        let short_code = short_code.filter(|s| !s.is_empty());
        let long_url = long_url.filter(|s| !s.is_empty());

        match (short_code, long_url) {
            (Some(code), None) => Some(Self::ShortCode(code)),
            (None, Some(url)) => Some(Self::LongUrl(url)),
            _ => None,
        }
    }
}
