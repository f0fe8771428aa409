//! Wall-clock stamps for records and history entries
//!
//! Stored as microseconds since the Unix epoch and rendered as RFC 3339.
//! Soft-delete flags, creation and modification times, and the `init` and
//! `done` stamps of history entries all use [`Timestamp`].

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Microseconds since 1970-01-01 00:00:00 UTC
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Unix epoch
    pub const EPOCH: Timestamp = Timestamp(0);

    /// The current time; the epoch if the clock is set before it
    pub fn now() -> Self {
        Timestamp(u64::try_from(Utc::now().timestamp_micros()).unwrap_or(0))
    }

    /// Timestamp `micros` after the epoch
    pub const fn from_micros(micros: u64) -> Self {
        Timestamp(micros)
    }

    /// Timestamp `secs` after the epoch
    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs.saturating_mul(1_000_000))
    }

    /// Microseconds after the epoch
    pub const fn as_micros(self) -> u64 {
        self.0
    }

    /// RFC 3339 with microseconds, always in UTC
    pub fn to_rfc3339(self) -> String {
        let micros = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::<Utc>::from_timestamp_micros(micros)
            .unwrap_or_default()
            .to_rfc3339_opts(SecondsFormat::Micros, true)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}
