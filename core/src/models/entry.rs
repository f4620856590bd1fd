//! Accounting entry model
//!
//! The canonical input record: money moves into `destination`, either from
//! another account (`source`) or from outside the system (a direct load,
//! `source == None`). Raw exports sometimes carry a credit/debit type flag
//! instead; `AccountEntry::from_raw` normalizes those before the core ever
//! sees them.
//!
//! CRITICAL: All money values are i64 (cents)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Real-world timestamp attached to an entry
///
/// An ordered (date, time) pair of ISO-8601 strings; lexicographic order
/// over the fields coincides with chronological order. Entries sharing a
/// timestamp are processed as one simultaneous batch.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp {
    /// Date as `YYYY-MM-DD`
    pub date: String,
    /// Time as `HH:MM:SS`
    pub time: String,
}

impl Timestamp {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date, self.time)
    }
}

/// Credit/debit flag carried by raw exports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Money into the listed account
    Credit,
    /// Money out of the listed account
    Debit,
}

/// One normalized money-movement record
///
/// # Example
/// ```
/// use fund_tracer_core_rs::AccountEntry;
///
/// // direct deposit of $1,000.00 into A
/// let load = AccountEntry::new("A", None, 100000);
/// assert!(load.is_direct_load());
///
/// // transfer of $250.00 from A to B
/// let transfer = AccountEntry::new("B", Some("A"), 25000);
/// assert_eq!(transfer.source(), Some("A"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountEntry {
    destination: String,
    source: Option<String>,
    /// Amount in cents, non-negative in the canonical record
    amount: i64,
    timestamp: Option<Timestamp>,
}

impl AccountEntry {
    pub fn new(destination: impl Into<String>, source: Option<&str>, amount: i64) -> Self {
        Self {
            destination: destination.into(),
            source: source.map(str::to_string),
            amount,
            timestamp: None,
        }
    }

    pub fn with_timestamp(mut self, timestamp: Timestamp) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Normalize a raw record carrying a credit/debit flag.
    ///
    /// A credit books money into `account` from the counterparty; a debit
    /// flips the endpoints. A debit without a counterparty would be an
    /// external withdrawal, which the model does not represent: `None`.
    pub fn from_raw(
        kind: EntryKind,
        account: impl Into<String>,
        counterparty: Option<&str>,
        amount: i64,
        timestamp: Option<Timestamp>,
    ) -> Option<Self> {
        let entry = match kind {
            EntryKind::Credit => Self {
                destination: account.into(),
                source: counterparty.map(str::to_string),
                amount: amount.abs(),
                timestamp,
            },
            EntryKind::Debit => Self {
                destination: counterparty?.to_string(),
                source: Some(account.into()),
                amount: amount.abs(),
                timestamp,
            },
        };
        Some(entry)
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn timestamp(&self) -> Option<&Timestamp> {
        self.timestamp.as_ref()
    }

    /// True when the entry is a direct external deposit
    pub fn is_direct_load(&self) -> bool {
        self.source.is_none()
    }
}
