//! Ephemeral result store
//!
//! Holds at most one result per interaction. Expiry is checked on every read
//! rather than swept in the background, so an expired result is invisible the
//! moment its retention window closes.

use crate::model::{RequestId, TransformationResult};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
struct StoredResult {
    result: TransformationResult,
    inserted: bool,
    copied: bool,
}

/// Outcome of marking the live result as inserted or copied
#[derive(Debug, PartialEq, Eq)]
pub enum Marked<'a> {
    /// First time for this result; the caller should perform the action
    First(&'a TransformationResult),
    /// Already performed for this result
    Repeat,
    /// No live result (absent or expired)
    Unavailable,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EphemeralResultStore {
    slot: Option<StoredResult>,
}

impl EphemeralResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a result, discarding whatever was there before
    pub fn put(&mut self, result: TransformationResult) {
        self.slot = Some(StoredResult {
            result,
            inserted: false,
            copied: false,
        });
    }

    /// The live result, if present and not expired at `now`
    pub fn get(&self, now: DateTime<Utc>) -> Option<&TransformationResult> {
        self.slot
            .as_ref()
            .map(|s| &s.result)
            .filter(|r| !r.is_expired(now))
    }

    /// The live result for a specific request
    pub fn get_for(&self, request_id: RequestId, now: DateTime<Utc>) -> Option<&TransformationResult> {
        self.get(now).filter(|r| r.request_id == request_id)
    }

    pub fn mark_inserted(&mut self, now: DateTime<Utc>) -> Marked<'_> {
        match self.slot.as_mut() {
            Some(stored) if !stored.result.is_expired(now) => {
                if stored.inserted {
                    Marked::Repeat
                } else {
                    stored.inserted = true;
                    Marked::First(&stored.result)
                }
            }
            _ => Marked::Unavailable,
        }
    }

    pub fn mark_copied(&mut self, now: DateTime<Utc>) -> Marked<'_> {
        match self.slot.as_mut() {
            Some(stored) if !stored.result.is_expired(now) => {
                if stored.copied {
                    Marked::Repeat
                } else {
                    stored.copied = true;
                    Marked::First(&stored.result)
                }
            }
            _ => Marked::Unavailable,
        }
    }

    pub fn is_inserted(&self) -> bool {
        self.slot.as_ref().is_some_and(|s| s.inserted)
    }

    pub fn is_copied(&self) -> bool {
        self.slot.as_ref().is_some_and(|s| s.copied)
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }

    /// Whether anything occupies the slot, expired or not
    pub fn is_occupied(&self) -> bool {
        self.slot.is_some()
    }
}
