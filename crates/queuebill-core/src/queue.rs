//! # Queue Numbering
//!
//! Pure queue arithmetic for takeaway bills.
//!
//! ## Queue Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Takeaway Queue                                   │
//! │                                                                         │
//! │  Startup ──► resume_from(recent records, now, zone)                    │
//! │                │                                                        │
//! │                ├── newest same-day TAKEAWAY = v  → advance(v)          │
//! │                └── none (new day / empty / DINE_IN only) → 1           │
//! │                                                                         │
//! │  Print (takeaway, write confirmed) ──► advance(current)                │
//! │                                                                         │
//! │     1 → 2 → ... → 99 → 100 → 1 → 2 ...                                 │
//! │                                                                         │
//! │  Operator reset ──► reset() = 1                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store lookup itself lives in `queuebill-db`; this module only
//! decides numbers from values it is given.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calendar::OperatingZone;
use crate::types::BillRecord;
use crate::QUEUE_MAX;

/// First queue number of a day.
pub const QUEUE_START: u32 = 1;

/// The number after `current`, wrapping past [`QUEUE_MAX`].
///
/// ## Example
/// ```rust
/// use queuebill_core::queue::advance;
///
/// assert_eq!(advance(47), 48);
/// assert_eq!(advance(99), 100);
/// assert_eq!(advance(100), 1);
/// ```
#[inline]
pub const fn advance(current: u32) -> u32 {
    if current >= QUEUE_MAX {
        QUEUE_START
    } else {
        current + 1
    }
}

/// Manual override back to the first number.
#[inline]
pub const fn reset() -> u32 {
    QUEUE_START
}

/// Next queue number given recent records (newest first).
///
/// Only TAKEAWAY records issued on the same calendar day as `now` count;
/// the first one found decides. DINE_IN records are ignored.
pub fn resume_from<'a, I>(records: I, now: &DateTime<Utc>, zone: &OperatingZone) -> u32
where
    I: IntoIterator<Item = &'a BillRecord>,
{
    records
        .into_iter()
        .find(|record| record.is_takeaway() && zone.is_same_day(&record.issued_at, now))
        .map(|record| advance(record.number))
        .unwrap_or(QUEUE_START)
}

// =============================================================================
// Queue State
// =============================================================================

/// The queue counter owned by one counter session.
///
/// There is exactly one writer: the session that owns the value. The counter
/// moves only through [`QueueState::advance`] (after a confirmed write) and
/// [`QueueState::reset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueState {
    current: u32,
}

impl QueueState {
    /// Starts the counter at `current`.
    pub fn new(current: u32) -> Self {
        QueueState { current }
    }

    /// The number the next takeaway bill will carry.
    #[inline]
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Moves to the next number and returns it.
    pub fn advance(&mut self) -> u32 {
        self.current = advance(self.current);
        self.current
    }

    /// Back to 1.
    pub fn reset(&mut self) -> u32 {
        self.current = reset();
        self.current
    }
}

impl Default for QueueState {
    fn default() -> Self {
        QueueState::new(QUEUE_START)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
