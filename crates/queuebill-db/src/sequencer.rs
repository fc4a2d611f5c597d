//! # Queue Sequencer
//!
//! Works out where the takeaway queue stands when a counter starts.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  initialize()                                                           │
//! │     │                                                                   │
//! │     ▼  logger.try_recent(lookback = 20)                                 │
//! │  newest first: [DINE_IN 3, TAKEAWAY 47 (today), TAKEAWAY 46, ...]       │
//! │     │                                                                   │
//! │     ▼  first TAKEAWAY issued today (operating zone)                     │
//! │  47 ──► advance ──► 48                                                  │
//! │                                                                         │
//! │  nothing from today in the lookback  ──► 1                              │
//! │  (lookback counts stored documents, unreadable ones included)           │
//! │  store unreachable / query failed    ──► 1 (warn, never blocks)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use queuebill_core::queue::{self, QUEUE_START};
use queuebill_core::{Clock, OperatingZone, SystemClock, DEFAULT_LOOKBACK};
use tracing::{info, warn};

use crate::logger::BillLogger;

/// Derives the starting queue number from the bill log.
#[derive(Clone)]
pub struct QueueSequencer {
    logger: BillLogger,
    clock: Arc<dyn Clock>,
    zone: OperatingZone,
    lookback: u32,
}

impl QueueSequencer {
    /// Sequencer on the system clock in the local zone.
    pub fn new(logger: BillLogger) -> Self {
        QueueSequencer {
            logger,
            clock: Arc::new(SystemClock),
            zone: OperatingZone::default(),
            lookback: DEFAULT_LOOKBACK,
        }
    }

    /// Replaces the counter's clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Zone that decides where one day ends.
    pub fn with_zone(mut self, zone: OperatingZone) -> Self {
        self.zone = zone;
        self
    }

    /// How many recent bills to scan.
    pub fn with_lookback(mut self, lookback: u32) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn lookback(&self) -> u32 {
        self.lookback
    }

    pub fn zone(&self) -> OperatingZone {
        self.zone
    }

    /// Next queue number to hand out. Never fails.
    pub async fn initialize(&self) -> u32 {
        let records = match self.logger.try_recent(self.lookback).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Queue lookup failed, starting at {}", QUEUE_START);
                return QUEUE_START;
            }
        };

        let next = queue::resume_from(&records, &self.clock.now(), &self.zone);
        info!(
            next,
            scanned = records.len(),
            zone = %self.zone,
            "Queue initialized"
        );
        next
    }

    /// Number after `current`, wrapping 100 → 1.
    pub fn advance(&self, current: u32) -> u32 {
        queue::advance(current)
    }

    /// Operator override back to 1.
    pub fn reset(&self) -> u32 {
        queue::reset()
    }
}

impl std::fmt::Debug for QueueSequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueueSequencer")
            .field("zone", &self.zone)
            .field("lookback", &self.lookback)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};
    use queuebill_core::document::{format_timestamp, BILLS_COLLECTION};
    use queuebill_core::{BillMode, DocumentDraft, FixedClock};
    use serde_json::json;

    /// Bangkok wall time, October 2026.
    fn bangkok(day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        FixedOffset::east_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, day, hour, minute, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    struct Fixture {
        server: Arc<FixedClock>,
        counter: Arc<FixedClock>,
        store: Arc<MemoryStore>,
        logger: BillLogger,
        sequencer: QueueSequencer,
    }

    fn fixture(now: DateTime<Utc>) -> Fixture {
        let server = Arc::new(FixedClock::new(now));
        let counter = Arc::new(FixedClock::new(now));
        let store = Arc::new(MemoryStore::with_clock(server.clone()));
        let logger = BillLogger::shared(store.clone());
        let sequencer = QueueSequencer::new(logger.clone())
            .with_clock(counter.clone())
            .with_zone(OperatingZone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap()));
        Fixture {
            server,
            counter,
            store,
            logger,
            sequencer,
        }
    }

    #[test]
    fn test_advance_and_reset() {
        let sequencer = QueueSequencer::new(BillLogger::new(MemoryStore::new()));
        for v in 1..=99 {
            assert_eq!(sequencer.advance(v), v + 1);
        }
        assert_eq!(sequencer.advance(100), 1);
        assert_eq!(sequencer.reset(), 1);
        assert_eq!(sequencer.lookback(), DEFAULT_LOOKBACK);
    }

    #[tokio::test]
    async fn test_resumes_after_same_day_takeaway() {
        let f = fixture(bangkok(19, 12, 0));
        f.logger.append(BillMode::Takeaway, 46).await.unwrap();
        f.logger.append(BillMode::Takeaway, 47).await.unwrap();
        f.logger.append(BillMode::DineIn, 3).await.unwrap();

        assert_eq!(f.sequencer.initialize().await, 48);
    }

    #[tokio::test]
    async fn test_wraps_after_100() {
        let f = fixture(bangkok(19, 12, 0));
        f.logger.append(BillMode::Takeaway, 100).await.unwrap();
        assert_eq!(f.sequencer.initialize().await, 1);
    }

    #[tokio::test]
    async fn test_yesterday_does_not_count() {
        let f = fixture(bangkok(18, 23, 59));
        f.logger.append(BillMode::Takeaway, 47).await.unwrap();

        f.counter.set(bangkok(19, 0, 1));
        f.server.set(bangkok(19, 0, 1));
        assert_eq!(f.sequencer.initialize().await, 1);
    }

    #[tokio::test]
    async fn test_dine_in_only_day() {
        let f = fixture(bangkok(19, 9, 0));
        f.logger.append(BillMode::DineIn, 5).await.unwrap();
        assert_eq!(f.sequencer.initialize().await, 1);
    }

    #[tokio::test]
    async fn test_empty_or_failing_store() {
        let f = fixture(bangkok(19, 9, 0));
        assert_eq!(f.sequencer.initialize().await, 1);

        f.logger.append(BillMode::Takeaway, 30).await.unwrap();
        f.store.fail_queries(true);
        assert_eq!(f.sequencer.initialize().await, 1);
    }

    #[tokio::test]
    async fn test_lookback_bounds_the_scan() {
        let f = fixture(bangkok(19, 10, 0));
        f.logger.append(BillMode::Takeaway, 12).await.unwrap();
        for _ in 0..3 {
            f.server.advance(chrono::Duration::seconds(1));
            f.logger.append(BillMode::DineIn, 2).await.unwrap();
        }

        assert_eq!(f.sequencer.clone().with_lookback(3).initialize().await, 1);
        assert_eq!(f.sequencer.clone().with_lookback(4).initialize().await, 13);
    }

    #[tokio::test]
    async fn test_unreadable_documents_use_up_the_lookback() {
        let f = fixture(bangkok(19, 10, 0));
        f.logger.append(BillMode::Takeaway, 30).await.unwrap();
        for i in 0..DEFAULT_LOOKBACK {
            let junk = DocumentDraft::new()
                .set("type", "DELIVERY")
                .set("number", 5)
                .set("timestamp", format_timestamp(&bangkok(19, 11, 0)))
                .materialize(format!("junk-{}", i), bangkok(19, 11, 0));
            f.store.insert_raw(BILLS_COLLECTION, junk);
        }
        f.counter.set(bangkok(19, 11, 5));

        assert_eq!(f.sequencer.initialize().await, 1);
        let wider = f.sequencer.clone().with_lookback(DEFAULT_LOOKBACK + 1);
        assert_eq!(wider.initialize().await, 31);
    }

    #[tokio::test]
    async fn test_newest_takeaway_wins_across_timestamp_forms() {
        let f = fixture(bangkok(19, 10, 0));
        let earlier = DocumentDraft::new()
            .set("type", "TAKEAWAY")
            .set("number", 90)
            .set("timestamp", json!({ "seconds": bangkok(19, 8, 0).timestamp() }))
            .materialize("earlier", bangkok(19, 8, 0));
        f.store.insert_raw(BILLS_COLLECTION, earlier);
        f.logger.append(BillMode::Takeaway, 12).await.unwrap();

        assert_eq!(f.sequencer.initialize().await, 13);
    }
}
