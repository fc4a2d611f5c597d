//! # Calendar
//!
//! Time sources and calendar-day comparison.
//!
//! The queue resets on the first takeaway bill of each calendar day, so
//! "is this the same day?" decides whether the counter continues or starts
//! over. Two rules keep that decision testable:
//!
//! 1. Nothing here reads ambient "now": callers hand in a [`Clock`].
//! 2. Day comparison happens in an explicit time zone ([`OperatingZone`]),
//!    never in whatever zone a timestamp happens to carry.
//!
//! ```text
//!   23:59 Mon ──► queue 57        (same day as 08:00 Mon)
//!   00:01 Tue ──► queue 1         (new calendar day, not 58)
//! ```

use std::sync::RwLock;

use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, TimeZone, Utc};

use crate::error::CoreError;

// =============================================================================
// Clock
// =============================================================================

/// Source of the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        FixedClock {
            now: RwLock::new(now),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

// =============================================================================
// Day Comparison
// =============================================================================

/// True when `a` and `b` fall on the same year/month/day in `zone`.
///
/// ## Example
/// ```rust
/// use chrono::{FixedOffset, TimeZone, Utc};
/// use queuebill_core::calendar::is_same_calendar_day;
///
/// let bangkok = FixedOffset::east_opt(7 * 3600).unwrap();
/// // 16:59 UTC and 17:01 UTC straddle midnight in Bangkok.
/// let before = Utc.with_ymd_and_hms(2026, 3, 9, 16, 59, 0).unwrap();
/// let after = Utc.with_ymd_and_hms(2026, 3, 9, 17, 1, 0).unwrap();
///
/// assert!(is_same_calendar_day(&before, &after, &Utc));
/// assert!(!is_same_calendar_day(&before, &after, &bangkok));
/// ```
pub fn is_same_calendar_day<Tz: TimeZone>(a: &DateTime<Utc>, b: &DateTime<Utc>, zone: &Tz) -> bool {
    a.with_timezone(zone).date_naive() == b.with_timezone(zone).date_naive()
}

// =============================================================================
// Operating Zone
// =============================================================================

/// The time zone the restaurant counts days in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OperatingZone {
    /// The host's local zone.
    #[default]
    Local,
    /// A fixed UTC offset (e.g. `+07:00`).
    Fixed(FixedOffset),
}

impl OperatingZone {
    /// UTC as an operating zone.
    pub fn utc() -> Self {
        OperatingZone::Fixed(Utc.fix())
    }

    /// Calendar date of `instant` in this zone.
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        match self {
            OperatingZone::Local => instant.with_timezone(&Local).date_naive(),
            OperatingZone::Fixed(offset) => instant.with_timezone(offset).date_naive(),
        }
    }

    /// Same-day check in this zone.
    pub fn is_same_day(&self, a: &DateTime<Utc>, b: &DateTime<Utc>) -> bool {
        match self {
            OperatingZone::Local => is_same_calendar_day(a, b, &Local),
            OperatingZone::Fixed(offset) => is_same_calendar_day(a, b, offset),
        }
    }

    /// `HH:MM` wall-clock label of `instant` in this zone.
    pub fn clock_label(&self, instant: &DateTime<Utc>) -> String {
        match self {
            OperatingZone::Local => instant.with_timezone(&Local).format("%H:%M").to_string(),
            OperatingZone::Fixed(offset) => {
                instant.with_timezone(offset).format("%H:%M").to_string()
            }
        }
    }
}

impl std::fmt::Display for OperatingZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperatingZone::Local => write!(f, "local"),
            OperatingZone::Fixed(offset) => write!(f, "{}", offset),
        }
    }
}

impl std::str::FromStr for OperatingZone {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "local" | "" => Ok(OperatingZone::Local),
            "utc" | "z" => Ok(OperatingZone::utc()),
            _ => trimmed
                .parse::<FixedOffset>()
                .map(OperatingZone::Fixed)
                .map_err(|_| CoreError::UnknownZone(s.to_string())),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn bangkok() -> OperatingZone {
        OperatingZone::Fixed(FixedOffset::east_opt(7 * 3600).unwrap())
    }

    #[test]
    fn test_same_day_ignores_time_of_day() {
        let morning = Utc.with_ymd_and_hms(2026, 10, 19, 1, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2026, 10, 19, 16, 0, 0).unwrap();
        assert!(bangkok().is_same_day(&morning, &evening));
    }

    #[test]
    fn test_midnight_splits_days() {
        // 23:59 and 00:01 Bangkok time
        let late = Utc.with_ymd_and_hms(2026, 10, 19, 16, 59, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 10, 19, 17, 1, 0).unwrap();
        assert!(!bangkok().is_same_day(&late, &early));
        assert!(OperatingZone::utc().is_same_day(&late, &early));
    }

    #[test]
    fn test_same_day_and_month_different_year() {
        let last_year = Utc.with_ymd_and_hms(2025, 10, 19, 5, 0, 0).unwrap();
        let this_year = Utc.with_ymd_and_hms(2026, 10, 19, 5, 0, 0).unwrap();
        assert!(!is_same_calendar_day(&last_year, &this_year, &Utc));
    }

    #[test]
    fn test_zone_parsing() {
        assert_eq!("local".parse::<OperatingZone>().unwrap(), OperatingZone::Local);
        assert_eq!("UTC".parse::<OperatingZone>().unwrap(), OperatingZone::utc());
        assert_eq!("+07:00".parse::<OperatingZone>().unwrap(), bangkok());
        assert!("mars".parse::<OperatingZone>().is_err());
    }

    #[test]
    fn test_clock_label() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 19, 2, 5, 0).unwrap();
        assert_eq!(bangkok().clock_label(&instant), "09:05");
    }

    #[test]
    fn test_fixed_clock_moves_only_when_told() {
        let start = Utc.with_ymd_and_hms(2026, 10, 19, 2, 5, 0).unwrap();
        let clock = FixedClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::minutes(10));
        assert_eq!(clock.now(), start + chrono::Duration::minutes(10));
        clock.set(start);
        assert_eq!(clock.now(), start);
    }
}
