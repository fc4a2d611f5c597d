//! # queuebill-core: Pure Logic for Queuebill
//!
//! Everything that decides *what* a bill is and *how* it looks, with zero
//! I/O. The store, the printer and the terminal live in other crates.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Queuebill Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 queuebill (counter app, CLI)                    │   │
//! │  │    mode / table ──► preview ──► print ──► toast + history       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ queuebill-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   queue   │  │ document  │  │  receipt  │  │   │
//! │  │   │ BillMode  │  │  advance  │  │ parse_bill│  │  layout   │  │   │
//! │  │   │   Bill    │  │  resume   │  │  drafts   │  │  tiling   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO PRINTER • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                queuebill-db (Bill Store Layer)                  │   │
//! │  │        document store, bill logger, queue sequencer             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (BillMode, Bill, BillRecord)
//! - [`validation`] - Table/queue range checks
//! - [`queue`] - Queue arithmetic and resumption
//! - [`calendar`] - Clocks and calendar-day comparison
//! - [`document`] - Store documents and bill parsing
//! - [`receipt`] - Receipt layout, 6-up tiling, HTML and text rendering
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use queuebill_core::queue;
//! use queuebill_core::Bill;
//!
//! assert_eq!(queue::advance(47), 48);
//! assert_eq!(queue::advance(100), 1);
//!
//! assert!(Bill::dine_in(10).is_ok());
//! assert!(Bill::dine_in(11).is_err());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calendar;
pub mod document;
pub mod error;
pub mod queue;
pub mod receipt;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calendar::{Clock, FixedClock, OperatingZone, SystemClock};
pub use document::{instant_of, parse_bill, DocumentDraft, RawDocument, RecentQuery};
pub use error::{CoreError, CoreResult, ValidationError};
pub use queue::QueueState;
pub use receipt::{ReceiptLayout, ReceiptLayoutEngine, ReceiptOptions};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Tables in the dining room, numbered 1..=TABLE_COUNT.
pub const TABLE_COUNT: u32 = 10;

/// Highest queue number before the queue wraps back to 1.
pub const QUEUE_MAX: u32 = 100;

/// How many recent bills are read when the queue is resumed at startup.
pub const DEFAULT_LOOKBACK: u32 = 20;

/// How many bills the history panel shows.
pub const DEFAULT_HISTORY_COUNT: u32 = 8;
