//! # queuebill-db: Bill Store Layer for Queuebill
//!
//! Owns every read and write of issued bills. SQLite is the default store;
//! an in-memory store stands in for tests and dry runs.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Queuebill Data Flow                              │
//! │                                                                         │
//! │  CounterSession::print()                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   queuebill-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │  BillLogger   │    │ QueueSequencer│    │  Migrations  │  │   │
//! │  │   │  append       │    │  initialize   │    │  (embedded)  │  │   │
//! │  │   │  recent       │◄───│  advance/reset│    │ 001_bill_... │  │   │
//! │  │   └───────┬───────┘    └───────────────┘    └──────────────┘  │   │
//! │  │           │                                                     │   │
//! │  │   ┌───────▼──────────────────────────────┐                     │   │
//! │  │   │  BillStore: SqliteBillStore | Memory │                     │   │
//! │  │   └──────────────────────────────────────┘                     │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   ~/.local/share/queuebill/queuebill.db                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - `migrations` - Embedded database migrations (run by `Database::new`)
//! - [`error`] - Database and store error types
//! - [`store`] - The `BillStore` trait and its implementations
//! - [`logger`] - Append/recent over a store
//! - [`sequencer`] - Queue resumption at startup
//!
//! ## Usage
//!
//! ```rust,ignore
//! use queuebill_db::{BillLogger, Database, DbConfig, QueueSequencer};
//!
//! let db = Database::new(DbConfig::new("queuebill.db")).await?;
//! let logger = BillLogger::new(db.bills());
//! let next = QueueSequencer::new(logger.clone()).initialize().await;
//! let record = logger.append(BillMode::Takeaway, next).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod logger;
mod migrations;
pub mod pool;
pub mod sequencer;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, StoreError, StoreResult};
pub use logger::BillLogger;
pub use pool::{Database, DbConfig};
pub use sequencer::QueueSequencer;
pub use store::{BillStore, MemoryStore, SqliteBillStore};
