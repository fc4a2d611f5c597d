//! # Queuebill Counter
//!
//! The `queuebill` command: configuration, logging, the counter session,
//! and the print sink, wired together.
//!
//! ## Module Organization
//! ```text
//! queuebill_counter/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── cli.rs          ◄─── clap commands and the interactive counter
//! ├── config.rs       ◄─── counter.toml + QUEUEBILL_* overrides
//! ├── session.rs      ◄─── CounterSession: selection, print, history
//! ├── print.rs        ◄─── PrintSink: HTML page file + print command
//! └── error.rs        ◄─── CounterError / ConfigError
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load config (file, environment, command line)
//! 3. Open the bill store (SQLite file + migrations, or memory)
//! 4. Build logger, sequencer, layout engine and print sink
//! 5. `CounterSession::start()` resumes the queue and loads history

pub mod cli;
pub mod config;
pub mod error;
pub mod print;
pub mod session;

use std::sync::Arc;

use queuebill_core::ReceiptLayoutEngine;
use queuebill_db::{BillLogger, BillStore, Database, DbConfig, MemoryStore, QueueSequencer};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{CounterConfig, StoreBackend};
use error::CounterResult;
use print::{DiscardSink, HtmlFileSink, PrintSink};
use session::CounterSession;

pub use error::{ConfigError, CounterError};

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=queuebill=trace` - Show trace for queuebill crates only
/// - Default: INFO, with debug for queuebill
///
/// Logs go to stderr so command output stays clean on stdout.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,queuebill=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// An open counter: the session plus what it was built from.
pub struct Counter {
    pub config: CounterConfig,
    pub logger: BillLogger,
    pub session: CounterSession,
    db: Option<Database>,
}

impl Counter {
    /// Opens the configured bill store and builds a session over it.
    ///
    /// With `print_pages` off, bills are recorded but no page is produced.
    pub async fn open(config: CounterConfig, print_pages: bool) -> CounterResult<Self> {
        config.validate()?;

        let (store, db): (Arc<dyn BillStore>, Option<Database>) = match config.store.backend {
            StoreBackend::Sqlite => {
                let path = config.database_path();
                info!(path = %path.display(), "Opening bill store");
                let db = Database::new(
                    DbConfig::new(path).max_connections(config.store.max_connections),
                )
                .await?;
                (Arc::new(db.bills()), Some(db))
            }
            StoreBackend::Memory => {
                info!("Using in-memory bill store, bills are not kept");
                (Arc::new(MemoryStore::new()), None)
            }
        };

        let sink: Arc<dyn PrintSink> = if print_pages {
            let mut sink = HtmlFileSink::new(config.output_dir());
            if let Some(command) = &config.print.command {
                sink = sink.with_command(command);
            }
            Arc::new(sink)
        } else {
            Arc::new(DiscardSink)
        };

        Self::assemble(config, store, sink, db)
    }

    /// A counter over a fresh in-memory store that prints nothing.
    pub fn in_memory(config: CounterConfig) -> Self {
        let store: Arc<dyn BillStore> = Arc::new(MemoryStore::new());
        let logger = BillLogger::shared(store);
        let session = Self::build_session(&config, logger.clone(), Arc::new(DiscardSink));
        Counter {
            config,
            logger,
            session,
            db: None,
        }
    }

    fn assemble(
        config: CounterConfig,
        store: Arc<dyn BillStore>,
        sink: Arc<dyn PrintSink>,
        db: Option<Database>,
    ) -> CounterResult<Self> {
        config.zone()?;
        let logger = BillLogger::shared(store);
        let session = Self::build_session(&config, logger.clone(), sink);
        Ok(Counter {
            config,
            logger,
            session,
            db,
        })
    }

    fn build_session(
        config: &CounterConfig,
        logger: BillLogger,
        sink: Arc<dyn PrintSink>,
    ) -> CounterSession {
        let zone = config.zone().unwrap_or_default();
        let sequencer = QueueSequencer::new(logger.clone())
            .with_zone(zone)
            .with_lookback(config.store.lookback);
        let engine = ReceiptLayoutEngine::new(config.receipt_options())
            .with_zone(zone)
            .with_preview_scale(config.print.preview_scale);

        CounterSession::new(logger, sequencer, engine, sink)
            .with_history_count(config.history.count)
    }

    /// Closes the database pool, if any.
    pub async fn close(self) {
        if let Some(db) = self.db {
            db.close().await;
        }
    }
}

impl std::fmt::Debug for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Counter")
            .field("backend", &self.config.store.backend)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuebill_core::BillMode;

    #[tokio::test]
    async fn test_open_sqlite_counter() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = CounterConfig::default();
        config.store.database_path = Some(dir.path().join("data").join("bills.db"));
        config.print.output_dir = Some(dir.path().join("prints"));

        let counter = Counter::open(config.clone(), true).await.unwrap();
        assert_eq!(counter.session.start().await, 1);
        counter.session.select_mode(BillMode::Takeaway).unwrap();
        let report = counter.session.print().await.unwrap();
        assert!(report.output.unwrap().starts_with(dir.path().join("prints")));
        counter.close().await;

        let reopened = Counter::open(config, false).await.unwrap();
        assert_eq!(reopened.session.start().await, 2);
        assert_eq!(reopened.logger.recent(8).await.len(), 1);
        reopened.close().await;
    }

    #[tokio::test]
    async fn test_memory_backend() {
        let mut config = CounterConfig::default();
        config.store.backend = StoreBackend::Memory;
        let counter = Counter::open(config, false).await.unwrap();
        counter.session.select_table(2).unwrap();
        let report = counter.session.print().await.unwrap();
        assert_eq!(report.record.number, 2);
        assert!(report.output.is_none());
    }

    #[tokio::test]
    async fn test_invalid_config_is_refused() {
        let mut config = CounterConfig::default();
        config.history.count = 0;
        assert!(matches!(
            Counter::open(config, false).await,
            Err(CounterError::Config(_))
        ));
    }
}
