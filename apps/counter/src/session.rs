//! # Counter Session
//!
//! Everything the operator sees and touches at the counter.
//!
//! ## Thread Safety
//! Session state lives behind a `Mutex` that is never held across an
//! `.await`. The print action is gated by a separate busy flag, so a second
//! print while a write is in flight is refused instead of queued. Changing
//! the selection or resetting the queue is refused the same way.
//!
//! A toast stays up for [`TOAST_TTL`] and then reads as `None`.
//!
//! ## Print Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  print()                                                                │
//! │     │                                                                   │
//! │     ├── busy? ────────────────────────────► Err(Busy), nothing changes  │
//! │     ▼                                                                   │
//! │  logger.append(mode, number) ── failed ──► toast + Err(Store)           │
//! │     │                                       queue NOT advanced          │
//! │     ▼  recorded                                                         │
//! │  print page (6-up, full size) ──► sink.deliver()                        │
//! │     │                              failure is reported, bill still      │
//! │     │                              counts                               │
//! │     ▼                                                                   │
//! │  TAKEAWAY: queue.advance()    DINE_IN: queue untouched                  │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  history ◄── logger.recent(8)      toast "Queue 23 recorded"            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use queuebill_core::receipt::{html, mode_caption, TiledPage};
use queuebill_core::validation::validate_table_number;
use queuebill_core::{
    Bill, BillMode, BillRecord, OperatingZone, QueueState, ReceiptLayoutEngine,
    DEFAULT_HISTORY_COUNT,
};
use queuebill_db::{BillLogger, QueueSequencer};
use tracing::{debug, error, info, warn};

use crate::error::{CounterError, CounterResult};
use crate::print::{PrintJob, PrintSink};

/// Table selected when a session starts.
pub const DEFAULT_TABLE: u32 = 1;

/// How long a toast message stays visible.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

// =============================================================================
// Session State
// =============================================================================

/// What the operator currently has selected.
#[derive(Debug, Clone)]
struct SessionState {
    queue: QueueState,
    mode: BillMode,
    table: u32,
    history: Vec<BillRecord>,
    toast: Option<Toast>,
}

#[derive(Debug, Clone)]
struct Toast {
    message: String,
    expires_at: Instant,
}

impl Default for SessionState {
    fn default() -> Self {
        SessionState {
            queue: QueueState::default(),
            mode: BillMode::default(),
            table: DEFAULT_TABLE,
            history: Vec::new(),
            toast: None,
        }
    }
}

/// Outcome of a recorded print.
#[derive(Debug, Clone)]
pub struct PrintReport {
    /// The bill as stored.
    pub record: BillRecord,
    /// Where the print page went, if the sink keeps one.
    pub output: Option<PathBuf>,
    /// Why the page did not reach the printer. The bill is recorded regardless.
    pub print_error: Option<String>,
    /// Queue number the next takeaway bill will carry.
    pub next_queue: u32,
}

/// Clears the busy flag when a print finishes, however it finishes.
struct BusyGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

// =============================================================================
// Counter Session
// =============================================================================

/// One operator's counter.
pub struct CounterSession {
    logger: BillLogger,
    sequencer: QueueSequencer,
    engine: ReceiptLayoutEngine,
    sink: Arc<dyn PrintSink>,
    history_count: u32,
    toast_ttl: Duration,
    state: Mutex<SessionState>,
    busy: AtomicBool,
}

impl CounterSession {
    pub fn new(
        logger: BillLogger,
        sequencer: QueueSequencer,
        engine: ReceiptLayoutEngine,
        sink: Arc<dyn PrintSink>,
    ) -> Self {
        CounterSession {
            logger,
            sequencer,
            engine,
            sink,
            history_count: DEFAULT_HISTORY_COUNT,
            toast_ttl: TOAST_TTL,
            state: Mutex::new(SessionState::default()),
            busy: AtomicBool::new(false),
        }
    }

    /// How many bills the history list holds.
    pub fn with_history_count(mut self, count: u32) -> Self {
        self.history_count = count;
        self
    }

    /// How long a toast stays visible.
    pub fn with_toast_ttl(mut self, ttl: Duration) -> Self {
        self.toast_ttl = ttl;
        self
    }

    fn ensure_idle(&self, action: &str) -> CounterResult<()> {
        if self.is_busy() {
            warn!(action, "Refused, a print is in flight");
            return Err(CounterError::Busy);
        }
        Ok(())
    }

    fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&SessionState) -> R,
    {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&state)
    }

    fn with_state_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut SessionState) -> R,
    {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut state)
    }

    /// Resumes the queue from the bill log and loads the history list.
    ///
    /// Never fails: an unreachable store starts the queue at 1.
    pub async fn start(&self) -> u32 {
        let next = self.sequencer.initialize().await;
        self.with_state_mut(|s| s.queue = QueueState::new(next));
        self.refresh_history().await;
        info!(queue = next, mode = %self.mode(), "Counter session started");
        next
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn mode(&self) -> BillMode {
        self.with_state(|s| s.mode)
    }

    /// Switches between dine-in and takeaway. Refused while printing.
    pub fn select_mode(&self, mode: BillMode) -> CounterResult<()> {
        self.ensure_idle("select mode")?;
        debug!(mode = %mode, "Mode selected");
        self.with_state_mut(|s| s.mode = mode);
        Ok(())
    }

    pub fn table(&self) -> u32 {
        self.with_state(|s| s.table)
    }

    /// Picks a table (1-10). Out-of-range tables leave the selection as is,
    /// and so does a print in flight.
    pub fn select_table(&self, table: u32) -> CounterResult<()> {
        self.ensure_idle("select table")?;
        validate_table_number(table)?;
        debug!(table, "Table selected");
        self.with_state_mut(|s| s.table = table);
        Ok(())
    }

    /// Number the next takeaway bill will carry.
    pub fn current_queue(&self) -> u32 {
        self.with_state(|s| s.queue.current())
    }

    /// Operator override: the next takeaway bill is queue 1. Refused while
    /// a print is in flight.
    pub fn reset_queue(&self) -> CounterResult<u32> {
        self.ensure_idle("reset queue")?;
        let reset = self.sequencer.reset();
        self.with_state_mut(|s| s.queue = QueueState::new(reset));
        info!("Queue reset to {}", reset);
        Ok(reset)
    }

    /// Number printed on the bill for the current mode.
    pub fn current_number(&self) -> u32 {
        self.with_state(|s| match s.mode {
            BillMode::DineIn => s.table,
            BillMode::Takeaway => s.queue.current(),
        })
    }

    /// The bill a print would issue right now.
    pub fn current_bill(&self) -> CounterResult<Bill> {
        let (mode, number) = self.with_state(|s| {
            let number = match s.mode {
                BillMode::DineIn => s.table,
                BillMode::Takeaway => s.queue.current(),
            };
            (s.mode, number)
        });
        Ok(Bill::new(mode, number)?)
    }

    // =========================================================================
    // Preview & Print
    // =========================================================================

    /// Scaled-down page for the bill currently selected.
    pub fn preview(&self) -> CounterResult<TiledPage> {
        Ok(self.engine.preview(&self.current_bill()?))
    }

    /// Whether a print is in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Records the current bill, prints it, and moves the queue on.
    ///
    /// ## Errors
    /// - [`CounterError::Busy`] - another print is in flight; nothing happened
    /// - [`CounterError::Store`] - the bill was not recorded; nothing was
    ///   printed and the queue did not move
    pub async fn print(&self) -> CounterResult<PrintReport> {
        let Some(_guard) = BusyGuard::acquire(&self.busy) else {
            warn!("Print refused, another print is in flight");
            return Err(CounterError::Busy);
        };

        let bill = self.current_bill()?;
        let caption = mode_caption(bill.mode());

        let record = match self.logger.append(bill.mode(), bill.number()).await {
            Ok(record) => record,
            Err(e) => {
                self.set_toast(format!("{} {} not recorded: {}", caption, bill.number(), e));
                return Err(e.into());
            }
        };

        let title = format!("{} {}", caption, record.number);
        let (output, print_error) = match self.engine.print_record(&record) {
            Some(page) => {
                let job = PrintJob {
                    record: record.clone(),
                    html: html::render_page(&page, &title),
                    title: title.clone(),
                };
                match self.sink.deliver(&job).await {
                    Ok(output) => (output, None),
                    Err(e) => {
                        error!(id = %record.id, error = %e, "Bill recorded but not printed");
                        (None, Some(e.to_string()))
                    }
                }
            }
            None => {
                error!(id = %record.id, "Recorded bill has no printable layout");
                (None, Some(format!("{} has no printable layout", title)))
            }
        };

        let next_queue = self.with_state_mut(|s| {
            if bill.mode().uses_queue() {
                s.queue.advance()
            } else {
                s.queue.current()
            }
        });

        self.refresh_history().await;
        self.set_toast(format!("{} recorded", title));

        Ok(PrintReport {
            record,
            output,
            print_error,
            next_queue,
        })
    }

    // =========================================================================
    // History & Feedback
    // =========================================================================

    /// Last history snapshot, newest first.
    pub fn history(&self) -> Vec<BillRecord> {
        self.with_state(|s| s.history.clone())
    }

    /// Reloads the history list. A failed read leaves it empty.
    pub async fn refresh_history(&self) -> Vec<BillRecord> {
        let history = self.logger.recent(self.history_count).await;
        self.with_state_mut(|s| s.history = history.clone());
        history
    }

    /// History rows as shown to the operator.
    pub fn history_lines(&self) -> Vec<String> {
        let zone = self.sequencer.zone();
        self.history()
            .iter()
            .map(|record| format_history_entry(record, &zone))
            .collect()
    }

    /// Last message for the operator, until it expires.
    pub fn toast(&self) -> Option<String> {
        self.with_state(|s| {
            s.toast
                .as_ref()
                .filter(|t| Instant::now() < t.expires_at)
                .map(|t| t.message.clone())
        })
    }

    fn set_toast(&self, message: String) {
        let expires_at = Instant::now() + self.toast_ttl;
        self.with_state_mut(|s| s.toast = Some(Toast { message, expires_at }));
    }
}

impl std::fmt::Debug for CounterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with_state(|s| {
            f.debug_struct("CounterSession")
                .field("mode", &s.mode)
                .field("table", &s.table)
                .field("queue", &s.queue.current())
                .field("busy", &self.is_busy())
                .finish_non_exhaustive()
        })
    }
}

/// One history row: `Queue 23  09:05`.
pub fn format_history_entry(record: &BillRecord, zone: &OperatingZone) -> String {
    format!(
        "{} {}  {}",
        mode_caption(record.mode),
        record.number,
        zone.clock_label(&record.issued_at)
    )
}

// =============================================================================
// Unit Tests
// =============================================================================
