//! # Command Line
//!
//! ## Usage
//!
//! ```bash
//! # Print a dine-in bill for table 4
//! queuebill print --dine-in 4
//!
//! # Print the next takeaway bill, record only
//! queuebill print --takeaway --no-print
//!
//! # Preview the next takeaway bill in the terminal, or as HTML
//! queuebill preview --takeaway
//! queuebill preview --html preview.html
//!
//! # Recent bills and the queue
//! queuebill history --count 20
//! queuebill queue
//!
//! # Interactive counter
//! queuebill counter
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use queuebill_core::receipt::{html, text};
use queuebill_core::BillMode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::config::CounterConfig;
use crate::error::{CounterError, CounterResult};
use crate::session::{format_history_entry, CounterSession, PrintReport};
use crate::Counter;

/// Queuebill - dine-in and takeaway bills for the counter
#[derive(Parser, Debug)]
#[command(name = "queuebill")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overrides the config
    #[arg(long, global = true, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Keep bills in memory only (nothing survives the process)
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which bill a one-shot command works on.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct BillSelection {
    /// Dine-in bill for this table (1-10)
    #[arg(long, value_name = "TABLE")]
    pub dine_in: Option<u32>,

    /// Next takeaway bill from the queue
    #[arg(long)]
    pub takeaway: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a bill and print it
    Print {
        #[command(flatten)]
        bill: BillSelection,

        /// Record the bill without printing
        #[arg(long)]
        no_print: bool,
    },

    /// Show a bill without recording it
    Preview {
        #[command(flatten)]
        bill: BillSelection,

        /// Write the HTML preview page to a file instead
        #[arg(long, value_name = "FILE")]
        html: Option<PathBuf>,
    },

    /// List recent bills
    History {
        /// How many bills to show (defaults to the config)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Show the next takeaway queue number
    Queue,

    /// Interactive counter session
    Counter,
}

impl Cli {
    /// Loads the config and applies command-line overrides.
    pub fn load_config(&self) -> CounterResult<CounterConfig> {
        let mut config = CounterConfig::load(self.config.clone())?;
        if let Some(db) = &self.db {
            config.store.database_path = Some(db.clone());
        }
        if self.memory {
            config.store.backend = crate::config::StoreBackend::Memory;
        }
        Ok(config)
    }
}

// =============================================================================
// One-shot Commands
// =============================================================================

/// Runs a parsed command line.
pub async fn run(cli: Cli) -> CounterResult<()> {
    let config = cli.load_config()?;
    let print_pages = !matches!(cli.command, Commands::Print { no_print: true, .. });
    let counter = Counter::open(config, print_pages).await?;

    let result = dispatch(&counter, cli.command).await;
    counter.close().await;
    result
}

async fn dispatch(counter: &Counter, command: Commands) -> CounterResult<()> {
    let session = &counter.session;
    let width = counter.config.print.text_width;

    match command {
        Commands::Print { bill, .. } => {
            session.start().await;
            apply_selection(session, bill)?;
            let report = session.print().await?;
            println!("{}", describe_report(&report));
        }
        Commands::Preview { bill, html: out } => {
            session.start().await;
            apply_selection(session, bill)?;
            let page = session.preview()?;
            match out {
                Some(path) => {
                    let bill = session.current_bill()?;
                    let title = format!("Preview {} {}", bill.mode(), bill.number());
                    tokio::fs::write(&path, html::render_page(&page, &title)).await?;
                    println!("Preview written to {}", path.display());
                }
                None => print!("{}", text::render_page(&page, width)),
            }
        }
        Commands::History { count } => {
            let count = count.unwrap_or(counter.config.history.count);
            let zone = counter.config.zone()?;
            let records = counter.logger.recent(count).await;
            if records.is_empty() {
                println!("No bills yet.");
            }
            for record in &records {
                println!("{}", format_history_entry(record, &zone));
            }
        }
        Commands::Queue => {
            println!("Next queue: {}", session.start().await);
        }
        Commands::Counter => {
            session.start().await;
            run_interactive(session, width).await?;
        }
    }

    Ok(())
}

fn apply_selection(session: &CounterSession, bill: BillSelection) -> CounterResult<()> {
    if let Some(table) = bill.dine_in {
        session.select_mode(BillMode::DineIn)?;
        session.select_table(table)?;
    } else if bill.takeaway {
        session.select_mode(BillMode::Takeaway)?;
    }
    Ok(())
}

fn describe_report(report: &PrintReport) -> String {
    let mut line = format!(
        "Recorded {} {} ({})",
        report.record.mode, report.record.number, report.record.id
    );
    match (&report.output, &report.print_error) {
        (_, Some(e)) => line.push_str(&format!("\nNot printed: {}", e)),
        (Some(path), None) => line.push_str(&format!("\nPrint page: {}", path.display())),
        (None, None) => {}
    }
    if report.record.mode.uses_queue() {
        line.push_str(&format!("\nNext queue: {}", report.next_queue));
    }
    line
}

// =============================================================================
// Interactive Counter
// =============================================================================

/// A line typed at the interactive counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterCommand {
    DineIn(Option<u32>),
    Takeaway,
    Print,
    Reset,
    History,
    Preview,
    Queue,
    Help,
    Quit,
}

impl std::str::FromStr for CounterCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_lowercase();
        let arg = words.next();
        if words.next().is_some() {
            return Err(format!("Too many arguments: {}", line.trim()));
        }

        let no_arg = |command: CounterCommand| match arg {
            Some(extra) => Err(format!("{} takes no argument, got {}", verb, extra)),
            None => Ok(command),
        };

        match verb.as_str() {
            "dine" | "table" | "d" => match arg {
                None => Ok(CounterCommand::DineIn(None)),
                Some(n) => n
                    .parse()
                    .map(|n| CounterCommand::DineIn(Some(n)))
                    .map_err(|_| format!("Not a table number: {}", n)),
            },
            "takeaway" | "t" => no_arg(CounterCommand::Takeaway),
            "print" | "p" => no_arg(CounterCommand::Print),
            "reset" => no_arg(CounterCommand::Reset),
            "history" | "h" => no_arg(CounterCommand::History),
            "preview" | "v" => no_arg(CounterCommand::Preview),
            "queue" | "q" => no_arg(CounterCommand::Queue),
            "help" | "?" => no_arg(CounterCommand::Help),
            "quit" | "exit" => no_arg(CounterCommand::Quit),
            "" => Err("Empty command".to_string()),
            other => Err(format!("Unknown command: {} (try help)", other)),
        }
    }
}

const HELP: &str = "\
  dine [N]   dine-in, optionally pick table N (1-10)
  takeaway   takeaway, numbered from the queue
  print      record and print the current bill
  preview    show the current bill
  reset      set the next queue number back to 1
  queue      show the next queue number
  history    recent bills
  quit       leave the counter";

fn status_line(session: &CounterSession) -> String {
    match session.mode() {
        BillMode::DineIn => format!("[dine-in] table {}", session.table()),
        BillMode::Takeaway => format!("[takeaway] queue {}", session.current_queue()),
    }
}

/// Applies one command. Returns `false` when the operator quits.
pub async fn apply_command(
    session: &CounterSession,
    command: CounterCommand,
    width: usize,
) -> CounterResult<bool> {
    match command {
        CounterCommand::DineIn(table) => {
            session.select_mode(BillMode::DineIn)?;
            if let Some(table) = table {
                session.select_table(table)?;
            }
        }
        CounterCommand::Takeaway => session.select_mode(BillMode::Takeaway)?,
        CounterCommand::Print => {
            let report = session.print().await?;
            println!("{}", describe_report(&report));
        }
        CounterCommand::Reset => {
            println!("Next queue: {}", session.reset_queue()?);
        }
        CounterCommand::History => {
            session.refresh_history().await;
            let lines = session.history_lines();
            if lines.is_empty() {
                println!("No bills yet.");
            }
            for line in lines {
                println!("  {}", line);
            }
        }
        CounterCommand::Preview => {
            let layout = session.preview()?;
            if let Some(tile) = layout.tiles.first() {
                print!("{}", text::render_receipt(&tile.receipt, width));
            }
        }
        CounterCommand::Queue => println!("Next queue: {}", session.current_queue()),
        CounterCommand::Help => println!("{}", HELP),
        CounterCommand::Quit => return Ok(false),
    }
    Ok(true)
}

/// Line-driven counter on stdin until `quit` or end of input.
pub async fn run_interactive(session: &CounterSession, width: usize) -> CounterResult<()> {
    println!("Queuebill counter. Type help for commands.");
    println!("{}", status_line(session));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<CounterCommand>() {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        debug!(?command, "Counter command");

        match apply_command(session, command, width).await {
            Ok(true) if command == CounterCommand::Print => {
                if let Some(toast) = session.toast() {
                    println!("{}", toast);
                }
            }
            Ok(true) => {}
            Ok(false) => break,
            Err(e @ (CounterError::Store(_) | CounterError::Busy | CounterError::Validation(_))) => {
                println!("{}", e);
            }
            Err(e) => return Err(e),
        }
        println!("{}", status_line(session));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_print() {
        let cli = Cli::try_parse_from(["queuebill", "--memory", "print", "--dine-in", "4"]).unwrap();
        assert!(cli.memory);
        match cli.command {
            Commands::Print { bill, no_print } => {
                assert_eq!(bill.dine_in, Some(4));
                assert!(!bill.takeaway);
                assert!(!no_print);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_dine_in_and_takeaway_conflict() {
        let result = Cli::try_parse_from(["queuebill", "print", "--dine-in", "4", "--takeaway"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_counter_commands() {
        assert_eq!("dine 4".parse::<CounterCommand>(), Ok(CounterCommand::DineIn(Some(4))));
        assert_eq!("DINE".parse::<CounterCommand>(), Ok(CounterCommand::DineIn(None)));
        assert_eq!("  takeaway ".parse::<CounterCommand>(), Ok(CounterCommand::Takeaway));
        assert_eq!("p".parse::<CounterCommand>(), Ok(CounterCommand::Print));
        assert_eq!("exit".parse::<CounterCommand>(), Ok(CounterCommand::Quit));
        assert!("dine four".parse::<CounterCommand>().is_err());
        assert!("print now".parse::<CounterCommand>().is_err());
        assert!("deliver".parse::<CounterCommand>().is_err());
    }

    #[tokio::test]
    async fn test_apply_commands() {
        let counter = Counter::in_memory(CounterConfig::default());
        let session = &counter.session;
        session.start().await;

        assert!(apply_command(session, CounterCommand::Takeaway, 30).await.unwrap());
        assert!(apply_command(session, CounterCommand::Print, 30).await.unwrap());
        assert_eq!(session.current_queue(), 2);

        assert!(apply_command(session, CounterCommand::DineIn(Some(3)), 30).await.unwrap());
        assert_eq!(session.table(), 3);
        assert!(apply_command(session, CounterCommand::DineIn(Some(12)), 30).await.is_err());

        assert!(apply_command(session, CounterCommand::Reset, 30).await.unwrap());
        assert_eq!(session.current_queue(), 1);
        assert!(!apply_command(session, CounterCommand::Quit, 30).await.unwrap());
    }
}
