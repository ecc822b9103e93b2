//! # Depot Terminal Library
//!
//! Keyboard-driven point-of-sale terminal for the Depot beverage store.
//!
//! ## Module Organization
//! ```text
//! depot_terminal/
//! ├── lib.rs      ◄─── You are here (startup & event loop)
//! ├── config.rs   ◄─── depot.toml + DEPOT_* overrides
//! ├── error.rs    ◄─── AppError (fatal errors only)
//! ├── keymap.rs   ◄─── crossterm events → depot_core::Key
//! └── ui.rs       ◄─── ratatui rendering
//! ```
//!
//! ## Event Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draw(session) ◄──────────────────────────────────────────────────┐    │
//! │       │                                                           │    │
//! │       ▼                                                           │    │
//! │  crossterm::event::read ──► keymap::map_event ──► handle_key      │    │
//! │                                                     │             │    │
//! │             ┌──────────────┬────────────────────────┼──────┐      │    │
//! │             ▼              ▼                        ▼      ▼      │    │
//! │        Effect::None   Effect::Commit      Effect::Reload  Exit    │    │
//! │             │         committer.commit    Catalog::load           │    │
//! │             │         → finish_commit     (Lenient)               │    │
//! │             │              │              → replace_catalog       │    │
//! │             └──────────────┴──────────────────────┴───────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each keystroke, including any store call it triggers, completes before
//! the next key is read.

pub mod config;
pub mod error;
pub mod keymap;
pub mod ui;

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crossterm::{
    cursor, event, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use config::TerminalConfig;
use depot_core::{Catalog, Committer, Effect, FieldPolicy, Session};
use depot_db::{CashLedgerRepository, Database, DbConfig, TransactionRepository};
use error::{AppError, AppResult};
use ui::View;

/// Runs the terminal until the operator quits.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  1. Load configuration (file, then DEPOT_* environment)                │
/// │  2. Initialize logging to the log file                                 │
/// │  3. Open the database, run migrations                                  │
/// │  4. Create the cash ledger row if missing (opening balance)            │
/// │  5. Load the catalog strictly: a missing amount aborts startup         │
/// │  6. Enter the alternate screen and run the event loop                  │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run(config_path: Option<PathBuf>) -> AppResult<()> {
    let config = TerminalConfig::load(config_path)?;
    init_tracing(&config)?;

    info!(store = %config.store.name, "Starting Depot terminal");
    config.log_loaded();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(config))
}

async fn run_async(config: TerminalConfig) -> AppResult<()> {
    let db_path = config.database_path();
    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::config(format!("{}: {}", parent.display(), e)))?;
    }
    info!(?db_path, "Database path determined");

    let db = Database::new(DbConfig::new(db_path)).await?;

    let cash = db.cash().ensure_initialized(config.cash.opening_balance).await?;
    let catalog = Catalog::load(&db.catalog(), FieldPolicy::Strict).await?;
    info!(entries = catalog.len(), cash = %cash, "Catalog loaded");

    let mut app = App {
        session: Session::with_cash(catalog, cash),
        committer: Committer::new(db.transactions(), db.cash()),
        db: db.clone(),
        view: View {
            store_name: config.store.name.clone(),
            currency: config.store.currency.clone(),
        },
    };

    install_panic_hook();
    let res = match TerminalGuard::enter() {
        Ok(guard) => {
            let res = match Terminal::new(CrosstermBackend::new(io::stdout())) {
                Ok(mut terminal) => app.run_loop(&mut terminal).await,
                Err(e) => Err(e.into()),
            };
            drop(guard);
            res
        }
        Err(e) => Err(e),
    };

    db.close().await;

    if let Err(ref e) = res {
        error!(error = %e, "Terminal loop failed");
    } else {
        info!("Depot terminal stopped");
    }
    res
}

/// Event-loop state: the session plus the store handles its effects need.
struct App {
    session: Session,
    committer: Committer<TransactionRepository, CashLedgerRepository>,
    db: Database,
    view: View,
}

impl App {
    async fn run_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> AppResult<()> {
        loop {
            terminal.draw(|f| ui::render(f, &self.session, &self.view))?;

            let Some(key) = keymap::map_event(&event::read()?) else {
                continue;
            };

            let effect = self.session.handle_key(key);
            if self.apply(effect).await {
                return Ok(());
            }
        }
    }

    /// Performs an effect. Returns true on exit.
    async fn apply(&mut self, effect: Effect) -> bool {
        match effect {
            Effect::None => false,
            Effect::Commit => {
                let result = self.committer.commit(self.session.cart()).await;
                self.session.finish_commit(result);
                false
            }
            Effect::ReloadCatalog => {
                let result = Catalog::load(&self.db.catalog(), FieldPolicy::Lenient).await;
                self.session.replace_catalog(result);
                false
            }
            Effect::Exit => true,
        }
    }
}

// =============================================================================
// Terminal Restore
// =============================================================================

/// Raw mode plus the alternate screen. Dropping the guard restores the
/// terminal, including on early returns and unwinding.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> AppResult<TerminalGuard> {
        enable_raw_mode()?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(&mut io::stdout());
    }
}

/// Leaves raw mode and the alternate screen and shows the cursor.
/// Errors are ignored; calling it twice is harmless.
fn restore_terminal<W: Write>(out: &mut W) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen, cursor::Show);
}

/// Restores the terminal before the panic message is printed, so the
/// message lands on the normal screen.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(&mut io::stdout());
        previous(info);
    }));
}

/// Installs the tracing subscriber, writing to the configured log file.
///
/// ## Log Levels
/// - `RUST_LOG` wins when set
/// - otherwise `logging.filter` / `DEPOT_LOG_FILTER`
fn init_tracing(config: &TerminalConfig) -> AppResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.logging.filter)
            .map_err(|e| AppError::Logging(format!("{}: {}", config.logging.filter, e)))?,
    };

    let path = config.log_file_path();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::Logging(format!("{}: {}", parent.display(), e)))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|e| AppError::Logging(format!("{}: {}", path.display(), e)))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Logging(e.to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
