//! # Terminal Error Type
//!
//! Everything that can stop the terminal from starting or keep it from
//! restoring the screen. Operator mistakes and store failures during a
//! session never reach this type; they become a `Status` instead.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TerminalConfig::load ── AppError::Config                               │
//! │  logging::init ───────── AppError::Logging                              │
//! │  Database::new ───────── AppError::Database  (DbError)                  │
//! │  Catalog::load(Strict) ─ AppError::Catalog   (CatalogError)             │
//! │  crossterm / ratatui ─── AppError::Terminal  (io::Error)                │
//! │                               │                                         │
//! │                               ▼                                         │
//! │                main: eprintln!, ExitCode::FAILURE                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use depot_core::CatalogError;
use depot_db::DbError;
use thiserror::Error;

/// Fatal terminal errors.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration file unreadable or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Database could not be opened or initialized.
    #[error("database error: {0}")]
    Database(#[from] DbError),

    /// Catalog incomplete at startup.
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Terminal could not be set up, drawn or restored.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    /// Log file or filter could not be set up.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }
}

/// Result type for terminal operations.
pub type AppResult<T> = Result<T, AppError>;
