//! # Session: Keystroke State Machine
//!
//! Owns the cart, the catalog and the current input mode. The terminal feeds
//! one [`Key`] at a time into [`Session::handle_key`] and performs whatever
//! [`Effect`] comes back.
//!
//! ## Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │            c / b / e                     Enter (valid #)                │
//! │   ┌──────┐ ──────────► ┌───────────────┐ ─────────────► ┌─────────────┐ │
//! │   │      │             │  Selecting    │                │  Awaiting   │ │
//! │   │      │ ◄────────── │  {category}   │                │  Quantity   │ │
//! │   │      │   Esc/cmd   └───────────────┘                │ {pending}   │ │
//! │   │ Idle │ ◄─────────────────────────────────────────── └─────────────┘ │
//! │   │      │           Enter (qty > 0) → add_or_merge, or Esc/cmd         │
//! │   │      │    r      ┌───────────────┐                                  │
//! │   │      │ ────────► │ RemovingItem  │ ── Enter (valid #) → remove ──┐  │
//! │   │      │ ◄──────── └───────────────┘                               │  │
//! │   │      │ ◄─────────────────────────────────────────────────────────┘  │
//! │   │      │    q (cart not empty)   ┌────────────────┐                   │
//! │   │      │ ──────────────────────► │ ConfirmingQuit │ ── q ──► Exit     │
//! │   └──────┘ ◄────── any other key ─ └────────────────┘                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Entry Rules
//! - Digits and `-` append to the buffer; Backspace removes the last one
//! - Enter with an empty buffer reports `EmptyInput` and keeps the buffer
//! - Any other entry error reports and clears the buffer, mode is kept
//! - Esc, or any command key, while entering cancels the entry and does
//!   NOT run the command
//!
//! The session never does I/O. Finish and reload return an [`Effect`]; the
//! event loop runs the store call and reports back through
//! [`Session::finish_commit`] or [`Session::replace_catalog`].

use tracing::{debug, warn};

use crate::cart::Cart;
use crate::catalog::{Catalog, CatalogEntry, Category};
use crate::commit::CommitReceipt;
use crate::error::{CartError, CatalogError, CommitError, InputError};
use crate::money::Money;
use crate::validation::{parse_entry, validate_quantity, validate_selection};

// =============================================================================
// Keys and Effects
// =============================================================================

/// One logical keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    SelectCrate,
    SelectBottle,
    SelectEmpty,
    RemoveItem,
    Finish,
    CancelTransaction,
    ReloadCatalog,
    Quit,
    Confirm,
    Cancel,
    Backspace,
    /// Any other character.
    Char(char),
}

impl Key {
    /// Keys that start an action from `Idle`.
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Key::SelectCrate
                | Key::SelectBottle
                | Key::SelectEmpty
                | Key::RemoveItem
                | Key::Finish
                | Key::CancelTransaction
                | Key::ReloadCatalog
                | Key::Quit
        )
    }
}

/// What the event loop must do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Commit the cart, then call `finish_commit`.
    Commit,
    /// Reload the catalog, then call `replace_catalog`.
    ReloadCatalog,
    Exit,
}

// =============================================================================
// Modes
// =============================================================================

/// An item chosen from a list, waiting for its quantity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSelection {
    pub category: Category,
    pub display_name: String,
    pub unit_base_price: Money,
    pub unit_deposit: Money,
    pub unit_total_price: Money,
}

impl From<&CatalogEntry> for PendingSelection {
    fn from(entry: &CatalogEntry) -> Self {
        PendingSelection {
            category: entry.category,
            display_name: entry.display_name.clone(),
            unit_base_price: entry.unit_base_price,
            unit_deposit: entry.unit_deposit,
            unit_total_price: entry.unit_total_price,
        }
    }
}

/// Input mode. Each entry mode carries its own buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Idle,
    /// Quit was pressed with items in the cart.
    ConfirmingQuit,
    Selecting {
        category: Category,
        buffer: String,
    },
    AwaitingQuantity {
        pending: PendingSelection,
        buffer: String,
    },
    RemovingItem {
        buffer: String,
    },
}

impl Mode {
    /// The entry buffer, if the mode has one.
    pub fn buffer(&self) -> Option<&str> {
        match self {
            Mode::Selecting { buffer, .. }
            | Mode::AwaitingQuantity { buffer, .. }
            | Mode::RemovingItem { buffer } => Some(buffer),
            Mode::Idle | Mode::ConfirmingQuit => None,
        }
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self {
            Mode::Selecting { buffer, .. }
            | Mode::AwaitingQuantity { buffer, .. }
            | Mode::RemovingItem { buffer } => Some(buffer),
            Mode::Idle | Mode::ConfirmingQuit => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Mode::Idle)
    }
}

// =============================================================================
// Status
// =============================================================================

/// How a status should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// The single status message shown to the operator.
///
/// Replaced by the next event. Wording is up to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ready { cash: Money },
    Input(InputError),
    Cart(CartError),
    UnknownCommand(char),
    /// remove-item with nothing in the cart.
    CartEmpty,
    NothingToFinish,
    CartAlreadyEmpty,
    InputCancelled,
    QuitCancelled,
    Added {
        name: String,
        quantity: i64,
        line_quantity: i64,
    },
    Removed {
        name: String,
        quantity: i64,
    },
    TransactionCancelled,
    Committed {
        transaction_id: String,
        total: Money,
        balance: Money,
    },
    PersistenceFailed {
        reason: String,
    },
    PartialCommit {
        transaction_id: String,
        total: Money,
        reason: String,
    },
    CatalogReloaded {
        entries: usize,
    },
    CatalogReloadFailed {
        reason: String,
    },
}

impl Status {
    pub fn severity(&self) -> Severity {
        match self {
            Status::Ready { .. }
            | Status::InputCancelled
            | Status::QuitCancelled
            | Status::Added { .. }
            | Status::Removed { .. }
            | Status::TransactionCancelled
            | Status::Committed { .. }
            | Status::CatalogReloaded { .. } => Severity::Info,

            Status::UnknownCommand(_)
            | Status::CartEmpty
            | Status::NothingToFinish
            | Status::CartAlreadyEmpty => Severity::Warning,

            Status::Input(_)
            | Status::Cart(_)
            | Status::PersistenceFailed { .. }
            | Status::PartialCommit { .. }
            | Status::CatalogReloadFailed { .. } => Severity::Error,
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The operator's session: catalog, cart, input mode and status.
#[derive(Debug, Clone, Default)]
pub struct Session {
    catalog: Catalog,
    cart: Cart,
    mode: Mode,
    status: Option<Status>,
    cash: Option<Money>,
}

impl Session {
    pub fn new(catalog: Catalog) -> Self {
        Session {
            catalog,
            ..Session::default()
        }
    }

    /// Starts a session showing the opening cash balance.
    pub fn with_cash(catalog: Catalog, cash: Money) -> Self {
        Session {
            catalog,
            status: Some(Status::Ready { cash }),
            cash: Some(cash),
            ..Session::default()
        }
    }

    // -------------------------------------------------------------------------
    // View accessors
    // -------------------------------------------------------------------------

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn buffer(&self) -> Option<&str> {
        self.mode.buffer()
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Last known cash balance.
    pub fn cash(&self) -> Option<Money> {
        self.cash
    }

    pub fn is_quit_pending(&self) -> bool {
        matches!(self.mode, Mode::ConfirmingQuit)
    }

    /// Entry prompt for the current mode, including the typed buffer.
    pub fn prompt(&self) -> Option<String> {
        match &self.mode {
            Mode::Idle | Mode::ConfirmingQuit => None,
            Mode::Selecting { category, buffer } => {
                Some(format!("Enter {} #: {}", category.label(), buffer))
            }
            Mode::AwaitingQuantity { pending, buffer } => Some(format!(
                "Enter quantity for {}: {}",
                pending.display_name, buffer
            )),
            Mode::RemovingItem { buffer } => Some(format!("Remove cart item #: {}", buffer)),
        }
    }

    // -------------------------------------------------------------------------
    // Keystrokes
    // -------------------------------------------------------------------------

    /// Processes one keystroke.
    pub fn handle_key(&mut self, key: Key) -> Effect {
        match std::mem::take(&mut self.mode) {
            Mode::ConfirmingQuit => {
                if key == Key::Quit {
                    debug!("Quit confirmed");
                    return Effect::Exit;
                }
                self.status = Some(Status::QuitCancelled);
                Effect::None
            }
            Mode::Idle => self.handle_idle(key),
            entry => {
                self.handle_entry(entry, key);
                Effect::None
            }
        }
    }

    fn handle_idle(&mut self, key: Key) -> Effect {
        match key {
            Key::SelectCrate => self.begin_selecting(Category::Crate),
            Key::SelectBottle => self.begin_selecting(Category::Bottle),
            Key::SelectEmpty => self.begin_selecting(Category::Empty),
            Key::RemoveItem => {
                if self.cart.is_empty() {
                    self.status = Some(Status::CartEmpty);
                } else {
                    self.status = None;
                    self.mode = Mode::RemovingItem {
                        buffer: String::new(),
                    };
                }
            }
            Key::Finish => {
                if self.cart.is_empty() {
                    self.status = Some(Status::NothingToFinish);
                } else {
                    return Effect::Commit;
                }
            }
            Key::CancelTransaction => {
                if self.cart.is_empty() {
                    self.status = Some(Status::CartAlreadyEmpty);
                } else {
                    debug!(lines = self.cart.len(), "Transaction cancelled");
                    self.cart.clear();
                    self.status = Some(Status::TransactionCancelled);
                }
            }
            Key::ReloadCatalog => return Effect::ReloadCatalog,
            Key::Quit => {
                if self.cart.is_empty() {
                    return Effect::Exit;
                }
                self.status = None;
                self.mode = Mode::ConfirmingQuit;
            }
            Key::Cancel => self.status = None,
            Key::Confirm | Key::Backspace => {}
            Key::Char(c) if c.is_ascii_digit() || c == '-' => {}
            Key::Char(c) => self.status = Some(Status::UnknownCommand(c)),
        }
        Effect::None
    }

    fn begin_selecting(&mut self, category: Category) {
        self.status = None;
        self.mode = Mode::Selecting {
            category,
            buffer: String::new(),
        };
    }

    fn handle_entry(&mut self, mut mode: Mode, key: Key) {
        match key {
            Key::Char(c) => {
                if c.is_ascii_digit() || c == '-' {
                    if let Some(buffer) = mode.buffer_mut() {
                        buffer.push(c);
                    }
                    self.status = None;
                }
                self.mode = mode;
            }
            Key::Backspace => {
                if let Some(buffer) = mode.buffer_mut() {
                    buffer.pop();
                }
                self.mode = mode;
            }
            Key::Confirm => self.confirm_entry(mode),
            // Esc, or a command key: drop the entry and stay idle
            _ => {
                debug!(?key, "Input cancelled");
                self.status = Some(Status::InputCancelled);
            }
        }
    }

    fn confirm_entry(&mut self, mode: Mode) {
        match mode {
            Mode::Selecting { category, buffer } => {
                let list = self.catalog.entries(category);
                let picked = parse_entry(&buffer)
                    .and_then(|n| validate_selection(n, list.len()))
                    .map(|index| PendingSelection::from(&list[index]));

                match picked {
                    Ok(pending) => {
                        self.status = None;
                        self.mode = Mode::AwaitingQuantity {
                            pending,
                            buffer: String::new(),
                        };
                    }
                    Err(e) => {
                        let buffer = self.reject_entry(buffer, e);
                        self.mode = Mode::Selecting { category, buffer };
                    }
                }
            }

            Mode::AwaitingQuantity { pending, buffer } => {
                match parse_entry(&buffer).and_then(validate_quantity) {
                    Ok(quantity) => self.add_pending(&pending, quantity),
                    Err(e) => {
                        let buffer = self.reject_entry(buffer, e);
                        self.mode = Mode::AwaitingQuantity { pending, buffer };
                    }
                }
            }

            Mode::RemovingItem { buffer } => {
                let order = self.cart.display_order();
                let index = parse_entry(&buffer).and_then(|n| {
                    validate_selection(n, order.len())?;
                    Ok(n)
                });

                match index {
                    Ok(n) => match self.cart.remove_by_display_index(n, &order) {
                        Ok(line) => {
                            debug!(name = %line.name, quantity = line.quantity, "Line removed");
                            self.status = Some(Status::Removed {
                                name: line.name,
                                quantity: line.quantity,
                            });
                        }
                        Err(e) => self.report_cart_error(e),
                    },
                    Err(e) => {
                        let buffer = self.reject_entry(buffer, e);
                        self.mode = Mode::RemovingItem { buffer };
                    }
                }
            }

            Mode::Idle | Mode::ConfirmingQuit => self.mode = mode,
        }
    }

    fn add_pending(&mut self, pending: &PendingSelection, quantity: i64) {
        let added = self.cart.add_or_merge(
            &pending.display_name,
            pending.unit_base_price,
            pending.unit_deposit,
            pending.unit_total_price,
            quantity,
        );

        match added {
            Ok(line_quantity) => {
                debug!(name = %pending.display_name, quantity, line_quantity, "Added to cart");
                self.status = Some(Status::Added {
                    name: pending.display_name.clone(),
                    quantity,
                    line_quantity,
                });
            }
            Err(e) => self.report_cart_error(e),
        }
    }

    /// Reports an entry error and returns the buffer to keep.
    fn reject_entry(&mut self, buffer: String, error: InputError) -> String {
        let kept = if error == InputError::EmptyInput {
            buffer
        } else {
            String::new()
        };
        self.status = Some(Status::Input(error));
        kept
    }

    fn report_cart_error(&mut self, error: CartError) {
        warn!(error = %error, "Cart operation aborted");
        self.status = Some(Status::Cart(error));
    }

    // -------------------------------------------------------------------------
    // Effect results
    // -------------------------------------------------------------------------

    /// Applies the outcome of an `Effect::Commit`.
    ///
    /// The cart is cleared on success and on `PartialCommit`, since the
    /// transaction is already recorded in both cases.
    pub fn finish_commit(&mut self, result: Result<CommitReceipt, CommitError>) {
        self.mode = Mode::Idle;
        self.status = Some(match result {
            Ok(receipt) => {
                self.cart.clear();
                self.cash = Some(receipt.balance);
                Status::Committed {
                    transaction_id: receipt.transaction.id().to_string(),
                    total: receipt.transaction.total(),
                    balance: receipt.balance,
                }
            }
            Err(CommitError::EmptyCart) => Status::NothingToFinish,
            Err(CommitError::Persistence(e)) => Status::PersistenceFailed {
                reason: e.to_string(),
            },
            Err(CommitError::PartialCommit {
                transaction_id,
                total,
                source,
            }) => {
                self.cart.clear();
                Status::PartialCommit {
                    transaction_id,
                    total,
                    reason: source.to_string(),
                }
            }
        });
    }

    /// Applies the outcome of an `Effect::ReloadCatalog`.
    ///
    /// The open cart keeps its copied prices either way.
    pub fn replace_catalog(&mut self, result: Result<Catalog, CatalogError>) {
        self.status = Some(match result {
            Ok(catalog) => {
                let entries = catalog.len();
                self.catalog = catalog;
                Status::CatalogReloaded { entries }
            }
            Err(e) => Status::CatalogReloadFailed {
                reason: e.to_string(),
            },
        });
    }

    /// Updates the displayed cash balance.
    pub fn set_cash(&mut self, cash: Money) {
        self.cash = Some(cash);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
