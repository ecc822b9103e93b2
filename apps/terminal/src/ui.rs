//! # Terminal Rendering
//!
//! Draws one frame from a read-only view of the [`Session`].
//!
//! ## Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Corner Depot                               Cart: 3 items │ 41.00 EUR    │
//! ├────────────────────────────────┬────────────────────────────────────────┤
//! │ Catalog                        │ Cart                                   │
//! │  Crates                        │  1. 2 x Cola Crate (@ 17.00) = 34.00   │
//! │   1. Cola Crate     17.00 EUR  │  2. 1 x Empty Crate (@ -5.00) = -5.00  │
//! │  Bottles                       │                                        │
//! │   1. Cola Bottle     1.15 EUR  │                                        │
//! │  Empties (credit)              │  ─────────────                         │
//! │   1. Empty Crate     5.00 EUR  │  Total: 29.00 EUR                      │
//! ├────────────────────────────────┴────────────────────────────────────────┤
//! │ c Crate  b Bottle  e Empty  r Remove  f Finish  x Cancel  l Reload  q   │
//! │ Enter quantity for Cola Crate: 2                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text is built by the plain `format_*` / `status_*` functions so it can be
//! tested without a terminal; colour comes from [`Severity`] only.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::keymap::LEGEND;
use depot_core::{Catalog, CatalogEntry, Category, DisplayLine, Session, Severity, Status};

/// Static values the renderer needs besides the session.
#[derive(Debug, Clone)]
pub struct View {
    pub store_name: String,
    pub currency: String,
}

// =============================================================================
// Frame
// =============================================================================

pub fn render(f: &mut Frame, session: &Session, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Catalog | Cart
            Constraint::Length(4), // Legend + status
        ])
        .split(f.size());

    render_header(f, chunks[0], session, view);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(chunks[1]);

    render_catalog(f, body[0], session.catalog(), view);
    render_cart(f, body[1], session, view);
    render_status_bar(f, chunks[2], session, view);
}

fn render_header(f: &mut Frame, area: Rect, session: &Session, view: &View) {
    let cart = session.cart();
    let summary = format!(
        "Cart: {} items │ {} {}",
        cart.total_quantity(),
        cart.compute_total(),
        view.currency
    );

    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", view.store_name),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("   "),
        Span::raw(summary),
    ]);

    let header = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_catalog(f: &mut Frame, area: Rect, catalog: &Catalog, view: &View) {
    let mut lines = Vec::new();

    for category in Category::ALL {
        lines.push(Line::from(Span::styled(
            section_title(category),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        let entries = catalog.entries(category);
        if entries.is_empty() {
            lines.push(Line::from(Span::styled(
                "   (none)",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for (i, entry) in entries.iter().enumerate() {
            lines.push(Line::from(format_catalog_entry(i + 1, entry, &view.currency)));
        }
    }

    let panel = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Catalog "));
    f.render_widget(panel, area);
}

fn render_cart(f: &mut Frame, area: Rect, session: &Session, view: &View) {
    let cart = session.cart();
    let mut lines: Vec<Line> = if cart.is_empty() {
        vec![Line::from(Span::styled(
            " Cart is empty",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        cart.display_lines()
            .iter()
            .map(|line| Line::from(format_cart_line(line, &view.currency)))
            .collect()
    };

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Total: {} {}", cart.compute_total(), view.currency),
        Style::default().add_modifier(Modifier::BOLD),
    )));

    let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Cart "));
    f.render_widget(panel, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, session: &Session, view: &View) {
    let mut legend = Vec::new();
    for (key, label) in LEGEND {
        legend.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(Color::Black).bg(Color::Gray),
        ));
        legend.push(Span::raw(format!(" {}  ", label)));
    }

    let (text, severity) = status_line(session, &view.currency);
    let status = Line::from(Span::styled(format!(" {}", text), severity_style(severity)));

    let bar = Paragraph::new(vec![Line::from(legend), status])
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: false });
    f.render_widget(bar, area);
}

pub fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Info => Style::default(),
        Severity::Warning => Style::default().fg(Color::Black).bg(Color::Yellow),
        Severity::Error => Style::default().fg(Color::White).bg(Color::Red),
    }
}

// =============================================================================
// Text
// =============================================================================

fn section_title(category: Category) -> &'static str {
    match category {
        Category::Crate => " Crates",
        Category::Bottle => " Bottles",
        Category::Empty => " Empties (credit)",
    }
}

/// `"  1. Cola Crate  17.00 EUR"`; empties show the credit.
pub fn format_catalog_entry(number: usize, entry: &CatalogEntry, currency: &str) -> String {
    match entry.category {
        Category::Empty => format!(
            "  {}. {}  {} {}",
            number, entry.display_name, entry.unit_base_price, currency
        ),
        Category::Crate | Category::Bottle => format!(
            "  {}. {}  {} {} (incl. {} deposit)",
            number, entry.display_name, entry.unit_total_price, currency, entry.unit_deposit
        ),
    }
}

/// `" 1. 3 x Cola Crate (@ 17.00) = 51.00 EUR"`
pub fn format_cart_line(line: &DisplayLine, currency: &str) -> String {
    format!(
        " {}. {} x {} (@ {}) = {} {}",
        line.index, line.quantity, line.name, line.unit_total_price, line.line_total, currency
    )
}

/// The bottom status line and its severity.
///
/// Precedence: entry prompt, quit confirmation, last status, cash balance.
pub fn status_line(session: &Session, currency: &str) -> (String, Severity) {
    if let Some(prompt) = session.prompt() {
        return (prompt, Severity::Info);
    }

    if session.is_quit_pending() {
        return (
            "Cart not empty. Press q again to quit, or any other key to cancel.".to_string(),
            Severity::Warning,
        );
    }

    if let Some(status) = session.status() {
        return (status_text(status, currency), status.severity());
    }

    match session.cash() {
        Some(cash) => (format!("Cash: {} {}", cash, currency), Severity::Info),
        None => (String::new(), Severity::Info),
    }
}

/// Operator wording for a status.
pub fn status_text(status: &Status, currency: &str) -> String {
    match status {
        Status::Ready { cash } => format!("Store Ready. Cash: {} {}", cash, currency),
        Status::Input(e) => format!("Error: {}", e),
        Status::Cart(e) => format!("Error: {}", e),
        Status::UnknownCommand(ch) => format!("Unknown command '{}'", ch),
        Status::CartEmpty => "Cart is empty, nothing to remove.".to_string(),
        Status::NothingToFinish => "Cart is empty, nothing to finish.".to_string(),
        Status::CartAlreadyEmpty => "Cart is already empty.".to_string(),
        Status::InputCancelled => "Input cancelled.".to_string(),
        Status::QuitCancelled => "Quit cancelled.".to_string(),
        Status::Added {
            name,
            quantity,
            line_quantity,
        } => format!(
            "Added {} x {} ({} in cart).",
            quantity, name, line_quantity
        ),
        Status::Removed { name, quantity } => format!("Removed {} x {}.", quantity, name),
        Status::TransactionCancelled => "Transaction cancelled.".to_string(),
        Status::Committed { total, balance, .. } => format!(
            "Transaction finished. Total: {} {}. Cash: {} {}.",
            total, currency, balance, currency
        ),
        Status::PersistenceFailed { reason } => {
            format!("Error: transaction not saved, cart kept. {}", reason)
        }
        Status::PartialCommit {
            transaction_id,
            total,
            reason,
        } => format!(
            "Error: transaction {} saved (total {} {}) but cash was not updated. {}",
            transaction_id, total, currency, reason
        ),
        Status::CatalogReloaded { entries } => format!("Catalog reloaded ({} entries).", entries),
        Status::CatalogReloadFailed { reason } => {
            format!("Error: catalog reload failed, keeping previous catalog. {}", reason)
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use depot_core::{EmptyDefinition, FieldPolicy, InputError, Key, Money, ProductDefinition};
    use ratatui::{backend::TestBackend, Terminal};
    use rust_decimal_macros::dec;

    fn catalog() -> Catalog {
        let products = vec![ProductDefinition {
            name: "Cola".to_string(),
            crate_price: Some("12.00".to_string()),
            crate_deposit: Some("5.00".to_string()),
            bottle_price: Some("1.00".to_string()),
            bottle_deposit: Some("0.15".to_string()),
        }];
        let empties = vec![EmptyDefinition {
            name: "Empty Crate".to_string(),
            deposit_value: Some("5.00".to_string()),
        }];
        Catalog::build(&products, &empties, FieldPolicy::Strict).unwrap()
    }

    fn press(session: &mut Session, keys: &[Key]) {
        for key in keys {
            session.handle_key(*key);
        }
    }

    #[test]
    fn test_catalog_entry_text() {
        let catalog = catalog();
        assert_eq!(
            format_catalog_entry(1, &catalog.crates()[0], "EUR"),
            "  1. Cola Crate  17.00 EUR (incl. 5.00 deposit)"
        );
        assert_eq!(
            format_catalog_entry(1, &catalog.empties()[0], "EUR"),
            "  1. Empty Crate  5.00 EUR"
        );
    }

    #[test]
    fn test_cart_line_text() {
        let mut session = Session::new(catalog());
        press(
            &mut session,
            &[Key::SelectCrate, Key::Char('1'), Key::Confirm, Key::Char('3'), Key::Confirm],
        );

        let lines = session.cart().display_lines();
        assert_eq!(
            format_cart_line(&lines[0], "EUR"),
            " 1. 3 x Cola Crate (@ 17.00) = 51.00 EUR"
        );
    }

    #[test]
    fn test_status_line_precedence() {
        let mut session = Session::with_cash(catalog(), Money::new(dec!(100.00)));
        assert_eq!(
            status_line(&session, "EUR"),
            ("Store Ready. Cash: 100.00 EUR".to_string(), Severity::Info)
        );

        press(&mut session, &[Key::SelectCrate, Key::Char('1')]);
        assert_eq!(status_line(&session, "EUR").0, "Enter Crate #: 1");

        press(&mut session, &[Key::Confirm, Key::Char('2'), Key::Confirm, Key::Quit]);
        let (text, severity) = status_line(&session, "EUR");
        assert!(text.starts_with("Cart not empty"));
        assert_eq!(severity, Severity::Warning);
    }

    #[test]
    fn test_error_status_text() {
        let status = Status::Input(InputError::OutOfRange { value: 9, max: 2 });
        assert_eq!(status_text(&status, "EUR"), "Error: number 9 out of range (1-2)");
        assert_eq!(severity_style(status.severity()).bg, Some(Color::Red));
    }

    #[test]
    fn test_committed_text() {
        let status = Status::Committed {
            transaction_id: "t-1".to_string(),
            total: Money::new(dec!(51.00)),
            balance: Money::new(dec!(151.00)),
        };
        assert_eq!(
            status_text(&status, "EUR"),
            "Transaction finished. Total: 51.00 EUR. Cash: 151.00 EUR."
        );
    }

    #[test]
    fn test_render_smoke() {
        let mut session = Session::with_cash(catalog(), Money::new(dec!(100.00)));
        press(
            &mut session,
            &[Key::SelectEmpty, Key::Char('1'), Key::Confirm, Key::Char('2'), Key::Confirm],
        );
        let view = View {
            store_name: "Corner Depot".to_string(),
            currency: "EUR".to_string(),
        };

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| render(f, &session, &view)).unwrap();
    }
}
