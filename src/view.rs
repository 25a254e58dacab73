use std::fmt::Write as _;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::models::{ChartMount, TickerSnapshot, WatchlistEntry};

/// Ticket for one intended write to a [`RenderTarget`]. Tickets are issued in
/// request order; a completion may only land if no later-issued completion
/// has landed first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteTicket(u64);

struct Slot<T> {
    issued: u64,
    applied: u64,
    content: Option<T>,
}

/// A single shared display slot. Concurrent async operations all write to
/// the same slot; the sequence numbers make "last writer wins" deterministic
/// by request order instead of by completion order, so a slow stale result
/// cannot clobber a newer one.
pub struct RenderTarget<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> RenderTarget<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot {
                issued: 0,
                applied: 0,
                content: None,
            }),
        }
    }

    /// Reserve the next sequence number. Call this when the async operation
    /// is issued, not when it completes.
    pub fn begin(&self) -> WriteTicket {
        let mut slot = self.slot.lock().unwrap();
        slot.issued += 1;
        WriteTicket(slot.issued)
    }

    /// Apply the result of the operation `ticket` was taken for. Returns
    /// false (and leaves the slot untouched) if a newer write already landed.
    pub fn commit(&self, ticket: WriteTicket, value: T) -> bool {
        let mut slot = self.slot.lock().unwrap();
        if ticket.0 <= slot.applied {
            return false;
        }
        slot.applied = ticket.0;
        slot.content = Some(value);
        true
    }

    pub fn get(&self) -> Option<T> {
        self.slot.lock().unwrap().content.clone()
    }
}

impl<T: Clone> Default for RenderTarget<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn from_change(change_percent: f64) -> Self {
        if change_percent >= 0.0 {
            Self::Up
        } else {
            Self::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// One rendered line of the live price list.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceRow {
    pub ticker: String,
    pub display_name: String,
    pub logo_ref: String,
    pub last_price: f64,
    pub change_percent: f64,
    pub direction: Direction,
}

impl PriceRow {
    pub fn new(entry: &WatchlistEntry, snapshot: &TickerSnapshot) -> Self {
        Self {
            ticker: snapshot.symbol.display_ticker().to_string(),
            display_name: entry.display_name.clone(),
            logo_ref: entry.logo_ref.clone(),
            last_price: snapshot.last_price,
            change_percent: snapshot.change_percent,
            direction: Direction::from_change(snapshot.change_percent),
        }
    }

    pub fn price_text(&self) -> String {
        format!("${:.2}", self.last_price)
    }

    pub fn change_text(&self) -> String {
        format!("{:.2}%", self.change_percent)
    }
}

/// User-visible notice categories. The category and its triggering condition
/// are part of the contract; presentation is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    InvalidInput,
    LoginRequired,
    OperationError,
    GenericFailure,
    Confirmation,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
    pub at: DateTime<Utc>,
}

/// All shared render targets of the dashboard page. One instance per page
/// lifetime, shared across every service.
pub struct DashboardView {
    pub balance: RenderTarget<String>,
    pub prediction: RenderTarget<String>,
    pub chart: RenderTarget<ChartMount>,
    pub prices: RenderTarget<Vec<PriceRow>>,
    trade_controls: AtomicBool,
    notices: Mutex<Vec<Notice>>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            balance: RenderTarget::new(),
            prediction: RenderTarget::new(),
            chart: RenderTarget::new(),
            prices: RenderTarget::new(),
            trade_controls: AtomicBool::new(false),
            notices: Mutex::new(Vec::new()),
        }
    }

    pub fn push_notice(&self, kind: NoticeKind, text: impl Into<String>) {
        self.notices.lock().unwrap().push(Notice {
            kind,
            text: text.into(),
            at: Utc::now(),
        });
    }

    pub fn last_notice(&self) -> Option<Notice> {
        self.notices.lock().unwrap().last().cloned()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn set_trade_controls_visible(&self, visible: bool) {
        self.trade_controls.store(visible, Ordering::SeqCst);
    }

    pub fn trade_controls_visible(&self) -> bool {
        self.trade_controls.load(Ordering::SeqCst)
    }

    /// Plain-text snapshot of every target, for the interactive loop.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        let balance = self.balance.get().unwrap_or_else(|| "-".to_string());
        writeln!(out, "Balance: {balance}").unwrap();
        if let Some(prediction) = self.prediction.get() {
            writeln!(out, "{prediction}").unwrap();
        }
        match self.chart.get() {
            Some(mount) => writeln!(out, "Chart: {} @{}m", mount.spec.symbol, mount.spec.interval),
            None => writeln!(out, "Chart: (empty)"),
        }
        .unwrap();
        writeln!(
            out,
            "Trade controls: {}",
            if self.trade_controls_visible() {
                "visible"
            } else {
                "hidden"
            }
        )
        .unwrap();
        for row in self.prices.get().unwrap_or_default() {
            writeln!(
                out,
                "  {:<6} {:<10} {:>12}  {:>8} ({})",
                row.ticker,
                row.display_name,
                row.price_text(),
                row.change_text(),
                row.direction.as_str()
            )
            .unwrap();
        }
        if let Some(notice) = self.last_notice() {
            writeln!(out, "Last notice: [{:?}] {}", notice.kind, notice.text).unwrap();
        }
        out
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stale_commit_is_discarded() {
        let target: RenderTarget<String> = RenderTarget::new();
        let first = target.begin();
        let second = target.begin();

        assert!(target.commit(second, "new".to_string()));
        assert!(!target.commit(first, "old".to_string()));
        assert_eq!(target.get().as_deref(), Some("new"));
    }

    #[test]
    fn commits_in_issue_order_both_land() {
        let target: RenderTarget<u32> = RenderTarget::new();
        let first = target.begin();
        let second = target.begin();

        assert!(target.commit(first, 1));
        assert!(target.commit(second, 2));
        assert_eq!(target.get(), Some(2));
    }

    #[test]
    fn direction_tags_zero_as_up() {
        assert_eq!(Direction::from_change(0.0), Direction::Up);
        assert_eq!(Direction::from_change(-0.01), Direction::Down);
    }

    #[test]
    fn notices_record_in_order() {
        let view = DashboardView::new();
        view.push_notice(NoticeKind::InvalidInput, "bad day");
        view.push_notice(NoticeKind::LoginRequired, "log in");

        let last = view.last_notice().unwrap();
        assert_eq!(last.kind, NoticeKind::LoginRequired);
        assert_eq!(view.notices().len(), 2);
    }
}
