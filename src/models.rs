use std::fmt;

use serde::{Deserialize, Serialize};

/// Ticker identifier as the backend and Binance know it, e.g. "BTCUSDT".
/// Opaque apart from being non-empty; always stored uppercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for display rows: "BTCUSDT" -> "BTC".
    pub fn display_ticker(&self) -> &str {
        self.0.strip_suffix("USDT").unwrap_or(&self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the fixed watchlist. Built once at startup, never mutated.
#[derive(Debug, Clone)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
    pub display_name: String,
    pub logo_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub day: u32,
    pub symbol: Symbol,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PredictionResult {
    pub symbol: String,
    pub day: u32,
    pub prediction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("buy"),
            Self::Sell => f.write_str("sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeOrder {
    pub action: TradeAction,
    pub symbol: Symbol,
    pub quantity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct AccountBalance {
    pub balance: f64,
}

/// Latest 24h stats for one watchlist symbol. Replaced wholesale every
/// refresh cycle, never merged with the previous snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TickerSnapshot {
    pub symbol: Symbol,
    pub last_price: f64,
    pub change_percent: f64,
}

/// Configuration handed to the third-party chart widget. The widget's own
/// initialization is asynchronous and opaque to us.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub symbol: String,
    pub interval: String,
    pub theme: String,
    pub width: String,
    pub height: u32,
}

pub const CHART_VENUE_PREFIX: &str = "BINANCE:";

impl ChartSpec {
    pub fn for_symbol(symbol: &Symbol) -> Self {
        Self {
            symbol: format!("{CHART_VENUE_PREFIX}{symbol}"),
            interval: "30".to_string(),
            theme: "dark".to_string(),
            width: "95%".to_string(),
            height: 500,
        }
    }
}

/// A widget instance currently occupying the chart container.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartMount {
    pub spec: ChartSpec,
}
