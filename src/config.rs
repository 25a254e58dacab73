use std::env;
use std::time::Duration;

use crate::models::{Symbol, WatchlistEntry};

/// Runtime configuration, resolved once at startup from the environment
/// (after `dotenvy` has loaded `.env`). Everything has a sensible default so
/// the binary runs against a local backend out of the box.
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_url: String,
    pub market_url: String,
    pub poll_interval: Duration,
    pub chart_settle: Duration,
    pub watchlist: Vec<WatchlistEntry>,
}

impl Config {
    pub fn from_env() -> Self {
        let backend_url = env::var("DASHBOARD_BACKEND_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:5000".to_string());
        let market_url =
            env::var("BINANCE_BASE_URL").unwrap_or_else(|_| "https://api.binance.com".to_string());
        let poll_secs = parse_poll_secs(env::var("PRICE_POLL_SECS").ok().as_deref());
        let settle_ms = env::var("CHART_SETTLE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(1500);

        Self {
            backend_url,
            market_url,
            poll_interval: Duration::from_secs(poll_secs),
            chart_settle: Duration::from_millis(settle_ms),
            watchlist: default_watchlist(),
        }
    }
}

/// A zero period would panic the interval timer, so zero and garbage both
/// fall back to the default.
fn parse_poll_secs(raw: Option<&str>) -> u64 {
    raw.and_then(|v| v.parse().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(15)
}

/// The fixed ten-asset watchlist shown in the live ticker. Immutable for the
/// lifetime of the process.
pub fn default_watchlist() -> Vec<WatchlistEntry> {
    const COINS: [(&str, &str, &str); 10] = [
        ("BTCUSDT", "Bitcoin", "/static/btc.png"),
        ("ETHUSDT", "Ethereum", "/static/eth.png"),
        ("BNBUSDT", "BNB", "/static/bnb.png"),
        ("XRPUSDT", "XRP", "/static/xrp.png"),
        ("ADAUSDT", "Cardano", "/static/car.jpg"),
        ("DOGEUSDT", "Dogecoin", "/static/doge.png"),
        ("SOLUSDT", "Solana", "/static/sol.webp"),
        ("MATICUSDT", "Polygon", "/static/mac.jpeg"),
        ("DOTUSDT", "Polkadot", "/static/dot.png"),
        ("LTCUSDT", "Litecoin", "/static/lite.webp"),
    ];

    COINS
        .iter()
        .map(|(symbol, name, logo)| WatchlistEntry {
            symbol: Symbol::new(symbol).expect("watchlist symbols are non-empty"),
            display_name: name.to_string(),
            logo_ref: logo.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_or_garbage_poll_period_falls_back_to_default() {
        assert_eq!(parse_poll_secs(Some("0")), 15);
        assert_eq!(parse_poll_secs(Some("abc")), 15);
        assert_eq!(parse_poll_secs(Some("-5")), 15);
        assert_eq!(parse_poll_secs(None), 15);
        assert_eq!(parse_poll_secs(Some("30")), 30);
    }

    #[test]
    fn watchlist_has_ten_fixed_entries() {
        let list = default_watchlist();
        assert_eq!(list.len(), 10);
        assert_eq!(list[0].symbol.as_str(), "BTCUSDT");
        assert_eq!(list[9].display_name, "Litecoin");
    }
}
