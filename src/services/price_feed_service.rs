use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, info, warn};

use crate::models::WatchlistEntry;
use crate::remote::MarketData;
use crate::view::{DashboardView, PriceRow};

/// Recurring refresh of the live price list: one 24h-ticker fetch per
/// watchlist entry per cycle, sequentially, to bound the load we put on the
/// market-data source.
pub struct PriceFeedService {
    market: Arc<dyn MarketData>,
    watchlist: Vec<WatchlistEntry>,
    view: Arc<DashboardView>,
}

impl PriceFeedService {
    pub fn new(
        market: Arc<dyn MarketData>,
        watchlist: Vec<WatchlistEntry>,
        view: Arc<DashboardView>,
    ) -> Self {
        Self {
            market,
            watchlist,
            view,
        }
    }

    /// Run one full cycle. The committed row vector replaces the previous
    /// one wholesale, which is the clearing step: a symbol that failed this
    /// cycle simply has no row, and nothing from an earlier cycle survives.
    /// One entry's failure never aborts the rest of the cycle.
    pub async fn refresh_cycle(&self) {
        let ticket = self.view.prices.begin();
        let mut rows = Vec::with_capacity(self.watchlist.len());

        for entry in &self.watchlist {
            match self.market.ticker_24h(&entry.symbol).await {
                Ok(snapshot) => rows.push(PriceRow::new(entry, &snapshot)),
                Err(e) => warn!("Ticker fetch failed for {}: {}", entry.symbol, e),
            }
        }

        if !self.view.prices.commit(ticket, rows) {
            debug!("Discarding stale price cycle");
        }
    }

    /// Start the recurring loop: first cycle immediately, then one per
    /// period, indefinitely, no backoff. Each cycle runs as its own task, so
    /// a slow cycle may still be in flight when the next tick fires; the
    /// write ticketing decides which completion lands.
    pub fn spawn(self: Arc<Self>, period: Duration) -> PriceFeedHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            info!(
                "Starting price feed for {} symbols, period {:?}",
                self.watchlist.len(),
                period
            );
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let feed = self.clone();
                        tokio::spawn(async move { feed.refresh_cycle().await });
                    }
                    _ = stop_rx.changed() => {
                        info!("Price feed stopping");
                        break;
                    }
                }
            }
        });

        PriceFeedHandle { stop_tx, task }
    }
}

/// Teardown hook for the recurring loop, so a dropped view does not leak the
/// timer task.
pub struct PriceFeedHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl PriceFeedHandle {
    pub async fn stop(self) {
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_watchlist;
    use crate::error::ApiError;
    use crate::models::{Symbol, TickerSnapshot};
    use crate::remote::market_client::MockMarketData;
    use crate::view::Direction;

    fn snapshot_for(symbol: &Symbol, price: f64, change: f64) -> TickerSnapshot {
        TickerSnapshot {
            symbol: symbol.clone(),
            last_price: price,
            change_percent: change,
        }
    }

    #[tokio::test]
    async fn one_failed_entry_still_renders_the_other_nine() {
        let mut mock = MockMarketData::new();
        mock.expect_ticker_24h().times(10).returning(|symbol| {
            if symbol.as_str() == "BNBUSDT" {
                Err(ApiError::Malformed("boom".to_string()))
            } else {
                Ok(snapshot_for(symbol, 100.0, 1.5))
            }
        });

        let view = Arc::new(DashboardView::new());
        let feed = PriceFeedService::new(Arc::new(mock), default_watchlist(), view.clone());
        feed.refresh_cycle().await;

        let rows = view.prices.get().unwrap();
        assert_eq!(rows.len(), 9);
        assert!(rows.iter().all(|r| r.ticker != "BNB"));
        assert_eq!(rows[0].ticker, "BTC");
    }

    #[tokio::test]
    async fn cycle_replaces_rows_wholesale() {
        let mut mock = MockMarketData::new();
        let mut calls = 0u32;
        mock.expect_ticker_24h().times(20).returning(move |symbol| {
            calls += 1;
            // Cycle one (calls 1-10) fully succeeds; cycle two only for BTC.
            if calls <= 10 || symbol.as_str() == "BTCUSDT" {
                Ok(snapshot_for(symbol, 10.0, 0.0))
            } else {
                Err(ApiError::Malformed("down".to_string()))
            }
        });

        let view = Arc::new(DashboardView::new());
        let feed = PriceFeedService::new(Arc::new(mock), default_watchlist(), view.clone());

        feed.refresh_cycle().await;
        assert_eq!(view.prices.get().unwrap().len(), 10);

        feed.refresh_cycle().await;
        // Only BTC survived cycle two; all other rows from cycle one are gone.
        assert_eq!(view.prices.get().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn rows_carry_formatted_price_and_direction() {
        let mut mock = MockMarketData::new();
        mock.expect_ticker_24h()
            .times(10)
            .returning(|symbol| Ok(snapshot_for(symbol, 64250.114, -1.239)));

        let view = Arc::new(DashboardView::new());
        let feed = PriceFeedService::new(Arc::new(mock), default_watchlist(), view.clone());
        feed.refresh_cycle().await;

        let rows = view.prices.get().unwrap();
        assert_eq!(rows[0].price_text(), "$64250.11");
        assert_eq!(rows[0].change_text(), "-1.24%");
        assert_eq!(rows[0].direction, Direction::Down);
        assert_eq!(rows[0].display_name, "Bitcoin");
        assert_eq!(rows[0].logo_ref, "/static/btc.png");
    }

    #[tokio::test]
    async fn stop_ends_the_recurring_loop() {
        let mut mock = MockMarketData::new();
        mock.expect_ticker_24h()
            .returning(|symbol| Ok(snapshot_for(symbol, 1.0, 0.0)));

        let view = Arc::new(DashboardView::new());
        let feed = Arc::new(PriceFeedService::new(
            Arc::new(mock),
            default_watchlist(),
            view.clone(),
        ));

        let handle = feed.spawn(Duration::from_millis(5));
        time::sleep(Duration::from_millis(20)).await;
        handle.stop().await;
        assert!(view.prices.get().is_some());
    }
}
