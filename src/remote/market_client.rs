use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{Symbol, TickerSnapshot};

/// External market-data source: 24h ticker stats keyed by symbol.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    async fn ticker_24h(&self, symbol: &Symbol) -> Result<TickerSnapshot, ApiError>;
}

/// Binance publishes its numbers as JSON strings.
#[derive(Debug, Deserialize)]
struct Ticker24hResponse {
    #[serde(rename = "lastPrice")]
    last_price: String,
    #[serde(rename = "priceChangePercent")]
    price_change_percent: String,
}

impl Ticker24hResponse {
    fn to_snapshot(&self, symbol: &Symbol) -> Result<TickerSnapshot, ApiError> {
        let last_price = self
            .last_price
            .parse::<f64>()
            .map_err(|_| ApiError::Malformed(format!("lastPrice: {:?}", self.last_price)))?;
        let change_percent = self.price_change_percent.parse::<f64>().map_err(|_| {
            ApiError::Malformed(format!(
                "priceChangePercent: {:?}",
                self.price_change_percent
            ))
        })?;

        Ok(TickerSnapshot {
            symbol: symbol.clone(),
            last_price,
            change_percent,
        })
    }
}

pub struct BinanceMarket {
    client: Client,
    base_url: String,
}

impl BinanceMarket {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("crypto_dashboard/0.1.0")
                .timeout(Duration::from_secs(10))
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
        }
    }
}

#[async_trait]
impl MarketData for BinanceMarket {
    async fn ticker_24h(&self, symbol: &Symbol) -> Result<TickerSnapshot, ApiError> {
        let response = self
            .client
            .get(format!("{}/api/v3/ticker/24hr", self.base_url))
            .query(&[("symbol", symbol.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Malformed(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let body = response.json::<Ticker24hResponse>().await?;
        body.to_snapshot(symbol)
    }
}
