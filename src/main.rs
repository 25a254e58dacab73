use std::io::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use dotenvy::dotenv;
use tracing::info;

use crate::config::Config;
use crate::logger::setup_logger;
use crate::models::{Symbol, TradeAction};
use crate::remote::{BackendApi, BinanceMarket, DashboardBackend, MarketData};
use crate::services::{
    AccountService, ChartRenderer, ChartWidget, EmbeddedChartWidget, PredictionService,
    PriceFeedService, QuantityPrompt, TradeService,
};
use crate::view::{DashboardView, NoticeKind};

mod config;
mod error;
mod logger;
mod models;
mod remote;
mod services;
mod view;

/// Interactive stdin prompt for order quantities. The user answers before
/// anything else happens; the blocking read runs off the runtime workers.
struct StdinPrompt;

#[async_trait]
impl QuantityPrompt for StdinPrompt {
    async fn request_quantity(&self, action: TradeAction) -> Option<String> {
        tokio::task::spawn_blocking(move || {
            print!("Enter quantity to {action} (empty to cancel): ");
            std::io::stdout().flush().ok()?;

            let mut buf = String::new();
            std::io::stdin().read_line(&mut buf).ok()?;
            let trimmed = buf.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .await
        .ok()
        .flatten()
    }
}

async fn read_command_line() -> Option<String> {
    tokio::task::spawn_blocking(|| {
        let mut buf = String::new();
        match std::io::stdin().read_line(&mut buf) {
            Ok(0) => None, // EOF
            Ok(_) => Some(buf),
            Err(_) => None,
        }
    })
    .await
    .ok()
    .flatten()
}

fn parse_symbol(view: &DashboardView, raw: Option<&str>) -> Option<Symbol> {
    // The page's symbol selector defaults to BTCUSDT.
    let raw = raw.unwrap_or("BTCUSDT");
    match Symbol::new(raw) {
        Some(symbol) => Some(symbol),
        None => {
            view.push_notice(NoticeKind::InvalidInput, "Please choose a symbol.");
            None
        }
    }
}

/// Print the notices pushed since `since`, so each command only echoes its
/// own outcome.
fn print_notices_since(view: &DashboardView, since: usize) {
    for notice in view.notices().into_iter().skip(since) {
        println!(
            "[{} {:?}] {}",
            notice.at.format("%H:%M:%S"),
            notice.kind,
            notice.text
        );
    }
}

const HELP: &str = "Commands:
  predict <day> [symbol]   request a price prediction
  buy [symbol]             place a buy order
  sell [symbol]            place a sell order
  balance                  re-fetch the account balance
  view                     print the dashboard
  notices                  list every notice shown so far
  help                     this text
  quit                     stop the price feed and exit";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_logger();
    dotenv().ok();
    info!("Dashboard starting up...");

    let config = Config::from_env();
    let view = Arc::new(DashboardView::new());

    let backend: Arc<dyn BackendApi> = Arc::new(DashboardBackend::new(config.backend_url.clone()));
    let market: Arc<dyn MarketData> = Arc::new(BinanceMarket::new(config.market_url.clone()));
    let widget: Arc<dyn ChartWidget> = Arc::new(EmbeddedChartWidget);
    let prompt: Arc<dyn QuantityPrompt> = Arc::new(StdinPrompt);

    let account = Arc::new(AccountService::new(backend.clone(), view.clone()));
    let chart = Arc::new(ChartRenderer::new(
        widget,
        view.clone(),
        config.chart_settle,
    ));
    let prediction = PredictionService::new(backend.clone(), chart, view.clone());
    let trade = TradeService::new(backend, account.clone(), prompt, view.clone());

    // Page load: show the balance and start the recurring ticker.
    account.refresh().await;
    let feed = Arc::new(PriceFeedService::new(
        market,
        config.watchlist.clone(),
        view.clone(),
    ));
    let feed_handle = feed.spawn(config.poll_interval);

    println!("{HELP}");
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = read_command_line().await else {
            break;
        };

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("predict") => {
                let seen = view.notices().len();
                let day = parts.next().unwrap_or("");
                let Some(symbol) = parse_symbol(&view, parts.next()) else {
                    print_notices_since(&view, seen);
                    continue;
                };
                prediction.predict(day, &symbol).await;
                print_notices_since(&view, seen);
                if view.trade_controls_visible() {
                    if let Some(summary) = view.prediction.get() {
                        println!("{summary}");
                    }
                }
            }
            Some(action @ ("buy" | "sell")) => {
                if !view.trade_controls_visible() {
                    println!("Run a prediction first; trade controls are hidden.");
                    continue;
                }
                let seen = view.notices().len();
                let action = if action == "buy" {
                    TradeAction::Buy
                } else {
                    TradeAction::Sell
                };
                let Some(symbol) = parse_symbol(&view, parts.next()) else {
                    print_notices_since(&view, seen);
                    continue;
                };
                trade.place_order(action, &symbol).await;
                print_notices_since(&view, seen);
            }
            Some("balance") => {
                account.refresh().await;
                println!(
                    "Balance: {}",
                    view.balance.get().unwrap_or_else(|| "-".to_string())
                );
            }
            Some("view") => print!("{}", view.render_text()),
            Some("notices") => {
                for notice in view.notices() {
                    println!(
                        "[{} {:?}] {}",
                        notice.at.format("%H:%M:%S"),
                        notice.kind,
                        notice.text
                    );
                }
            }
            Some("help") => println!("{HELP}"),
            Some("quit") | Some("exit") => break,
            Some(other) => println!("Unknown command: {other}"),
            None => {}
        }
    }

    feed_handle.stop().await;
    info!("Dashboard stopped.");
    Ok(())
}
