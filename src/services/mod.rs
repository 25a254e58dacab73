pub use account_service::AccountService;
pub use chart_renderer::{ChartRenderer, ChartWidget, EmbeddedChartWidget};
pub use prediction_service::PredictionService;
pub use price_feed_service::{PriceFeedHandle, PriceFeedService};
pub use trade_service::{QuantityPrompt, TradeService};

pub mod account_service;
pub mod chart_renderer;
pub mod prediction_service;
pub mod price_feed_service;
pub mod trade_service;
