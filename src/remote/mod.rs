pub mod backend_client;
pub mod market_client;

pub use backend_client::{BackendApi, DashboardBackend};
pub use market_client::{BinanceMarket, MarketData};
