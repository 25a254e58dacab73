use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::error::ApiError;
use crate::models::{Symbol, TradeAction, TradeOrder};
use crate::remote::BackendApi;
use crate::services::AccountService;
use crate::view::{DashboardView, NoticeKind};

const INVALID_QUANTITY_NOTICE: &str = "Enter a valid positive quantity.";
const TRADE_FALLBACK: &str = "Trade failed";
const TRADE_GENERIC: &str = "Trade failed. Try again later.";

/// Collects the quantity for an order. A suspend point from the workflow's
/// view, blocking from the user's; `None` means the user cancelled and
/// nothing further happens. Implementations must not block the runtime
/// worker (the stdin one goes through `spawn_blocking`).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuantityPrompt: Send + Sync {
    async fn request_quantity(&self, action: TradeAction) -> Option<String>;
}

/// Places buy/sell orders and keeps the displayed balance in sync with the
/// backend afterwards.
pub struct TradeService {
    backend: Arc<dyn BackendApi>,
    account: Arc<AccountService>,
    prompt: Arc<dyn QuantityPrompt>,
    view: Arc<DashboardView>,
}

impl TradeService {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        account: Arc<AccountService>,
        prompt: Arc<dyn QuantityPrompt>,
        view: Arc<DashboardView>,
    ) -> Self {
        Self {
            backend,
            account,
            prompt,
            view,
        }
    }

    pub async fn place_order(&self, action: TradeAction, symbol: &Symbol) {
        let Some(raw) = self.prompt.request_quantity(action).await else {
            // Cancelled at the prompt: no network call, no notice.
            return;
        };

        let quantity = match raw.trim().parse::<f64>() {
            Ok(quantity) if quantity.is_finite() && quantity > 0.0 => quantity,
            _ => {
                self.view
                    .push_notice(NoticeKind::InvalidInput, INVALID_QUANTITY_NOTICE);
                return;
            }
        };

        let order = TradeOrder {
            action,
            symbol: symbol.clone(),
            quantity,
        };
        info!("Placing order: {} {} {}", action, quantity, symbol);

        match self.backend.place_trade(&order).await {
            Ok(message) => {
                self.view.push_notice(NoticeKind::Confirmation, message);
                self.account.refresh().await;
            }
            Err(ApiError::Rejected { message }) => {
                let text = message.unwrap_or_else(|| TRADE_FALLBACK.to_string());
                self.view.push_notice(NoticeKind::OperationError, text);
            }
            Err(e) => {
                error!("Trade request failed: {}", e);
                self.view
                    .push_notice(NoticeKind::GenericFailure, TRADE_GENERIC);
            }
        }
    }
}
