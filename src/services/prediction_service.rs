use std::sync::Arc;

use tracing::{debug, error, info};

use crate::error::ApiError;
use crate::models::{PredictionRequest, Symbol};
use crate::remote::BackendApi;
use crate::services::ChartRenderer;
use crate::view::{DashboardView, NoticeKind};

const INVALID_DAY_NOTICE: &str = "Please enter a valid day number!";
const LOGIN_NOTICE: &str = "Please log in to make a prediction!";
const PREDICT_FALLBACK: &str = "Something went wrong!";
const PREDICT_GENERIC: &str = "Something went wrong while predicting!";

/// The user-triggered prediction workflow. Strictly ordered: login check,
/// predict request, summary render, chart mount, trade-control reveal. Each
/// invocation is independent; no step retries.
pub struct PredictionService {
    backend: Arc<dyn BackendApi>,
    chart: Arc<ChartRenderer>,
    view: Arc<DashboardView>,
}

impl PredictionService {
    pub fn new(
        backend: Arc<dyn BackendApi>,
        chart: Arc<ChartRenderer>,
        view: Arc<DashboardView>,
    ) -> Self {
        Self {
            backend,
            chart,
            view,
        }
    }

    pub async fn predict(&self, day_input: &str, symbol: &Symbol) {
        let day = match day_input.trim().parse::<u32>() {
            Ok(day) if day > 0 => day,
            _ => {
                self.view
                    .push_notice(NoticeKind::InvalidInput, INVALID_DAY_NOTICE);
                return;
            }
        };

        match self.backend.check_login().await {
            Ok(true) => {}
            Ok(false) => {
                self.view.push_notice(NoticeKind::LoginRequired, LOGIN_NOTICE);
                return;
            }
            Err(e) => {
                error!("Login check failed: {}", e);
                self.view
                    .push_notice(NoticeKind::GenericFailure, PREDICT_GENERIC);
                return;
            }
        }

        let request = PredictionRequest {
            day,
            symbol: symbol.clone(),
        };
        let ticket = self.view.prediction.begin();

        let result = match self.backend.predict(&request).await {
            Ok(result) => result,
            Err(ApiError::Rejected { message }) => {
                let text = message.unwrap_or_else(|| PREDICT_FALLBACK.to_string());
                self.view.push_notice(NoticeKind::OperationError, text);
                return;
            }
            Err(e) => {
                error!("Predict request failed: {}", e);
                self.view
                    .push_notice(NoticeKind::GenericFailure, PREDICT_GENERIC);
                return;
            }
        };

        let summary = format!(
            "Predicted price for {} on day {} is ${:.2}",
            result.symbol, result.day, result.prediction
        );
        info!("{}", summary);
        if !self.view.prediction.commit(ticket, summary) {
            debug!("Discarding stale prediction result");
        }

        self.chart.render(symbol).await;
        self.view.set_trade_controls_visible(true);
    }
}
