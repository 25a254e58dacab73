use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::models::{AccountBalance, PredictionRequest, PredictionResult, TradeOrder};

/// The dashboard backend's HTTP contract. A trait so the services can be
/// exercised against a mock without a running backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// GET /account
    async fn fetch_account(&self) -> Result<AccountBalance, ApiError>;

    /// GET /check_login
    async fn check_login(&self) -> Result<bool, ApiError>;

    /// POST /predict
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError>;

    /// POST /trade; returns the server's confirmation message.
    async fn place_trade(&self, order: &TradeOrder) -> Result<String, ApiError>;
}

#[derive(Deserialize)]
struct LoginStatus {
    logged_in: bool,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Deserialize)]
struct TradeReceipt {
    message: String,
}

/// Real backend client. The cookie store carries the session cookie, which
/// is the only authentication the backend expects from us.
pub struct DashboardBackend {
    client: Client,
    base_url: String,
}

impl DashboardBackend {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .user_agent("crypto_dashboard/0.1.0")
                .timeout(Duration::from_secs(10))
                .cookie_store(true)
                .build()
                .expect("Failed to build HTTP client."),
            base_url,
        }
    }

    /// Pull the `{error}` payload out of a failure response, if there is one.
    /// The raw body is kept for the diagnostic log; the user only ever sees
    /// the extracted message.
    async fn rejection(response: reqwest::Response) -> ApiError {
        let message = match response.text().await {
            Ok(body) => {
                debug!("Backend request failed: {}", body);
                parse_error_message(&body)
            }
            Err(_) => None,
        };
        ApiError::Rejected { message }
    }
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
}

#[async_trait]
impl BackendApi for DashboardBackend {
    async fn fetch_account(&self) -> Result<AccountBalance, ApiError> {
        let response = self
            .client
            .get(format!("{}/account", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json::<AccountBalance>().await?)
    }

    async fn check_login(&self) -> Result<bool, ApiError> {
        let response = self
            .client
            .get(format!("{}/check_login", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let status = response.json::<LoginStatus>().await?;
        Ok(status.logged_in)
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionResult, ApiError> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json::<PredictionResult>().await?)
    }

    async fn place_trade(&self, order: &TradeOrder) -> Result<String, ApiError> {
        let response = self
            .client
            .post(format!("{}/trade", self.base_url))
            .json(order)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let receipt = response.json::<TradeReceipt>().await?;
        Ok(receipt.message)
    }
}
