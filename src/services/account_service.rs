use std::sync::Arc;

use tracing::debug;

use crate::remote::BackendApi;
use crate::view::DashboardView;

/// Keeps the displayed account balance in sync with the backend. The balance
/// is always re-fetched, never computed locally.
pub struct AccountService {
    backend: Arc<dyn BackendApi>,
    view: Arc<DashboardView>,
}

impl AccountService {
    pub fn new(backend: Arc<dyn BackendApi>, view: Arc<DashboardView>) -> Self {
        Self { backend, view }
    }

    /// Fetch `/account` and rewrite the balance target. Any failure leaves
    /// the current display untouched and is logged at diagnostic level only;
    /// the user never sees a notice for it.
    pub async fn refresh(&self) {
        let ticket = self.view.balance.begin();

        match self.backend.fetch_account().await {
            Ok(account) => {
                let text = format!("${:.2}", account.balance);
                if !self.view.balance.commit(ticket, text) {
                    debug!("Discarding stale balance result");
                }
            }
            Err(e) => debug!("Account refresh failed, keeping previous balance: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::AccountBalance;
    use crate::remote::backend_client::MockBackendApi;

    fn service(mock: MockBackendApi) -> (AccountService, Arc<DashboardView>) {
        let view = Arc::new(DashboardView::new());
        (AccountService::new(Arc::new(mock), view.clone()), view)
    }

    #[tokio::test]
    async fn formats_balance_with_two_decimals() {
        let mut mock = MockBackendApi::new();
        mock.expect_fetch_account()
            .times(1)
            .returning(|| Ok(AccountBalance { balance: 10000.5 }));

        let (svc, view) = service(mock);
        svc.refresh().await;
        assert_eq!(view.balance.get().as_deref(), Some("$10000.50"));
    }

    #[tokio::test]
    async fn failure_leaves_previous_display_untouched() {
        let mut mock = MockBackendApi::new();
        mock.expect_fetch_account()
            .times(1)
            .returning(|| Err(ApiError::Rejected { message: None }));

        let (svc, view) = service(mock);
        let ticket = view.balance.begin();
        view.balance.commit(ticket, "$42.00".to_string());

        svc.refresh().await;
        assert_eq!(view.balance.get().as_deref(), Some("$42.00"));
        assert!(view.last_notice().is_none());
    }

    #[tokio::test]
    async fn repeated_refresh_is_idempotent() {
        let mut mock = MockBackendApi::new();
        mock.expect_fetch_account()
            .times(2)
            .returning(|| Ok(AccountBalance { balance: 1234.0 }));

        let (svc, view) = service(mock);
        svc.refresh().await;
        let first = view.balance.get();
        svc.refresh().await;
        assert_eq!(view.balance.get(), first);
        assert_eq!(first.as_deref(), Some("$1234.00"));
    }
}
