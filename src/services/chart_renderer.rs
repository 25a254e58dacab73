use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use crate::models::{ChartMount, ChartSpec, Symbol};
use crate::view::DashboardView;

/// The third-party chart widget: instantiable with a spec, initializes
/// asynchronously on its own, offers no readiness event.
#[cfg_attr(test, mockall::automock)]
pub trait ChartWidget: Send + Sync {
    fn mount(&self, spec: &ChartSpec);
}

/// Stand-in for the embedded widget when running headless; the mount itself
/// happens out of process, so all we can do here is record it.
pub struct EmbeddedChartWidget;

impl ChartWidget for EmbeddedChartWidget {
    fn mount(&self, spec: &ChartSpec) {
        info!(
            "Mounting chart widget: {} interval={} theme={} size={}x{}",
            spec.symbol, spec.interval, spec.theme, spec.width, spec.height
        );
    }
}

pub struct ChartRenderer {
    widget: Arc<dyn ChartWidget>,
    view: Arc<DashboardView>,
    settle: Duration,
}

impl ChartRenderer {
    pub fn new(widget: Arc<dyn ChartWidget>, view: Arc<DashboardView>, settle: Duration) -> Self {
        Self {
            widget,
            view,
            settle,
        }
    }

    /// Mount a widget for `symbol`, then wait out the settling delay before
    /// returning. The ticketed commit replaces whatever occupied the chart
    /// container wholesale, which is the clearing step; there is no separate
    /// unticketed clear that a stale render could wipe a newer mount with.
    ///
    /// The delay is a pragmatic wait for the widget's opaque async
    /// initialization, not a completion signal; the widget may still be
    /// loading when this returns.
    pub async fn render(&self, symbol: &Symbol) {
        let ticket = self.view.chart.begin();

        let spec = ChartSpec::for_symbol(symbol);
        self.widget.mount(&spec);

        if !self.view.chart.commit(ticket, ChartMount { spec }) {
            debug!("Discarding stale chart mount for {}", symbol);
        }

        sleep(self.settle).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn render_mounts_configured_widget() {
        let view = Arc::new(DashboardView::new());
        let mut widget = MockChartWidget::new();
        widget
            .expect_mount()
            .times(1)
            .withf(|spec| spec.symbol == "BINANCE:SOLUSDT" && spec.theme == "dark")
            .returning(|_| ());

        let renderer = ChartRenderer::new(Arc::new(widget), view.clone(), Duration::ZERO);
        renderer.render(&Symbol::new("SOLUSDT").unwrap()).await;

        let mount = view.chart.get().unwrap();
        assert_eq!(mount.spec.symbol, "BINANCE:SOLUSDT");
    }

    #[tokio::test]
    async fn stale_render_finishing_late_cannot_empty_newer_mount() {
        let view = Arc::new(DashboardView::new());
        // A render starts first (and will finish last).
        let stale = view.chart.begin();

        let mut widget = MockChartWidget::new();
        widget.expect_mount().times(1).returning(|_| ());
        let renderer = ChartRenderer::new(Arc::new(widget), view.clone(), Duration::ZERO);
        renderer.render(&Symbol::new("ETHUSDT").unwrap()).await;

        // The older render now completes; the newer mount must survive it.
        assert!(!view.chart.commit(
            stale,
            ChartMount {
                spec: ChartSpec::for_symbol(&Symbol::new("BTCUSDT").unwrap())
            }
        ));
        let mount = view.chart.get().expect("newer mount must not be emptied");
        assert_eq!(mount.spec.symbol, "BINANCE:ETHUSDT");
    }

    #[tokio::test]
    async fn newer_render_wins_over_stale_commit() {
        let view = Arc::new(DashboardView::new());
        // A later render has already taken and committed a newer ticket.
        let stale = view.chart.begin();
        let fresh = view.chart.begin();
        let spec = ChartSpec::for_symbol(&Symbol::new("ETHUSDT").unwrap());
        assert!(view.chart.commit(fresh, ChartMount { spec: spec.clone() }));
        assert!(!view.chart.commit(
            stale,
            ChartMount {
                spec: ChartSpec::for_symbol(&Symbol::new("BTCUSDT").unwrap())
            }
        ));
        assert_eq!(view.chart.get().unwrap().spec, spec);
    }
}
