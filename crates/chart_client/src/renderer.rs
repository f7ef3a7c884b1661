//! Redraws the single line chart whenever filters are applied.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

use filter_core::{FilterController, FilterEventKind, ReadinessWaiter};
use shared::{
    domain::Selections,
    protocol::{ChartDataset, GraphData, RefreshResponse},
};
use tokio::runtime::Handle;
use tracing::{debug, error, info, warn};

use crate::{
    busy::{BusyGuard, BusyIndicator},
    error::ChartError,
    query::GraphDataQuery,
    source::GraphDataSource,
};

pub const SEASON_AXIS_TITLE: &str = "Season";
pub const DEFAULT_STAT: &str = "attack_stars";

/// "attack_stars" -> "Attack Stars".
pub fn stat_title(stat: &str) -> String {
    stat.split(|ch: char| ch == '_' || ch == ' ')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Everything the charting library needs to draw one line chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub canvas_id: String,
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
    pub x_title: String,
    pub y_title: String,
}

impl ChartSpec {
    pub fn line(canvas_id: &str, data: GraphData, stat: Option<&str>) -> Self {
        Self {
            canvas_id: canvas_id.to_string(),
            labels: data.labels,
            datasets: data.datasets,
            x_title: SEASON_AXIS_TITLE.to_string(),
            y_title: stat_title(stat.unwrap_or(DEFAULT_STAT)),
        }
    }
}

/// A live chart on the page.
pub trait ChartInstance: Send {
    fn destroy(&mut self);
}

/// The charting library.
pub trait ChartBackend: Send + Sync {
    fn create(&self, spec: &ChartSpec) -> Result<Box<dyn ChartInstance>, ChartError>;
}

/// User-facing alert surface for failed chart requests.
pub trait AlertSink: Send + Sync {
    fn alert(&self, message: &str);
}

pub struct ChartRenderer {
    canvas_id: String,
    source: Arc<dyn GraphDataSource>,
    backend: Arc<dyn ChartBackend>,
    alerts: Arc<dyn AlertSink>,
    busy: Arc<BusyIndicator>,
    chart: Mutex<Option<Box<dyn ChartInstance>>>,
    issued: AtomicU64,
    latest_drawn: AtomicU64,
}

impl ChartRenderer {
    pub fn new(
        canvas_id: impl Into<String>,
        source: Arc<dyn GraphDataSource>,
        backend: Arc<dyn ChartBackend>,
        alerts: Arc<dyn AlertSink>,
        busy: Arc<BusyIndicator>,
    ) -> Arc<Self> {
        Arc::new(Self {
            canvas_id: canvas_id.into(),
            source,
            backend,
            alerts,
            busy,
            chart: Mutex::new(None),
            issued: AtomicU64::new(0),
            latest_drawn: AtomicU64::new(0),
        })
    }

    pub fn busy(&self) -> &Arc<BusyIndicator> {
        &self.busy
    }

    pub fn has_chart(&self) -> bool {
        self.chart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replaces the current chart; the previous instance is destroyed before the next is created.
    pub fn draw(&self, data: GraphData, stat: Option<&str>) -> Result<(), ChartError> {
        let spec = ChartSpec::line(&self.canvas_id, data, stat);
        let mut chart = self.chart.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(mut previous) = chart.take() {
            previous.destroy();
        }
        *chart = Some(self.backend.create(&spec)?);
        debug!(
            canvas = %self.canvas_id,
            labels = spec.labels.len(),
            datasets = spec.datasets.len(),
            y_title = %spec.y_title,
            "chart drawn"
        );
        Ok(())
    }

    /// Draws the chart embedded in the page before any filter is applied.
    pub fn draw_initial(&self, data: Option<GraphData>, stat: Option<&str>) -> bool {
        let Some(data) = data else {
            error!(canvas = %self.canvas_id, "no initial chart data found");
            return false;
        };
        info!(
            canvas = %self.canvas_id,
            labels = data.labels.len(),
            datasets = data.datasets.len(),
            "initializing chart"
        );
        match self.draw(data, stat) {
            Ok(()) => true,
            Err(err) => {
                error!(canvas = %self.canvas_id, error = %err, "initial chart draw failed");
                false
            }
        }
    }

    /// Fetches series for `applied` and redraws. Failures raise an alert; the busy indicator
    /// is released on every outcome.
    pub async fn update(&self, applied: &Selections) -> bool {
        let busy = self.busy.begin();
        let request = self.next_request();
        self.fetch_and_draw(applied, request, busy).await
    }

    /// Numbers requests in apply order.
    fn next_request(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Records `request` as drawn; returns `false` when a newer request was drawn first.
    fn mark_drawn(&self, request: u64) -> bool {
        let newest = self.latest_drawn.fetch_max(request, Ordering::SeqCst);
        if newest > request {
            warn!(request, newest, "drawing stale chart response over a newer one");
            return false;
        }
        true
    }

    async fn fetch_and_draw(&self, applied: &Selections, request: u64, _busy: BusyGuard) -> bool {
        let query = GraphDataQuery::from_applied(applied);
        debug!(request, players = query.players.len(), "chart update started");

        let result = match self.source.graph_data(&query).await {
            Ok(data) => {
                self.mark_drawn(request);
                self.draw(data, query.stat.as_deref())
            }
            Err(err) => Err(err),
        };

        match result {
            Ok(()) => true,
            Err(err) => {
                error!(request, error = %err, "chart update failed");
                self.alerts
                    .alert(&format!("Failed to load chart data: {err}"));
                false
            }
        }
    }

    pub async fn refresh_data(&self) -> Result<RefreshResponse, ChartError> {
        self.source.refresh_data().await
    }

    /// Subscribes to applied filters; each apply spawns an independent fetch on `handle`.
    pub fn connect(self: &Arc<Self>, controller: &FilterController, handle: Handle) {
        let renderer = Arc::clone(self);
        controller.subscribe_fn(FilterEventKind::Apply, move |_, applied| {
            // counted and numbered before the task exists, in apply order
            let busy = renderer.busy.begin();
            let request = renderer.next_request();
            let renderer = Arc::clone(&renderer);
            let applied = applied.clone();
            handle.spawn(async move {
                renderer.fetch_and_draw(&applied, request, busy).await;
            });
        });
        debug!(canvas = %self.canvas_id, "chart connected to filter controller");
    }

    /// Connects once the controller is published, or gives up after `timeout`.
    pub async fn connect_when_ready(self: Arc<Self>, waiter: ReadinessWaiter, timeout: Duration) -> bool {
        match waiter.wait(timeout, &self.canvas_id).await {
            Some(controller) => {
                self.connect(&controller, Handle::current());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[path = "tests/renderer_tests.rs"]
mod tests;
