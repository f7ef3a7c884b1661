//! Composes the dashboard page and routes script commands to its components.

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::{anyhow, Context};
use chart_client::{AlertSink, BusyIndicator, BusyListener, ChartBackend, ChartRenderer, GraphDataSource};
use filter_core::{
    registry::parse_options, ControllerReadiness, FilterController, FilterDescriptor,
    FilterOption, FilterRegistry, FilterableTable, NoticeBoard, PanelCoordinator,
    SelectionWidget, TableConfig,
};
use serde::Deserialize;
use shared::{
    domain::{Selections, SelectionMode, STAT_GROUP},
    protocol::GraphData,
};
use tracing::{debug, info, warn};

use crate::{
    commands::{PageCommand, RenderTarget},
    config::{FilterSettings, Settings},
};

pub const REFRESH_DONE: &str = "Refreshed!";
pub const REFRESH_FAILED: &str = "Error! Try Again";

/// Page payload as embedded by the backend. Columns and rows stay raw so that malformed
/// parts surface as the table's inline error rather than failing the whole page.
#[derive(Debug, Default)]
pub struct PageData {
    pub columns: Option<String>,
    pub rows: Option<String>,
    pub chart: Option<GraphData>,
}

#[derive(Deserialize)]
struct RawPageData {
    #[serde(default)]
    columns: Option<serde_json::Value>,
    #[serde(default)]
    rows: Option<serde_json::Value>,
    #[serde(default)]
    chart: Option<GraphData>,
}

impl PageData {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let raw: RawPageData = serde_json::from_str(raw).context("page data is not a JSON object")?;
        Ok(Self {
            columns: raw.columns.map(|value| value.to_string()),
            rows: raw.rows.map(|value| value.to_string()),
            chart: raw.chart,
        })
    }
}

/// External collaborators the page talks to.
pub struct Collaborators {
    pub source: Arc<dyn GraphDataSource>,
    pub backend: Arc<dyn ChartBackend>,
    pub alerts: Arc<dyn AlertSink>,
    pub spinner: Arc<dyn BusyListener>,
}

pub struct Page {
    controller: Arc<FilterController>,
    notices: Arc<NoticeBoard>,
    panels: Arc<PanelCoordinator>,
    widgets: Vec<Arc<SelectionWidget>>,
    table: Arc<FilterableTable>,
    chart: Arc<ChartRenderer>,
}

impl Page {
    /// Mounts the table and chart first, then the controller and widgets, and finally
    /// publishes the controller so the early components can subscribe.
    pub async fn compose(
        settings: &Settings,
        data: PageData,
        collaborators: Collaborators,
    ) -> anyhow::Result<Self> {
        let readiness = ControllerReadiness::new();

        let table = FilterableTable::new(TableConfig {
            table_id: settings.table_id.clone(),
            title: settings.table_title.clone(),
            ignored_groups: settings
                .filters
                .iter()
                .filter(|filter| !filter.filters_table)
                .map(|filter| filter.key.clone())
                .collect(),
        });
        if let Err(err) = table.load_json(data.columns.as_deref(), data.rows.as_deref()) {
            warn!(error = %err, "table failed to load; rendering inline message");
        }
        let table_ready = tokio::spawn(
            table
                .clone()
                .connect_when_ready(readiness.waiter(), settings.ready_timeout()),
        );

        let chart = ChartRenderer::new(
            settings.canvas_id.clone(),
            collaborators.source,
            collaborators.backend,
            collaborators.alerts,
            BusyIndicator::new(collaborators.spinner),
        );
        let initial_stat = settings
            .filters
            .iter()
            .find(|filter| filter.key == STAT_GROUP)
            .and_then(|filter| filter.default.as_deref());
        chart.draw_initial(data.chart, initial_stat);
        let chart_ready = tokio::spawn(
            chart
                .clone()
                .connect_when_ready(readiness.waiter(), settings.ready_timeout()),
        );

        let registry = build_registry(&settings.filters, &table)?;
        let notices = Arc::new(NoticeBoard::new(settings.notice_ttl()));
        let controller = FilterController::new(notices.clone());
        let panels = PanelCoordinator::new();
        let widgets: Vec<_> = registry
            .iter()
            .cloned()
            .map(|descriptor| SelectionWidget::mount(descriptor, controller.clone(), panels.clone()))
            .collect();

        readiness.publish(controller.clone());
        let table_connected = table_ready.await.context("table readiness task failed")?;
        let chart_connected = chart_ready.await.context("chart readiness task failed")?;
        info!(
            widgets = widgets.len(),
            table_connected,
            chart_connected,
            "dashboard composed"
        );

        Ok(Self {
            controller,
            notices,
            panels,
            widgets,
            table,
            chart,
        })
    }

    pub fn controller(&self) -> &Arc<FilterController> {
        &self.controller
    }

    pub fn table(&self) -> &Arc<FilterableTable> {
        &self.table
    }

    pub fn chart(&self) -> &Arc<ChartRenderer> {
        &self.chart
    }

    pub fn widget(&self, group: &str) -> anyhow::Result<&Arc<SelectionWidget>> {
        self.widgets
            .iter()
            .find(|widget| widget.key().as_str() == group)
            .ok_or_else(|| anyhow!("unknown filter group '{group}'"))
    }

    /// Runs one command and returns what the page would now show for it.
    pub async fn execute(&self, command: PageCommand) -> anyhow::Result<String> {
        debug!(?command, "executing page command");
        let output = match command {
            PageCommand::Open { group } => {
                let widget = self.widget(&group)?;
                widget.toggle_panel();
                widget.render()
            }
            PageCommand::Toggle { group, value } => {
                let widget = self.widget(&group)?;
                widget.click_option(&value, filter_core::ClickTarget::Row);
                widget.summary_label()
            }
            PageCommand::Click { group, value, target } => {
                let widget = self.widget(&group)?;
                widget.click_option(&value, target);
                widget.summary_label()
            }
            PageCommand::SelectAll { group, checked } => {
                let widget = self.widget(&group)?;
                if widget.mode() == SelectionMode::Single {
                    return Err(anyhow!("'{group}' is single-select and has no select-all"));
                }
                widget.select_all_changed(checked);
                widget.summary_label()
            }
            PageCommand::Close => {
                self.panels.close_all();
                self.render(RenderTarget::Filters)
            }
            PageCommand::Apply => {
                self.controller.apply();
                self.notice_text()
            }
            PageCommand::Reset => {
                self.controller.reset();
                self.notice_text()
            }
            PageCommand::Sort { column } => {
                if !self.table.click_header(&column) {
                    warn!(%column, "nothing to sort");
                }
                self.table.render()
            }
            PageCommand::Render { target } => self.render(target),
            PageCommand::Status => self.status(),
            PageCommand::Refresh => match self.chart.refresh_data().await {
                Ok(response) => {
                    let mut lines = vec![response.message.unwrap_or_else(|| REFRESH_DONE.to_string())];
                    lines.extend(response.log.unwrap_or_default());
                    lines.join("\n")
                }
                Err(err) => {
                    warn!(error = %err, "error refreshing data");
                    REFRESH_FAILED.to_string()
                }
            },
            PageCommand::Quit => String::new(),
        };
        Ok(output)
    }

    pub fn render(&self, target: RenderTarget) -> String {
        let filters = || {
            self.widgets
                .iter()
                .map(|widget| widget.render())
                .collect::<Vec<_>>()
                .join("\n")
        };
        match target {
            RenderTarget::Table => self.table.render(),
            RenderTarget::Filters => filters(),
            RenderTarget::Notice => self.notices.render_at(Instant::now()),
            RenderTarget::All => [
                self.notices.render_at(Instant::now()),
                filters(),
                self.table.render(),
            ]
            .join("\n"),
        }
    }

    pub fn status(&self) -> String {
        let notice = self
            .notices
            .visible()
            .map(|notice| notice.message)
            .unwrap_or_else(|| "-".to_string());
        format!(
            "pending: {}\napplied: {}\ncolumns: {}\nrows: {} of {} visible\nchart requests in flight: {}\nnotice: {notice}",
            describe(&self.controller.pending()),
            describe(&self.controller.applied()),
            self.table.columns().join(", "),
            self.table.visible_rows().len(),
            self.table.row_count(),
            self.chart.busy().in_flight(),
        )
    }

    /// Gives in-flight chart requests up to `timeout` to finish.
    pub async fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while self.chart.busy().is_busy() {
            if tokio::time::Instant::now() >= deadline {
                warn!(in_flight = self.chart.busy().in_flight(), "chart requests still running");
                return false;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        true
    }

    fn notice_text(&self) -> String {
        self.notices
            .visible()
            .map(|notice| notice.message)
            .unwrap_or_default()
    }
}

/// Registry from settings; an `options_column` fills options from the loaded table.
pub fn build_registry(
    filters: &[FilterSettings],
    table: &FilterableTable,
) -> anyhow::Result<FilterRegistry> {
    let mut registry = FilterRegistry::new();
    for filter in filters {
        let options = match &filter.options_column {
            Some(column) => table
                .distinct_values(column)
                .into_iter()
                .map(FilterOption::plain)
                .collect(),
            None => parse_options(filter.options.as_deref()),
        };
        let mut descriptor = FilterDescriptor::new(filter.key.as_str(), filter.label.as_str())
            .with_options(options);
        if filter.mode == SelectionMode::Single {
            descriptor = descriptor.single_select();
        }
        if let Some(default) = &filter.default {
            descriptor = descriptor.with_default(default.as_str());
        }
        registry.register(descriptor)?;
    }
    Ok(registry)
}

fn describe(selections: &Selections) -> String {
    let groups: Vec<String> = selections
        .iter()
        .map(|(key, values)| {
            let values: Vec<&str> = values.iter().map(|value| value.as_str()).collect();
            format!("{key}=[{}]", values.join(", "))
        })
        .collect();
    if groups.is_empty() {
        "(none)".to_string()
    } else {
        groups.join(" ")
    }
}

#[cfg(test)]
#[path = "tests/page_tests.rs"]
mod tests;
