use super::*;

use std::sync::Mutex;

use async_trait::async_trait;
use chart_client::{ChartError, ChartInstance, ChartSpec, GraphDataQuery, NoBusyListener};
use shared::protocol::{ChartDataset, RefreshResponse};

use crate::commands::parse_command;

#[derive(Default)]
struct FakeSource {
    queries: Mutex<Vec<GraphDataQuery>>,
}

#[async_trait]
impl GraphDataSource for FakeSource {
    async fn graph_data(&self, query: &GraphDataQuery) -> Result<GraphData, ChartError> {
        self.queries.lock().expect("lock").push(query.clone());
        Ok(GraphData {
            labels: vec!["2025-11".into()],
            datasets: query
                .players
                .iter()
                .map(|player| ChartDataset {
                    label: player.clone(),
                    data: vec![Some(2.0)],
                    style: Default::default(),
                })
                .collect(),
        })
    }

    async fn refresh_data(&self) -> Result<RefreshResponse, ChartError> {
        Ok(RefreshResponse {
            message: None,
            log: Some(vec!["3 wars imported".into()]),
        })
    }
}

struct NullChart;

impl ChartInstance for NullChart {
    fn destroy(&mut self) {}
}

#[derive(Default)]
struct RecordingBackend(Mutex<Vec<ChartSpec>>);

impl ChartBackend for RecordingBackend {
    fn create(&self, spec: &ChartSpec) -> Result<Box<dyn ChartInstance>, ChartError> {
        self.0.lock().expect("lock").push(spec.clone());
        Ok(Box::new(NullChart))
    }
}

struct SilentAlerts;

impl AlertSink for SilentAlerts {
    fn alert(&self, _message: &str) {}
}

const PAGE: &str = r#"{
    "columns": ["Player", "Season", "Attack Stars"],
    "rows": [
        {"Player": "A", "Season": "2025-10", "Attack Stars": 5},
        {"Player": "B", "Season": "2025-10", "Attack Stars": 12},
        {"Player": "A", "Season": "2025-11", "Attack Stars": null}
    ],
    "chart": {"labels": ["2025-10", "2025-11"], "datasets": []}
}"#;

struct Harness {
    page: Page,
    source: Arc<FakeSource>,
    backend: Arc<RecordingBackend>,
}

async fn harness(raw: &str) -> Harness {
    let source = Arc::new(FakeSource::default());
    let backend = Arc::new(RecordingBackend::default());
    let settings = Settings {
        ready_timeout_ms: 200,
        ..Settings::default()
    };
    let page = Page::compose(
        &settings,
        PageData::from_json(raw).expect("page data"),
        Collaborators {
            source: source.clone(),
            backend: backend.clone(),
            alerts: Arc::new(SilentAlerts),
            spinner: Arc::new(NoBusyListener),
        },
    )
    .await
    .expect("compose");
    Harness {
        page,
        source,
        backend,
    }
}

async fn run(page: &Page, line: &str) -> String {
    let command = parse_command(line).expect("parse").expect("command");
    page.execute(command).await.expect("execute")
}

#[tokio::test]
async fn compose_builds_widgets_from_table_and_settings() {
    let h = harness(PAGE).await;

    let players = h.page.widget("players").expect("players");
    let values: Vec<&str> = players
        .descriptor()
        .options
        .iter()
        .map(|option| option.value.as_str())
        .collect();
    assert_eq!(values, vec!["A", "B"]);
    assert_eq!(h.page.widget("stat").expect("stat").summary_label(), "Attack Stars");
    assert!(h.page.widget("season").is_err());

    let initial = h.backend.0.lock().expect("lock");
    assert_eq!(initial.len(), 1);
    assert_eq!(initial[0].labels, vec!["2025-10", "2025-11"]);
    assert_eq!(initial[0].y_title, "Attack Stars");
}

#[tokio::test]
async fn apply_filters_table_and_fetches_chart() {
    let h = harness(PAGE).await;

    assert_eq!(run(&h.page, "toggle players A").await, "1 selected");
    assert_eq!(h.page.table().visible_rows().len(), 3);

    assert_eq!(run(&h.page, "apply").await, "Filters applied!");
    assert_eq!(h.page.table().visible_rows().len(), 2);
    assert!(h.page.wait_idle(Duration::from_secs(1)).await);

    let queries = h.source.queries.lock().expect("lock");
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].players, vec!["A"]);
    assert_eq!(queries[0].stat.as_deref(), Some("attack_stars"));
    assert_eq!(h.backend.0.lock().expect("lock").len(), 2);
}

#[tokio::test]
async fn reset_restores_everything() {
    let h = harness(PAGE).await;
    run(&h.page, "select-all players on").await;
    run(&h.page, "apply").await;
    run(&h.page, "sort Attack Stars").await;

    assert_eq!(run(&h.page, "reset").await, "Filters reset!");
    assert!(h.page.controller().applied().active_groups().next().is_none());
    assert_eq!(h.page.table().visible_rows().len(), 3);
    assert_eq!(h.page.widget("players").expect("players").summary_label(), "Select Players");

    let status = h.page.status();
    assert!(status.contains("columns: Player, Season, Attack Stars"));
    assert!(status.contains("rows: 3 of 3 visible"));
    assert!(status.contains("notice: Filters reset!"));
    h.page.wait_idle(Duration::from_secs(1)).await;
}

#[tokio::test]
async fn sort_puts_missing_values_last() {
    let h = harness(PAGE).await;
    run(&h.page, "sort Attack Stars").await;
    run(&h.page, "sort Attack Stars").await;
    let stars: Vec<String> = h
        .page
        .table()
        .displayed_rows()
        .iter()
        .map(|row| row.text("Attack Stars"))
        .collect();
    assert_eq!(stars, vec!["12", "5", ""]);
}

#[tokio::test]
async fn close_shuts_the_open_panel() {
    let h = harness(PAGE).await;
    run(&h.page, "open players").await;
    let players = h.page.widget("players").expect("players");
    assert!(players.is_open());

    let filters = run(&h.page, "close").await;
    assert!(!players.is_open());
    assert!(!h.page.widget("stat").expect("stat").is_open());
    assert!(!filters.contains("multi-select-panel show"));
}

#[tokio::test]
async fn single_select_has_no_select_all() {
    let h = harness(PAGE).await;
    let command = parse_command("select-all stat on").expect("parse").expect("command");
    assert!(h.page.execute(command).await.is_err());
}

#[tokio::test]
async fn refresh_falls_back_to_default_message() {
    let h = harness(PAGE).await;
    assert_eq!(run(&h.page, "refresh").await, "Refreshed!\n3 wars imported");
}

#[tokio::test]
async fn malformed_rows_render_inline_and_page_still_works() {
    let h = harness(r#"{"columns": ["Player"], "rows": {"Player": "A"}}"#).await;

    assert!(run(&h.page, "render table").await.contains("Error parsing table data"));
    assert!(h.page.widget("players").expect("players").descriptor().options.is_empty());
    assert_eq!(run(&h.page, "apply").await, "Filters applied!");
    h.page.wait_idle(Duration::from_secs(1)).await;
}

#[test]
fn page_data_keeps_parts_as_text() {
    let data = PageData::from_json(r#"{"columns": ["A"], "rows": [{"A": 1}]}"#).expect("data");
    assert_eq!(data.columns.as_deref(), Some(r#"["A"]"#));
    assert_eq!(data.rows.as_deref(), Some(r#"[{"A":1}]"#));
    assert!(data.chart.is_none());
    assert!(PageData::from_json("[]").is_err());
}
