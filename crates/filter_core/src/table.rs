//! Filterable, sortable table over an immutable row set.
//!
//! The loaded rows are never mutated or reordered. Filtering derives the visible subset as
//! indices into them, and sorting orders a copy of that subset for display.

use std::{
    collections::HashSet,
    fmt::Write as _,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use shared::{
    domain::{Row, Selections},
    error::{InputError, InputField},
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    controller::{FilterController, FilterEventKind, FilterListener},
    html::escape_html,
    readiness::ReadinessWaiter,
    sort::{compare_rows, SortState},
};

pub const EMPTY_FILTER_MESSAGE: &str = "No data available for selected filters.";
pub const NO_COLUMNS_MESSAGE: &str = "No columns defined for table";

#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("table has no columns")]
    NoColumns,
    #[error("table '{0}' is already loaded")]
    AlreadyLoaded(String),
}

#[derive(Debug, Clone)]
pub struct TableConfig {
    pub table_id: String,
    pub title: String,
    /// Groups that never filter this table (chart-only selections such as the stat).
    pub ignored_groups: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            table_id: "data-table".into(),
            title: "Data Table".into(),
            ignored_groups: Vec::new(),
        }
    }
}

struct TableData {
    columns: Vec<String>,
    original: Vec<Row>,
    visible: Vec<usize>,
    displayed: Vec<usize>,
    sort: SortState,
}

impl TableData {
    fn replace_visible(&mut self, visible: Vec<usize>) {
        self.displayed = visible.clone();
        self.visible = visible;
        self.sort.clear();
    }
}

enum TableState {
    Unloaded,
    Failed(String),
    NoColumns,
    Ready(TableData),
}

pub struct FilterableTable {
    config: TableConfig,
    state: Mutex<TableState>,
}

impl FilterableTable {
    pub fn new(config: TableConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            state: Mutex::new(TableState::Unloaded),
        })
    }

    fn state(&self) -> MutexGuard<'_, TableState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Loads declarative column and row text (JSON arrays).
    ///
    /// Malformed text leaves the table showing an inline error; the returned error is for
    /// the caller's logs only.
    pub fn load_json(
        &self,
        columns_text: Option<&str>,
        rows_text: Option<&str>,
    ) -> Result<(), TableLoadError> {
        let parsed = parse_columns(columns_text).and_then(|columns| {
            parse_rows(rows_text).map(|rows| (columns, rows))
        });
        match parsed {
            Ok((columns, rows)) => self.load(columns, rows),
            Err(err) => {
                warn!(table = %self.config.table_id, error = %err, "failed to parse table input");
                let mut state = self.state();
                if matches!(*state, TableState::Ready(_)) {
                    return Err(TableLoadError::AlreadyLoaded(self.config.table_id.clone()));
                }
                *state = TableState::Failed(err.inline_message());
                Err(err.into())
            }
        }
    }

    /// One-time initialization: `columns` fix render and sort order, `rows` become both the
    /// original and the initially visible rows.
    pub fn load(&self, columns: Vec<String>, rows: Vec<Row>) -> Result<(), TableLoadError> {
        let mut state = self.state();
        if matches!(*state, TableState::Ready(_)) {
            warn!(table = %self.config.table_id, "ignoring second table load");
            return Err(TableLoadError::AlreadyLoaded(self.config.table_id.clone()));
        }
        if columns.is_empty() {
            warn!(table = %self.config.table_id, "no columns provided");
            *state = TableState::NoColumns;
            return Err(TableLoadError::NoColumns);
        }

        let visible: Vec<usize> = (0..rows.len()).collect();
        info!(
            table = %self.config.table_id,
            columns = columns.len(),
            rows = rows.len(),
            "table loaded"
        );
        *state = TableState::Ready(TableData {
            columns,
            original: rows,
            displayed: visible.clone(),
            visible,
            sort: SortState::default(),
        });
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        matches!(*self.state(), TableState::Ready(_))
    }

    pub fn columns(&self) -> Vec<String> {
        match &*self.state() {
            TableState::Ready(data) => data.columns.clone(),
            _ => Vec::new(),
        }
    }

    /// Recomputes the visible rows from an applied snapshot and clears any sort.
    pub fn on_applied_filters_changed(&self, applied: &Selections) {
        let mut state = self.state();
        let TableState::Ready(data) = &mut *state else {
            debug!(table = %self.config.table_id, "applied filters before table load; ignoring");
            return;
        };

        let ignored = &self.config.ignored_groups;
        let active: Vec<(String, HashSet<&str>)> = applied
            .active_groups()
            .filter(|(key, _)| !ignored.iter().any(|group| group == key.as_str()))
            .map(|(key, values)| {
                let column = resolve_column(&data.columns, key.as_str());
                debug!(group = %key, %column, "resolved filter column");
                (column, values.iter().map(|value| value.as_str()).collect())
            })
            .collect();

        let visible: Vec<usize> = data
            .original
            .iter()
            .enumerate()
            .filter(|(_, row)| {
                active
                    .iter()
                    .all(|(column, values)| values.contains(row.text(column).as_str()))
            })
            .map(|(index, _)| index)
            .collect();

        info!(
            table = %self.config.table_id,
            groups = active.len(),
            matched = visible.len(),
            "table filters applied"
        );
        data.replace_visible(visible);
    }

    /// Sorts the visible rows by `column`; returns false when nothing was sorted.
    pub fn click_header(&self, column: &str) -> bool {
        let mut state = self.state();
        let TableState::Ready(data) = &mut *state else {
            return false;
        };
        if !data.columns.iter().any(|name| name == column) {
            debug!(table = %self.config.table_id, column, "unknown sort column");
            return false;
        }
        if data.visible.is_empty() {
            return false;
        }

        data.sort.click(column);
        let direction = data.sort.direction;
        let mut order = data.visible.clone();
        let original = &data.original;
        order.sort_by(|&a, &b| compare_rows(&original[a], &original[b], column, direction));
        data.displayed = order;
        debug!(table = %self.config.table_id, column, ?direction, "table sorted");
        true
    }

    pub fn sort_state(&self) -> SortState {
        match &*self.state() {
            TableState::Ready(data) => data.sort.clone(),
            _ => SortState::default(),
        }
    }

    /// Rows passing the current filters, in load order.
    pub fn visible_rows(&self) -> Vec<Row> {
        match &*self.state() {
            TableState::Ready(data) => data.visible.iter().map(|&i| data.original[i].clone()).collect(),
            _ => Vec::new(),
        }
    }

    /// Rows as currently shown, including any sort.
    pub fn displayed_rows(&self) -> Vec<Row> {
        match &*self.state() {
            TableState::Ready(data) => data
                .displayed
                .iter()
                .map(|&i| data.original[i].clone())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        match &*self.state() {
            TableState::Ready(data) => data.original.len(),
            _ => 0,
        }
    }

    /// Distinct non-empty values of `column` in first-seen order.
    pub fn distinct_values(&self, column: &str) -> Vec<String> {
        let state = self.state();
        let TableState::Ready(data) = &*state else {
            return Vec::new();
        };
        let mut seen = HashSet::new();
        data.original
            .iter()
            .map(|row| row.text(column))
            .filter(|value| !value.is_empty() && seen.insert(value.clone()))
            .collect()
    }

    /// Subscribes to the controller's apply channel.
    pub fn connect(self: &Arc<Self>, controller: &FilterController) {
        controller.subscribe(FilterEventKind::Apply, self.clone());
        debug!(table = %self.config.table_id, "table connected to filter controller");
    }

    /// Connects once the controller is published, or gives up after `timeout`.
    pub async fn connect_when_ready(self: Arc<Self>, waiter: ReadinessWaiter, timeout: Duration) -> bool {
        match waiter.wait(timeout, &self.config.table_id).await {
            Some(controller) => {
                self.connect(&controller);
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> String {
        let state = self.state();
        let data = match &*state {
            TableState::Unloaded => return String::new(),
            TableState::Failed(message) => {
                return format!(
                    "<div class=\"table-error\" style=\"color: red; padding: 20px;\">{}</div>",
                    escape_html(message)
                )
            }
            TableState::NoColumns => {
                return format!(
                    "<div class=\"table-empty\" style=\"text-align: center; padding: 20px; color: #999;\">{NO_COLUMNS_MESSAGE}</div>"
                )
            }
            TableState::Ready(data) => data,
        };

        let mut out = String::new();
        let _ = write!(
            out,
            "<section><h2>{}</h2><table id=\"{}\"><thead><tr>",
            escape_html(&self.config.title),
            escape_html(&self.config.table_id)
        );
        for column in &data.columns {
            let active = data.sort.is_active(column);
            let icon = if active {
                data.sort.direction.icon()
            } else {
                crate::sort::SortDirection::Ascending.icon()
            };
            let escaped = escape_html(column);
            let _ = write!(
                out,
                "<th class=\"sortable{}\"><button class=\"sortable-button\" data-column=\"{escaped}\">\
                 {escaped}<span class=\"sort-icon\">{icon}</span></button></th>",
                if active { " active" } else { "" },
            );
        }
        out.push_str("</tr></thead><tbody>");

        if data.displayed.is_empty() {
            let _ = write!(
                out,
                "<tr><td colspan=\"{}\" class=\"empty-row\">{EMPTY_FILTER_MESSAGE}</td></tr>",
                data.columns.len()
            );
        }
        for &index in &data.displayed {
            let row = &data.original[index];
            out.push_str("<tr>");
            for column in &data.columns {
                let _ = write!(out, "<td>{}</td>", escape_html(&row.text(column)));
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table></section>");
        out
    }
}

impl FilterListener for FilterableTable {
    fn on_filters(&self, kind: FilterEventKind, selections: &Selections) {
        if kind == FilterEventKind::Apply {
            self.on_applied_filters_changed(selections);
        }
    }
}

/// Best-effort column for a filter group.
///
/// Picks the first column whose lowercase name contains the lowercase key, or whose
/// lowercase alphanumeric core is non-empty and contained in the key ("players" matches
/// "Player"). Falls back to the key itself.
pub fn resolve_column(columns: &[String], key: &str) -> String {
    let key_lower = key.to_lowercase();
    columns
        .iter()
        .find(|column| {
            let column_lower = column.to_lowercase();
            let core: String = column_lower
                .chars()
                .filter(char::is_ascii_alphanumeric)
                .collect();
            column_lower.contains(&key_lower) || (!core.is_empty() && key_lower.contains(&core))
        })
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

fn parse_columns(text: Option<&str>) -> Result<Vec<String>, InputError> {
    match text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => serde_json::from_str(text)
            .map_err(|err| InputError::from_json(InputField::Columns, &err)),
        None => Ok(Vec::new()),
    }
}

fn parse_rows(text: Option<&str>) -> Result<Vec<Row>, InputError> {
    match text.map(str::trim).filter(|text| !text.is_empty()) {
        Some(text) => {
            serde_json::from_str(text).map_err(|err| InputError::from_json(InputField::Rows, &err))
        }
        None => Ok(Vec::new()),
    }
}

#[cfg(test)]
#[path = "tests/table_tests.rs"]
mod tests;
