use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use serde::Deserialize;
use shared::domain::SelectionMode;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    pub canvas_id: String,
    pub table_id: String,
    pub table_title: String,
    pub notice_ttl_ms: u64,
    pub ready_timeout_ms: u64,
    pub filters: Vec<FilterSettings>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    pub key: String,
    pub label: String,
    #[serde(default)]
    pub mode: SelectionMode,
    /// Option list as text: a JSON array of strings or `{value, label}` objects, or a
    /// comma-separated list.
    #[serde(default)]
    pub options: Option<String>,
    /// Fills the options from the distinct values of this table column instead.
    #[serde(default)]
    pub options_column: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    /// Whether applied values of this group filter the table rows; chart-only groups set false.
    #[serde(default = "filters_table_default")]
    pub filters_table: bool,
}

fn filters_table_default() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".into(),
            canvas_id: "lineChart".into(),
            table_id: "data-table".into(),
            table_title: "Data Table".into(),
            notice_ttl_ms: 2000,
            ready_timeout_ms: 5000,
            filters: vec![
                FilterSettings {
                    key: "players".into(),
                    label: "Players".into(),
                    mode: SelectionMode::Multi,
                    options: None,
                    options_column: Some("Player".into()),
                    default: None,
                    filters_table: true,
                },
                FilterSettings {
                    key: "stat".into(),
                    label: "Stat".into(),
                    mode: SelectionMode::Single,
                    options: Some(
                        r#"[{"value":"attack_stars","label":"Attack Stars"},{"value":"defense_stars","label":"Defense Stars"},{"value":"destruction","label":"Destruction"}]"#
                            .into(),
                    ),
                    options_column: None,
                    default: Some("attack_stars".into()),
                    filters_table: false,
                },
            ],
        }
    }
}

impl Settings {
    pub fn notice_ttl(&self) -> Duration {
        Duration::from_millis(self.notice_ttl_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

/// Defaults, overlaid by `path` when it exists, then by environment variables.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("failed to parse settings file '{}'", path.display()))?,
        Err(_) => Settings::default(),
    };
    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<Settings> {
    Ok(toml::from_str(raw)?)
}

pub fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("DASHBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = var("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = var("APP__TABLE_TITLE") {
        settings.table_title = v;
    }

    if let Some(v) = var("APP__NOTICE_TTL_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.notice_ttl_ms = parsed;
        }
    }
    if let Some(v) = var("APP__READY_TIMEOUT_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.ready_timeout_ms = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
