//! Declared filter groups: key, label, selectable options, selection mode and default.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use shared::domain::{FilterGroupKey, OptionValue, SelectionMode};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub value: OptionValue,
    pub label: String,
}

impl FilterOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: OptionValue::new(value),
            label: label.into(),
        }
    }

    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self::new(value.clone(), value)
    }
}

/// Wire shape of one option: a bare scalar or a `{value, label}` object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Labeled {
        value: serde_json::Value,
        label: serde_json::Value,
    },
    Scalar(serde_json::Value),
}

impl RawOption {
    fn into_option(self) -> FilterOption {
        match self {
            RawOption::Labeled { value, label } => {
                FilterOption::new(scalar_text(&value), scalar_text(&label))
            }
            RawOption::Scalar(value) => FilterOption::plain(scalar_text(&value)),
        }
    }
}

fn scalar_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Parses a declarative option list.
///
/// Accepts a JSON array of scalars or `{value, label}` objects. Text that is not valid JSON
/// falls back to a comma-separated list. Duplicate values keep their first occurrence.
pub fn parse_options(raw: Option<&str>) -> Vec<FilterOption> {
    let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Vec::new();
    };

    let options = match serde_json::from_str::<Vec<RawOption>>(raw) {
        Ok(parsed) => parsed.into_iter().map(RawOption::into_option).collect(),
        Err(err) => {
            debug!(error = %err, "options are not a JSON list; falling back to comma separated");
            raw.split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(FilterOption::plain)
                .collect()
        }
    };
    dedupe_options(options)
}

fn dedupe_options(options: Vec<FilterOption>) -> Vec<FilterOption> {
    let mut seen = HashSet::new();
    options
        .into_iter()
        .filter(|option| {
            let fresh = seen.insert(option.value.clone());
            if !fresh {
                warn!(value = %option.value, "dropping duplicate filter option");
            }
            fresh
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterDescriptor {
    pub key: FilterGroupKey,
    pub label: String,
    pub options: Vec<FilterOption>,
    pub mode: SelectionMode,
    pub default: Option<OptionValue>,
}

impl FilterDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: FilterGroupKey::new(key),
            label: label.into(),
            options: Vec::new(),
            mode: SelectionMode::Multi,
            default: None,
        }
    }

    pub fn with_options(mut self, options: Vec<FilterOption>) -> Self {
        self.options = dedupe_options(options);
        self
    }

    pub fn single_select(mut self) -> Self {
        self.mode = SelectionMode::Single;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default = Some(OptionValue::new(value));
        self
    }

    pub fn option(&self, value: &str) -> Option<&FilterOption> {
        self.options.iter().find(|option| option.value.as_str() == value)
    }

    pub fn placeholder(&self) -> String {
        format!("Select {}", self.label)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("filter group '{0}' is already registered")]
    DuplicateGroup(FilterGroupKey),
    #[error("default '{value}' is not an option of filter group '{key}'")]
    UnknownDefault {
        key: FilterGroupKey,
        value: OptionValue,
    },
}

/// Ordered collection of the page's filter groups.
#[derive(Debug, Clone, Default)]
pub struct FilterRegistry {
    descriptors: Vec<FilterDescriptor>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: FilterDescriptor) -> Result<(), RegistryError> {
        if self.get(descriptor.key.as_str()).is_some() {
            return Err(RegistryError::DuplicateGroup(descriptor.key));
        }
        if let Some(default) = &descriptor.default {
            if descriptor.option(default.as_str()).is_none() {
                return Err(RegistryError::UnknownDefault {
                    key: descriptor.key,
                    value: default.clone(),
                });
            }
        }
        debug!(
            group = %descriptor.key,
            options = descriptor.options.len(),
            mode = ?descriptor.mode,
            "registered filter group"
        );
        self.descriptors.push(descriptor);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&FilterDescriptor> {
        self.descriptors
            .iter()
            .find(|descriptor| descriptor.key.as_str() == key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterDescriptor> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
