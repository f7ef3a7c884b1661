use std::{
    borrow::Borrow,
    collections::{btree_map, BTreeMap, BTreeSet},
    fmt,
};

use serde::{Deserialize, Serialize};

macro_rules! key_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

key_newtype!(FilterGroupKey);
key_newtype!(OptionValue);

/// Group key whose applied values drive the chart's player series.
pub const PLAYERS_GROUP: &str = "players";
/// Single-select group naming the statistic plotted on the chart.
pub const STAT_GROUP: &str = "stat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    #[default]
    Multi,
    Single,
}

/// Per-group option sets keyed by filter group.
///
/// Used for both the pending (live control) state and the applied snapshot. Each group is a
/// set, so duplicates collapse and iteration order is sorted rather than insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selections(BTreeMap<FilterGroupKey, BTreeSet<OptionValue>>);

impl Selections {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_group(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Adds an empty set for `key` if the group is unknown. Returns whether it was added.
    pub fn ensure_group(&mut self, key: &FilterGroupKey) -> bool {
        if self.0.contains_key(key.as_str()) {
            return false;
        }
        self.0.insert(key.clone(), BTreeSet::new());
        true
    }

    pub fn set_group(
        &mut self,
        key: FilterGroupKey,
        values: impl IntoIterator<Item = OptionValue>,
    ) {
        self.0.insert(key, values.into_iter().collect());
    }

    pub fn group(&self, key: &str) -> Option<&BTreeSet<OptionValue>> {
        self.0.get(key)
    }

    /// Values for `key`, or an empty set when the group was never registered.
    pub fn values(&self, key: &str) -> BTreeSet<OptionValue> {
        self.0.get(key).cloned().unwrap_or_default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FilterGroupKey> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FilterGroupKey, BTreeSet<OptionValue>> {
        self.0.iter()
    }

    /// Groups with at least one selected value.
    pub fn active_groups(&self) -> impl Iterator<Item = (&FilterGroupKey, &BTreeSet<OptionValue>)> {
        self.0.iter().filter(|(_, values)| !values.is_empty())
    }

    pub fn has_active(&self) -> bool {
        self.active_groups().next().is_some()
    }

    pub fn clear_values(&mut self) {
        for values in self.0.values_mut() {
            values.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V, I> FromIterator<(K, I)> for Selections
where
    K: Into<FilterGroupKey>,
    I: IntoIterator<Item = V>,
    V: Into<OptionValue>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, values)| (key.into(), values.into_iter().map(Into::into).collect()))
                .collect(),
        )
    }
}

/// A single scalar cell as it arrives in externally supplied row data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Display text of the cell; null renders as the empty string.
    pub fn text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Number(value) => number_text(value),
            CellValue::Text(value) => value.clone(),
        }
    }
}

/// Integral floats print without a fraction ("5.0" reads as "5") so cells match the
/// selections and options derived from them.
fn number_text(value: &serde_json::Number) -> String {
    match value.as_f64() {
        Some(float) if !value.is_i64() && !value.is_u64() => {
            if float == 0.0 {
                "0".to_string()
            } else if float.is_finite() && float.fract() == 0.0 && float.abs() < 1e21 {
                format!("{float:.0}")
            } else {
                float.to_string()
            }
        }
        _ => value.to_string(),
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value.into())
    }
}

/// One loaded table row: column name to cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<CellValue>) -> Self {
        self.0.insert(column.into(), value.into());
        self
    }

    /// Cell for `column`; `None` when the row has no such key.
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column)
    }

    /// Present, non-null cell for `column`.
    pub fn value(&self, column: &str) -> Option<&CellValue> {
        self.0.get(column).filter(|value| !value.is_null())
    }

    pub fn text(&self, column: &str) -> String {
        self.0.get(column).map(CellValue::text).unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
