use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputField {
    Columns,
    Rows,
}

impl InputField {
    pub fn as_str(self) -> &'static str {
        match self {
            InputField::Columns => "columns",
            InputField::Rows => "data",
        }
    }
}

/// Externally supplied declarative text that failed to parse.
///
/// Components recover from this locally by rendering [`InputError::inline_message`].
#[derive(Debug, Clone, Error)]
#[error("error parsing {}: {message}", field.as_str())]
pub struct InputError {
    pub field: InputField,
    pub message: String,
}

impl InputError {
    pub fn new(field: InputField, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }

    pub fn from_json(field: InputField, err: &serde_json::Error) -> Self {
        Self::new(field, err.to_string())
    }

    /// User-facing text shown in place of the component.
    pub fn inline_message(&self) -> String {
        let what = match self.field {
            InputField::Columns => "table columns",
            InputField::Rows => "table data",
        };
        format!("Error parsing {what}: {}", self.message)
    }
}
