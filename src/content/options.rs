use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::normalize::text_of;

/// An answer option as authored: either bare text or a labelled record that
/// carries its own correctness flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum McqOption {
    PlainText(String),
    Labeled {
        text: String,
        #[serde(rename = "isCorrect", default)]
        is_correct: bool,
    },
}

impl McqOption {
    pub fn text(&self) -> &str {
        match self {
            McqOption::PlainText(text) => text,
            McqOption::Labeled { text, .. } => text,
        }
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, McqOption::Labeled { is_correct: true, .. })
    }
}

impl From<&Value> for McqOption {
    /// Never fails, so option positions stay aligned with the source array.
    fn from(value: &Value) -> Self {
        match value {
            Value::Object(map) => McqOption::Labeled {
                text: map
                    .get("text")
                    .or_else(|| map.get("label"))
                    .and_then(text_of)
                    .unwrap_or_default(),
                is_correct: map
                    .get("isCorrect")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            },
            other => McqOption::PlainText(text_of(other).unwrap_or_default()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedOptions {
    pub options: Vec<String>,
    pub correct_answer: usize,
}

/// Flattens options to display strings. An explicit index wins when it
/// points inside the list; otherwise the first `isCorrect` option is used,
/// falling back to 0.
pub fn normalize_options(raw: &[McqOption], explicit: Option<usize>) -> NormalizedOptions {
    let options: Vec<String> = raw.iter().map(|o| o.text().to_string()).collect();
    let correct_answer = match explicit {
        Some(index) if index < options.len() => index,
        _ => raw.iter().position(McqOption::is_correct).unwrap_or(0),
    };

    NormalizedOptions {
        options,
        correct_answer,
    }
}
