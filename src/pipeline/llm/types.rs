use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::LlmError;
use crate::models::GraphRecord;

/// A chat-completion backend: one system prompt, one user prompt, raw reply text.
pub trait LlmClient: Send + Sync {
    fn complete(&self, system: &str, user: &str) -> Result<String, LlmError>;

    /// Provider name for logs.
    fn provider(&self) -> &str;
}

/// Nodes, edges and concept list returned by structure extraction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CourseStructure {
    pub nodes: Vec<GraphRecord>,
    pub edges: Vec<GraphRecord>,
    pub concepts: Vec<String>,
}

impl CourseStructure {
    /// Read the reply leniently: missing keys become empty lists,
    /// non-object nodes/edges and non-string concepts are skipped.
    pub fn from_value(value: &Value) -> Self {
        Self {
            nodes: records(value.get("nodes")),
            edges: records(value.get("edges")),
            concepts: strings(value.get("concepts")),
        }
    }
}

/// A suggested relation from a concept of the current course to one in
/// an earlier course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossLink {
    pub from_concept: String,
    pub to_course: String,
    pub to_concept: String,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Concepts of a previously stored course, as sent to the cross-linker.
#[derive(Debug, Clone, Serialize)]
pub struct CourseConcepts {
    pub name: String,
    pub concepts: Vec<String>,
}

fn records(value: Option<&Value>) -> Vec<GraphRecord> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()
        })
        .unwrap_or_default()
}

pub(crate) fn strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
