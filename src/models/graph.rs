use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// One vis-network node or edge. Keys are open-ended.
pub type GraphRecord = Map<String, Value>;

/// Concept graph stored for a course after task generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    pub id: Uuid,
    pub course_id: Uuid,
    pub owner_id: Uuid,
    pub nodes: Vec<GraphRecord>,
    pub edges: Vec<GraphRecord>,
    pub created_at: NaiveDateTime,
}
