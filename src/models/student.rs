use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::ThinkingType;

/// A learner. Rows live in the `user` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: Uuid,
    pub username: String,
    pub thinking_type: ThinkingType,
    /// Reward counter, accrued one per completed task.
    pub carrots: i64,
    pub created_at: NaiveDateTime,
}

impl Student {
    pub fn new(username: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            username: username.to_string(),
            thinking_type: ThinkingType::default(),
            carrots: 0,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
