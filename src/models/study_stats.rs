use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Completed-task tally for one student on one day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyStats {
    pub owner_id: Uuid,
    pub date: NaiveDate,
    pub completed_count: i64,
}
