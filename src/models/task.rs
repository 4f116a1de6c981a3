use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::TaskStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub content: String,
    pub status: TaskStatus,
    pub course_id: Uuid,
    pub owner_id: Uuid,
    pub date: NaiveDateTime,
    pub is_completed: bool,
}

impl Task {
    pub fn pending(content: &str, course_id: Uuid, owner_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.to_string(),
            status: TaskStatus::Pending,
            course_id,
            owner_id,
            date: chrono::Utc::now().naive_utc(),
            is_completed: false,
        }
    }

    /// Move to `status`, keeping `is_completed` in step with it.
    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
        self.is_completed = status == TaskStatus::Completed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_flag_follows_status() {
        let mut task = Task::pending("Read chapter 1", Uuid::new_v4(), Uuid::new_v4());
        assert!(!task.is_completed);

        task.set_status(TaskStatus::Completed);
        assert!(task.is_completed);

        task.set_status(TaskStatus::Skipped);
        assert!(!task.is_completed);

        task.set_status(TaskStatus::Pending);
        assert!(!task.is_completed);
    }
}
