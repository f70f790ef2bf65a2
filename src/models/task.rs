use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use super::user::UserId;

/// Maximum number of characters in a task title.
pub const MAX_TITLE_LENGTH: u64 = 200;

fn non_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Payload for creating a task. The owner never comes from the body.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewTask {
    /// The title of the task; must contain a non-whitespace character.
    #[validate(length(min = 1, max = "MAX_TITLE_LENGTH"), custom = "non_blank")]
    pub title: String,
    /// Completion flag, `false` when omitted.
    #[serde(default)]
    pub completed: bool,
}

/// Partial update of a task. Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct TaskPatch {
    #[validate(length(min = 1, max = "MAX_TITLE_LENGTH"), custom = "non_blank")]
    pub title: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.completed.is_none()
    }

    /// Merges the supplied fields into `task` and refreshes `updated_at`.
    pub fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        task.updated_at = Utc::now();
    }
}

/// Represents a task as stored in the database and returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier, assigned by the store.
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// Whether the task is done.
    pub completed: bool,
    /// The owning user. Fixed at creation.
    pub user_id: UserId,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a fresh task for `owner` with a new id and matching timestamps.
    pub fn new(input: NewTask, owner: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            completed: input.completed,
            user_id: owner,
            created_at: now,
            updated_at: now,
        }
    }
}
