use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    create_task_request::CreateTaskRequest, task_priority::TaskPriority,
    task_response::TaskResponse, task_status::TaskStatus,
    update_task_request::UpdateTaskRequest,
};

/// A persisted task. Stored as a postcard-encoded row keyed by `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A task that has not been stored yet. The data context assigns the id
/// and both timestamps on insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(request: CreateTaskRequest) -> Self {
        Self {
            title: request.title.unwrap_or_default(),
            description: request.description,
            status: request.status.unwrap_or_default(),
            priority: request.priority.unwrap_or_default(),
            due_date: request.due_date,
        }
    }

    pub fn into_task(self, id: u64, now: DateTime<Utc>) -> Task {
        Task {
            id,
            title: self.title,
            description: self.description,
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Task {
    /// Merge a partial update. Only fields that carry a value overwrite;
    /// omitted and explicit null fields stay as they are.
    pub fn apply(&mut self, request: UpdateTaskRequest) {
        request.title.apply_to_required(&mut self.title);
        request.description.apply_to(&mut self.description);
        request.status.apply_to_required(&mut self.status);
        request.priority.apply_to_required(&mut self.priority);
        request.due_date.apply_to(&mut self.due_date);
    }

    pub fn to_response(&self) -> TaskResponse {
        TaskResponse {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            status: self.status,
            priority: self.priority,
            due_date: self.due_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}
