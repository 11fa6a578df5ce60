use chrono::NaiveDate;
use serde::Deserialize;

use crate::{
    create_task_request::{check_description, check_title, FieldErrors},
    patch::Patch,
    task_priority::TaskPriority,
    task_status::TaskStatus,
};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub status: Patch<TaskStatus>,
    #[serde(default)]
    pub priority: Patch<TaskPriority>,
    #[serde(default)]
    pub due_date: Patch<NaiveDate>,
}

impl UpdateTaskRequest {
    /// Only fields carrying a value are checked.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = self.title.as_value() {
            check_title(title, &mut errors);
        }
        if let Some(description) = self.description.as_value() {
            check_description(description, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
