use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::{task_priority::TaskPriority, task_status::TaskStatus};

pub const TITLE_MAX_LENGTH: usize = 255;
pub const DESCRIPTION_MAX_LENGTH: usize = 2000;

/// Field name → message, in field-name order.
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    // Missing or null titles are reported as field errors, not a malformed body.
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        check_title(self.title.as_deref().unwrap_or_default(), &mut errors);
        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

pub(crate) fn check_title(title: &str, errors: &mut FieldErrors) {
    if title.trim().is_empty() {
        errors.insert("title".into(), "Title is required".into());
    } else if title.chars().count() > TITLE_MAX_LENGTH {
        errors.insert(
            "title".into(),
            format!("Title must not exceed {TITLE_MAX_LENGTH} characters"),
        );
    }
}

pub(crate) fn check_description(description: &str, errors: &mut FieldErrors) {
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        errors.insert(
            "description".into(),
            format!("Description must not exceed {DESCRIPTION_MAX_LENGTH} characters"),
        );
    }
}
