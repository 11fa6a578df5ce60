use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::{
    create_task_request::{CreateTaskRequest, FieldErrors},
    data_access::{
        data_context::{DataContext, DataError},
        task_query::{PageRequest, TaskFilter},
    },
    page::Page,
    task::NewTask,
    task_response::TaskResponse,
    update_task_request::UpdateTaskRequest,
};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Task not found with id: {0}")]
    NotFound(u64),
    #[error("Request body has invalid fields")]
    Validation(FieldErrors),
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Clone)]
pub struct TaskService {
    data_context: DataContext,
}

impl TaskService {
    pub fn new(data_context: DataContext) -> Self {
        Self { data_context }
    }

    #[instrument(skip_all)]
    pub fn create(&self, request: CreateTaskRequest) -> Result<TaskResponse, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;

        let task = self.data_context.insert_task(NewTask::new(request))?;
        info!(task_id = task.id, status = %task.status, priority = %task.priority, "task created");
        Ok(task.to_response())
    }

    pub fn get_by_id(&self, id: u64) -> Result<TaskResponse, ServiceError> {
        self.data_context
            .find_task(id)?
            .map(|task| task.to_response())
            .ok_or(ServiceError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub fn get_all(
        &self,
        filter: &TaskFilter,
        page_request: &PageRequest,
    ) -> Result<Page<TaskResponse>, ServiceError> {
        let page = self.data_context.find_tasks(filter, page_request)?;
        debug!(total = page.total_elements, returned = page.items.len(), "tasks listed");
        Ok(page.map(|task| task.to_response()))
    }

    #[instrument(skip(self, request))]
    pub fn update(&self, id: u64, request: UpdateTaskRequest) -> Result<TaskResponse, ServiceError> {
        request.validate().map_err(ServiceError::Validation)?;

        let task = self
            .data_context
            .update_task(id, |task| task.apply(request))?
            .ok_or(ServiceError::NotFound(id))?;
        info!(task_id = task.id, "task updated");
        Ok(task.to_response())
    }

    #[instrument(skip(self))]
    pub fn delete(&self, id: u64) -> Result<(), ServiceError> {
        if !self.data_context.delete_task(id)? {
            return Err(ServiceError::NotFound(id));
        }
        info!(task_id = id, "task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{patch::Patch, task_priority::TaskPriority, task_status::TaskStatus};
    use chrono::NaiveDate;

    fn service() -> TaskService {
        TaskService::new(DataContext::in_memory().unwrap())
    }

    fn create_request(title: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: Some(title.into()),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        }
    }

    #[test]
    fn create_defaults_status_and_priority() {
        let task = service().create(create_request("New task")).unwrap();

        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert!(task.created_at <= task.updated_at);
    }

    #[test]
    fn create_keeps_explicit_values() {
        let task = service()
            .create(CreateTaskRequest {
                status: Some(TaskStatus::InProgress),
                priority: Some(TaskPriority::High),
                due_date: NaiveDate::from_ymd_opt(2026, 10, 31),
                description: Some("carefully".into()),
                ..create_request("Write unit tests")
            })
            .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);
        assert_eq!(task.due_date, NaiveDate::from_ymd_opt(2026, 10, 31));
        assert_eq!(task.description.as_deref(), Some("carefully"));
    }

    #[test]
    fn create_rejects_blank_title_without_storing() {
        let service = service();

        let error = service.create(create_request("  ")).unwrap_err();

        assert!(matches!(error, ServiceError::Validation(ref fields) if fields.contains_key("title")));
        assert!(!service.data_context.task_exists(1).unwrap());
    }

    #[test]
    fn create_then_get_round_trips() {
        let service = service();
        let created = service.create(create_request("Round trip")).unwrap();

        assert_eq!(service.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn get_unknown_id_is_not_found() {
        let error = service().get_by_id(99).unwrap_err();

        assert!(matches!(error, ServiceError::NotFound(99)));
        assert_eq!(error.to_string(), "Task not found with id: 99");
    }

    #[test]
    fn update_title_only_leaves_other_fields() {
        let service = service();
        let created = service
            .create(CreateTaskRequest {
                description: Some("keep me".into()),
                status: Some(TaskStatus::InProgress),
                priority: Some(TaskPriority::Low),
                ..create_request("Old title")
            })
            .unwrap();

        let updated = service
            .update(
                created.id,
                UpdateTaskRequest {
                    title: Patch::Value("New title".into()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "New title");
        assert_eq!(updated.description.as_deref(), Some("keep me"));
        assert_eq!(updated.status, TaskStatus::InProgress);
        assert_eq!(updated.priority, TaskPriority::Low);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn update_unknown_id_is_not_found() {
        let service = service();

        let error = service
            .update(
                5,
                UpdateTaskRequest {
                    status: Patch::Value(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(error, ServiceError::NotFound(5)));
        assert!(!service.data_context.task_exists(5).unwrap());
    }

    #[test]
    fn update_with_blank_title_changes_nothing() {
        let service = service();
        let created = service.create(create_request("Stable")).unwrap();

        let error = service
            .update(
                created.id,
                UpdateTaskRequest {
                    title: Patch::Value(String::new()),
                    status: Patch::Value(TaskStatus::Done),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(error, ServiceError::Validation(_)));
        assert_eq!(service.get_by_id(created.id).unwrap(), created);
    }

    #[test]
    fn delete_removes_and_then_reports_not_found() {
        let service = service();
        let created = service.create(create_request("Doomed")).unwrap();

        service.delete(created.id).unwrap();

        assert!(matches!(service.get_by_id(created.id), Err(ServiceError::NotFound(_))));
        assert!(matches!(service.delete(created.id), Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn get_all_projects_every_item() {
        let service = service();
        for title in ["Write unit tests", "Deploy application", "Write documentation"] {
            service.create(create_request(title)).unwrap();
        }

        let filter = TaskFilter {
            search: Some("WRITE".into()),
            ..Default::default()
        };
        let page = service.get_all(&filter, &PageRequest::default()).unwrap();

        assert_eq!(page.total_elements, 2);
        assert!(page.items.iter().all(|task| task.title.starts_with("Write")));
    }
}
