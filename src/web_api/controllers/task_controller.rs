use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use tracing::debug;

use crate::{
    app_state::SharedState,
    create_task_request::CreateTaskRequest,
    page_response::PageResponse,
    task_query_params::{InvalidParameter, TaskQueryParams},
    task_response::TaskResponse,
    update_task_request::UpdateTaskRequest,
    user::User,
    web_api::{error::ApiError, routes::task_routes::ROUTER_PATH},
};

pub struct TaskController {}

fn parse_task_id(raw: &str) -> Result<u64, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| InvalidParameter::new("id", raw).into())
}

impl TaskController {
    pub async fn create(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        payload: Result<Json<CreateTaskRequest>, JsonRejection>,
    ) -> Result<impl IntoResponse, ApiError> {
        let Json(request) = payload?;
        debug!(username = %user.username, "create task requested");

        let task = state.task_service.create(request)?;
        let location = format!("{}/{}", ROUTER_PATH, task.id);
        Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
    }

    pub async fn get_by_id(
        State(state): State<SharedState>,
        Path(id): Path<String>,
    ) -> Result<Json<TaskResponse>, ApiError> {
        let id = parse_task_id(&id)?;
        Ok(Json(state.task_service.get_by_id(id)?))
    }

    pub async fn get_all(
        State(state): State<SharedState>,
        params: Result<Query<TaskQueryParams>, QueryRejection>,
    ) -> Result<Json<PageResponse<TaskResponse>>, ApiError> {
        let Query(params) = params?;
        let (filter, page_request) = params.into_query(state.settings.max_page_size)?;

        let page = state.task_service.get_all(&filter, &page_request)?;
        Ok(Json(PageResponse::from(page)))
    }

    pub async fn update(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<String>,
        payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
    ) -> Result<Json<TaskResponse>, ApiError> {
        let id = parse_task_id(&id)?;
        let Json(request) = payload?;
        debug!(username = %user.username, task_id = id, "update task requested");

        Ok(Json(state.task_service.update(id, request)?))
    }

    pub async fn delete(
        State(state): State<SharedState>,
        Extension(user): Extension<User>,
        Path(id): Path<String>,
    ) -> Result<StatusCode, ApiError> {
        let id = parse_task_id(&id)?;
        debug!(username = %user.username, task_id = id, "delete task requested");

        state.task_service.delete(id)?;
        Ok(StatusCode::NO_CONTENT)
    }
}
