use axum::{Router, handler::Handler, middleware, routing::get};
use crate::{app_state::SharedState, authentication::auth::auth_middleware, task_controller::TaskController};

pub const ROUTER_PATH: &str = "/api/tasks";

/// Reads are public; writes go through `auth_middleware`.
pub fn get_router(app_state: SharedState) -> Router {
    let auth = middleware::from_fn_with_state(app_state.clone(), auth_middleware);

    Router::new()
        .route(
            ROUTER_PATH,
            get(TaskController::get_all)
                .post(TaskController::create.layer(auth.clone())),
        )
        .route(
            format!("{}/:id", ROUTER_PATH).as_str(),
            get(TaskController::get_by_id)
                .put(TaskController::update.layer(auth.clone()))
                .delete(TaskController::delete.layer(auth)),
        )
        .with_state(app_state)
}
