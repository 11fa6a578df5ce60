pub mod authentication_routes;
pub mod health_routes;
pub mod task_routes;

use axum::{middleware, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{app_state::SharedState, web_api::error::render_error_responses};

pub fn map_routes(app_state: SharedState) -> Router {
    Router::new()
        .merge(health_routes::get_router())
        .merge(authentication_routes::get_router(app_state.clone()))
        .merge(task_routes::get_router(app_state))
        .layer(middleware::from_fn(render_error_responses))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
