use std::sync::Arc;

use crate::{
    data_access::data_context::DataContext, services::task_service::TaskService,
    settings::Settings,
};

pub struct AppState {
    pub data_context: DataContext,
    pub task_service: TaskService,
    pub settings: Settings,
}

impl AppState {
    pub fn new(data_context: DataContext, settings: Settings) -> Self {
        Self {
            task_service: TaskService::new(data_context.clone()),
            data_context,
            settings,
        }
    }
}

pub type SharedState = Arc<AppState>;
