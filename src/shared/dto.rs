// Requests
pub mod create_task_request;
pub mod update_task_request;
pub mod login_request;
pub mod task_query_params;
pub mod patch;

// Responses
pub mod task_response;
pub mod page_response;
pub mod login_response;
pub mod error_response;
