use axum::{extract::rejection::JsonRejection, extract::State, Json};

use crate::{
    app_state::SharedState, authentication::auth, login_request::LoginRequest,
    login_response::LoginResponse, web_api::error::ApiError,
};

pub struct AuthenticationController {}

impl AuthenticationController {
    pub async fn login(
        State(state): State<SharedState>,
        payload: Result<Json<LoginRequest>, JsonRejection>,
    ) -> Result<Json<LoginResponse>, ApiError> {
        let Json(payload) = payload?;
        auth::login(&state, payload)
    }
}
