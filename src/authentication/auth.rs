use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
    app_state::SharedState, login_request::LoginRequest, login_response::LoginResponse,
    settings::Settings, user::User, web_api::error::ApiError,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_token(user: &User, settings: &Settings) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let expiry = now + Duration::minutes(settings.jwt_expiration_in_minutes);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        exp: expiry.timestamp() as usize,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.jwt_secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, settings: &Settings) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

pub fn login(state: &SharedState, payload: LoginRequest) -> Result<Json<LoginResponse>, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = state
        .data_context
        .get_user_by_username(&payload.username)?
        .ok_or_else(invalid)?;

    if !verify_password(payload.password.trim(), &user.password_hash) {
        return Err(invalid());
    }

    let token = create_token(&user, &state.settings).map_err(|e| {
        tracing::error!(error = %e, "cannot sign token");
        ApiError::Internal
    })?;

    info!(username = %user.username, "user logged in");
    Ok(Json(LoginResponse { token }))
}

/// Requires `Authorization: Bearer <jwt>` and puts the caller's `User` into
/// the request extensions.
pub async fn auth_middleware(
    State(state): State<SharedState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| ApiError::Unauthorized("Missing or invalid token".to_string()))?;

    let claims = verify_token(token, &state.settings)
        .map_err(|_| ApiError::Unauthorized("Invalid token".to_string()))?;

    let user = state
        .data_context
        .get_user(claims.sub)?
        .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
