//! Authentication endpoints
//!
//! - `POST /auth/register`: create an account, returns tokens and the user
//! - `POST /auth/login`: exchange email/password for tokens
//! - `POST /auth/refresh`: exchange a refresh token for a new access token
//!
//! The client stores `access_token` and `user` in its session; every other
//! request carries `Authorization: Bearer <access_token>`.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vitrine_shared::{
    auth::{jwt, password},
    models::user::{CreateUser, PublicUser, User, UserRole},
};

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 2, max = 255, message = "Informe seu nome"))]
    pub name: String,

    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    #[validate(length(min = 1, message = "Informe a senha"))]
    pub password: String,
}

/// Tokens plus the user record, returned by register and login
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: PublicUser,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

fn issue_tokens(state: &AppState, user: User) -> ApiResult<AuthResponse> {
    let access = jwt::Claims::new(user.id, user.role, jwt::TokenType::Access);
    let refresh = jwt::Claims::new(user.id, user.role, jwt::TokenType::Refresh);

    Ok(AuthResponse {
        access_token: jwt::create_token(&access, state.jwt_secret())?,
        refresh_token: jwt::create_token(&refresh, state.jwt_secret())?,
        user: user.into(),
    })
}

/// Registers a regular user
///
/// # Errors
///
/// - `422`: invalid name/email or weak password
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;
    password::validate_password_strength(&req.password)
        .map_err(|message| ApiError::invalid_field("password", message))?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            name: req.name.trim().to_string(),
            email: req.email,
            password_hash,
            role: UserRole::User,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, "User registered");

    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

/// Logs in with email and password
///
/// Unknown email and wrong password produce the same 401.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("E-mail ou senha inválidos".to_string());

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Login rejected");
        return Err(invalid());
    }

    Ok(Json(issue_tokens(&state, user)?))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let access_token = jwt::refresh_access_token(&req.refresh_token, state.jwt_secret())?;
    Ok(Json(RefreshResponse { access_token }))
}
