//! Profile endpoints and the admin user list

use super::Pagination;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vitrine_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{PublicUser, UpdateUser, User},
};

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 255, message = "Informe seu nome"))]
    pub name: Option<String>,

    #[validate(email(message = "E-mail inválido"))]
    pub email: Option<String>,

    pub password: Option<String>,

    /// Empty string clears the avatar
    #[validate(length(max = 512, message = "URL muito longa"))]
    pub avatar: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserListResponse {
    pub users: Vec<PublicUser>,
    pub total: i64,
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<PublicUser>> {
    req.validate()?;

    let password_hash = match req.password.as_deref() {
        Some(new_password) => {
            password::validate_password_strength(new_password)
                .map_err(|message| ApiError::invalid_field("password", message))?;
            Some(password::hash_password(new_password)?)
        }
        None => None,
    };

    let update = UpdateUser {
        name: req.name.map(|name| name.trim().to_string()),
        email: req.email,
        password_hash,
        avatar: req
            .avatar
            .map(|avatar| Some(avatar).filter(|a| !a.trim().is_empty())),
    };

    if update.is_empty() {
        return Err(ApiError::BadRequest("Nada para atualizar".to_string()));
    }

    let user = User::update(&state.db, auth.user_id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Usuário não encontrado".to_string()))?;

    Ok(Json(user.into()))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> ApiResult<Json<UserListResponse>> {
    let users = User::list(&state.db, page.limit(), page.offset()).await?;
    let total = User::count(&state.db).await?;

    Ok(Json(UserListResponse {
        users: users.into_iter().map(PublicUser::from).collect(),
        total,
    }))
}
