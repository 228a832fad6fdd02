//! Trainings
//!
//! Users see published trainings split into three categories:
//! `locked` (no training grant), `in-progress` (at least one lesson done)
//! and `available` (access but not started). Admins manage the catalog,
//! including drafts. Deleted trainings are soft-deleted and 404 everywhere.

use super::{products::double_option, MessageResponse};
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use std::collections::HashMap;
use validator::Validate;
use vitrine_shared::{
    access::AccessGate,
    auth::middleware::AuthContext,
    models::{
        product::ProductType,
        training::{
            CreateLesson, CreateTraining, Lesson, Training, TrainingCategory, TrainingModule,
            TrainingProgress, TrainingStatus, TrainingSummary, TrainingTree, UpdateTraining,
        },
    },
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTrainingRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o título do treinamento"))]
    pub title: String,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrainingRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o título do treinamento"))]
    pub title: Option<String>,

    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,

    #[serde(default, deserialize_with = "double_option")]
    pub thumbnail: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateModuleRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o título do módulo"))]
    pub title: String,
    /// Defaults to the end of the training
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateLessonRequest {
    #[validate(length(min = 1, max = 255, message = "Informe o título da aula"))]
    pub title: String,

    #[validate(url(message = "URL de vídeo inválida"))]
    pub video_url: Option<String>,

    pub content: Option<String>,

    /// Defaults to the end of the module
    pub position: Option<i32>,
}

fn parse_status(value: &str) -> ApiResult<TrainingStatus> {
    TrainingStatus::parse(value).ok_or_else(|| ApiError::BadRequest("Status inválido".to_string()))
}

fn not_found() -> ApiError {
    ApiError::NotFound("Treinamento não encontrado".to_string())
}

/// Keeps the trainings that fall into `category` for one user
fn categorize(
    trainings: Vec<Training>,
    has_access: bool,
    progress: &[TrainingProgress],
    category: TrainingCategory,
) -> Vec<TrainingSummary> {
    let by_training: HashMap<i64, &TrainingProgress> =
        progress.iter().map(|p| (p.training_id, p)).collect();

    trainings
        .into_iter()
        .filter_map(|training| {
            let progress = by_training.get(&training.id).copied();
            if TrainingCategory::classify(has_access, progress) != category {
                return None;
            }
            Some(TrainingSummary {
                progress_percent: progress.map_or(0, TrainingProgress::percent),
                training,
            })
        })
        .collect()
}

async fn list_category(
    state: &AppState,
    auth: &AuthContext,
    category: TrainingCategory,
) -> ApiResult<Vec<TrainingSummary>> {
    let trainings = Training::list(&state.db, Some(TrainingStatus::Published)).await?;
    let has_access = AccessGate::check(&state.db, auth.user_id, ProductType::Training).await?;
    let progress = if has_access {
        Training::progress_for_user(&state.db, auth.user_id).await?
    } else {
        Vec::new()
    };

    Ok(categorize(trainings, has_access, &progress, category))
}

pub async fn list_in_progress(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TrainingSummary>>> {
    Ok(Json(list_category(&state, &auth, TrainingCategory::InProgress).await?))
}

pub async fn list_locked(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TrainingSummary>>> {
    Ok(Json(list_category(&state, &auth, TrainingCategory::Locked).await?))
}

pub async fn list_available(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<TrainingSummary>>> {
    Ok(Json(list_category(&state, &auth, TrainingCategory::Available).await?))
}

/// Full module/lesson tree of a published training; requires a training grant
pub async fn get_training(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TrainingTree>> {
    let tree = Training::load_tree(&state.db, id)
        .await?
        .filter(|tree| tree.training.status == TrainingStatus::Published)
        .ok_or_else(not_found)?;

    super::access::require_access(&state, &auth, ProductType::Training).await?;

    Ok(Json(tree))
}

/// Marks a lesson complete for the caller; repeating it is a no-op
pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(lesson_id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    let training_id = Lesson::published_training_id(&state.db, lesson_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Aula não encontrada".to_string()))?;

    super::access::require_access(&state, &auth, ProductType::Training).await?;

    Lesson::mark_complete(&state.db, auth.user_id, lesson_id).await?;
    tracing::debug!(user_id = auth.user_id, lesson_id, training_id, "Lesson completed");

    Ok(Json(MessageResponse::ok("Aula concluída")))
}

/// `GET /admin/trainings?status=draft|published`
pub async fn admin_list(
    State(state): State<AppState>,
    Query(filter): Query<StatusFilter>,
) -> ApiResult<Json<Vec<Training>>> {
    let status = filter.status.as_deref().map(parse_status).transpose()?;
    Ok(Json(Training::list(&state.db, status).await?))
}

/// Creates a draft training
pub async fn admin_create(
    State(state): State<AppState>,
    Json(req): Json<CreateTrainingRequest>,
) -> ApiResult<(StatusCode, Json<Training>)> {
    req.validate()?;

    let training = Training::create(
        &state.db,
        CreateTraining {
            title: req.title,
            description: req.description,
            thumbnail: req.thumbnail,
        },
    )
    .await?;

    tracing::info!(training_id = training.id, "Training created");
    Ok((StatusCode::CREATED, Json(training)))
}

pub async fn admin_update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTrainingRequest>,
) -> ApiResult<Json<Training>> {
    req.validate()?;

    let training = Training::update(
        &state.db,
        id,
        UpdateTraining {
            title: req.title,
            description: req.description,
            thumbnail: req.thumbnail,
        },
    )
    .await?
    .ok_or_else(not_found)?;

    Ok(Json(training))
}

pub async fn admin_delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<MessageResponse>> {
    if !Training::soft_delete(&state.db, id).await? {
        return Err(not_found());
    }

    tracing::info!(training_id = id, "Training deleted");
    Ok(Json(MessageResponse::ok("Treinamento removido")))
}

/// `PATCH /admin/trainings/:id/status`
///
/// The status is checked before the training is looked up, so an invalid
/// value is a 400 even for a missing training.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<StatusRequest>,
) -> ApiResult<Json<Training>> {
    let status = parse_status(&req.status)?;

    let training = Training::update_status(&state.db, id, status)
        .await?
        .ok_or_else(not_found)?;

    tracing::info!(training_id = id, status = status.as_str(), "Training status changed");
    Ok(Json(training))
}

pub async fn create_module(
    State(state): State<AppState>,
    Path(training_id): Path<i64>,
    Json(req): Json<CreateModuleRequest>,
) -> ApiResult<(StatusCode, Json<TrainingModule>)> {
    req.validate()?;

    Training::find_active(&state.db, training_id)
        .await?
        .ok_or_else(not_found)?;

    let position = match req.position {
        Some(position) => position,
        None => next_position(TrainingModule::list_by_training(&state.db, training_id).await?.len()),
    };

    let module = TrainingModule::create(&state.db, training_id, &req.title, position).await?;
    Ok((StatusCode::CREATED, Json(module)))
}

pub async fn create_lesson(
    State(state): State<AppState>,
    Path(module_id): Path<i64>,
    Json(req): Json<CreateLessonRequest>,
) -> ApiResult<(StatusCode, Json<Lesson>)> {
    req.validate()?;

    let module = TrainingModule::find_active(&state.db, module_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Módulo não encontrado".to_string()))?;

    let position = match req.position {
        Some(position) => position,
        None => {
            let lessons = Lesson::list_by_training(&state.db, module.training_id).await?;
            next_position(lessons.iter().filter(|l| l.module_id == module.id).count())
        }
    };

    let lesson = Lesson::create(
        &state.db,
        CreateLesson {
            module_id,
            title: req.title,
            video_url: req.video_url,
            content: req.content,
            position,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(lesson)))
}

fn next_position(existing: usize) -> i32 {
    i32::try_from(existing).map_or(i32::MAX, |n| n.saturating_add(1))
}
