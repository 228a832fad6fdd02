//! Landing page endpoints
//!
//! - `GET  /landpages`: pages owned by the caller
//! - `POST /landpages`: create a page from a template
//! - `GET  /landpages/templates/:objective`: template catalog
//! - `GET  /landpages/:id/config`: stored row, nested sections and legacy columns
//! - `PUT  /landpages/:id/config`: apply an update and persist
//! - `POST /landpages/upload-photo`: store a consultant photo
//!
//! Writes require a valid `landpage` grant. Updates are merged into the
//! canonical configuration server-side and the legacy columns are rewritten
//! from it, whatever the body carried for them.

use super::access::require_access;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;
use vitrine_shared::{
    auth::{authorization::require_owner, middleware::AuthContext},
    landing::{
        config::{CreateLandingPageRequest, LandingPageConfig},
        slug::is_valid_digital_name,
        templates::{templates_for, Template},
    },
    models::{landing_page::LandingPageRecord, product::ProductType},
};

/// Accepted photo types and the extension they are stored with
const IMAGE_TYPES: [(&str, &str); 3] = [
    ("image/jpeg", "jpg"),
    ("image/png", "png"),
    ("image/webp", "webp"),
];

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

async fn owned_page(state: &AppState, auth: &AuthContext, id: i64) -> ApiResult<LandingPageRecord> {
    let page = LandingPageRecord::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Página não encontrada".to_string()))?;

    require_owner(auth, page.user_id)?;
    Ok(page)
}

/// Checks a configuration before it is written
fn check_config(config: &LandingPageConfig) -> ApiResult<()> {
    if !is_valid_digital_name(&config.digital_name) {
        return Err(ApiError::invalid_field(
            "digitalName",
            "Use apenas letras minúsculas, números e hífens",
        ));
    }

    if config.published {
        let problems = config.publish_problems();
        if !problems.is_empty() {
            return Err(ApiError::ValidationError(
                problems.into_iter().map(ValidationErrorDetail::from).collect(),
            ));
        }
    }

    Ok(())
}

pub async fn list_pages(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<LandingPageRecord>>> {
    let pages = LandingPageRecord::list_by_user(&state.db, auth.user_id).await?;
    Ok(Json(pages))
}

/// Creates a page seeded from its template
///
/// The digital name is normalised (`"Meu Site!"` becomes `meu-site`).
///
/// # Errors
///
/// - `422`: name normalises to nothing
/// - `403`: no `landpage` access
/// - `409`: digital name taken
pub async fn create_page(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateLandingPageRequest>,
) -> ApiResult<(StatusCode, Json<LandingPageRecord>)> {
    req.validate()?;

    let config = LandingPageConfig::draft(req.objective, &req.digital_name, req.template_id.as_deref());
    check_config(&config)?;

    require_access(&state, &auth, ProductType::Landpage).await?;

    let page = LandingPageRecord::create(&state.db, auth.user_id, &config).await?;
    tracing::info!(
        page_id = page.id,
        user_id = auth.user_id,
        digital_name = %page.digital_name,
        "Landing page created"
    );

    Ok((StatusCode::CREATED, Json(page)))
}

/// Templates for `client` or `consultant`; any other objective yields `[]`
pub async fn list_templates(Path(objective): Path<String>) -> Json<&'static [Template]> {
    Json(templates_for(&objective))
}

pub async fn get_config(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
) -> ApiResult<Json<LandingPageRecord>> {
    Ok(Json(owned_page(&state, &auth, id).await?))
}

/// Applies a configuration update
///
/// The body is the editor's save payload; only the canonical camelCase keys
/// are read. Publishing an incomplete page is rejected with the offending
/// fields.
pub async fn update_config(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<LandingPageRecord>> {
    let page = owned_page(&state, &auth, id).await?;
    require_access(&state, &auth, ProductType::Landpage).await?;

    let mut config = LandingPageConfig::from_record(&page);
    config.apply_update(&body)?;
    check_config(&config)?;

    let saved = LandingPageRecord::save_config(&state.db, id, &config)
        .await?
        .ok_or_else(|| ApiError::NotFound("Página não encontrada".to_string()))?;

    tracing::info!(
        page_id = id,
        published = saved.published,
        "Landing page configuration saved"
    );

    Ok(Json(saved))
}

/// Stores an image from the first file field of a multipart body
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload inválido: {e}")))?
        .ok_or_else(|| ApiError::invalid_field("photo", "Nenhum arquivo enviado"))?;

    let content_type = field.content_type().unwrap_or_default().to_string();
    let extension = IMAGE_TYPES
        .iter()
        .find(|(mime, _)| *mime == content_type)
        .map(|(_, ext)| *ext)
        .ok_or_else(|| ApiError::invalid_field("photo", "Envie uma imagem JPEG, PNG ou WebP"))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload inválido: {e}")))?;

    if data.is_empty() {
        return Err(ApiError::invalid_field("photo", "Arquivo vazio"));
    }
    if data.len() > state.config.uploads.max_bytes {
        return Err(ApiError::invalid_field("photo", "Arquivo maior que o permitido"));
    }

    let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
    let path = state.config.uploads.dir.join(&file_name);

    tokio::fs::write(&path, &data).await.map_err(|e| {
        ApiError::InternalError(format!("Failed to write upload {}: {e}", path.display()))
    })?;

    tracing::info!(user_id = auth.user_id, file = %file_name, bytes = data.len(), "Photo uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url: state.config.upload_url(&file_name),
        }),
    ))
}
