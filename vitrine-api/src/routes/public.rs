//! Unauthenticated landing page endpoints
//!
//! - `GET  /public/landpages/:digital_name`: configuration of a published page
//! - `POST /public/landpages/:digital_name/leads`: contact form submission

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;
use vitrine_shared::{
    landing::config::LandingPageConfig,
    models::{
        landing_page::LandingPageRecord,
        lead::{CreateLead, Lead},
    },
};

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicPageResponse {
    pub url: String,
    pub config: LandingPageConfig,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CaptureLeadRequest {
    #[validate(length(min = 2, max = 255, message = "Informe seu nome"))]
    pub name: String,

    #[validate(email(message = "E-mail inválido"))]
    pub email: String,

    #[validate(length(max = 32, message = "Telefone inválido"))]
    pub phone: Option<String>,
}

async fn published_page(state: &AppState, digital_name: &str) -> ApiResult<LandingPageRecord> {
    LandingPageRecord::find_published(&state.db, digital_name)
        .await?
        .ok_or_else(|| ApiError::NotFound("Página não encontrada".to_string()))
}

pub async fn get_page(
    State(state): State<AppState>,
    Path(digital_name): Path<String>,
) -> ApiResult<Json<PublicPageResponse>> {
    let page = published_page(&state, &digital_name).await?;
    let config = LandingPageConfig::from_record(&page);

    Ok(Json(PublicPageResponse {
        url: config.page_url(&state.config.pages.url_bases()),
        config,
    }))
}

/// Records a lead typed after the page's objective
pub async fn capture_lead(
    State(state): State<AppState>,
    Path(digital_name): Path<String>,
    Json(req): Json<CaptureLeadRequest>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    req.validate()?;

    let page = published_page(&state, &digital_name).await?;

    let lead = Lead::create(
        &state.db,
        CreateLead {
            landing_page_id: page.id,
            name: req.name.trim().to_string(),
            email: req.email,
            phone: req.phone.filter(|p| !p.trim().is_empty()),
            lead_type: page.objective,
        },
    )
    .await?;

    tracing::info!(page_id = page.id, lead_id = lead.id, "Lead captured");

    Ok((StatusCode::CREATED, Json(lead)))
}
