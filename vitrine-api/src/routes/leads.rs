//! Lead listing and export for page owners

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use chrono::Utc;
use serde::Deserialize;
use vitrine_shared::{
    auth::middleware::AuthContext,
    landing::{
        export::{export_file_name, leads_to_csv},
        Objective,
    },
    models::lead::Lead,
};

#[derive(Debug, Default, Deserialize)]
pub struct LeadFilter {
    #[serde(rename = "type")]
    pub lead_type: Option<String>,
}

impl LeadFilter {
    fn objective(&self) -> ApiResult<Option<Objective>> {
        match self.lead_type.as_deref() {
            None | Some("") | Some("all") => Ok(None),
            Some(value) => Objective::parse(value)
                .map(Some)
                .ok_or_else(|| ApiError::BadRequest("Tipo de lead inválido".to_string())),
        }
    }
}

/// `GET /landpage/leads?type=client|consultant`
pub async fn list_leads(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<LeadFilter>,
) -> ApiResult<Json<Vec<Lead>>> {
    let objective = filter.objective()?;
    let leads = Lead::list_by_owner(&state.db, auth.user_id, objective).await?;
    Ok(Json(leads))
}

/// `GET /landpage/leads/export`: CSV download, same filter as the list
pub async fn export_leads(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(filter): Query<LeadFilter>,
) -> ApiResult<impl IntoResponse> {
    let objective = filter.objective()?;
    let leads = Lead::list_by_owner(&state.db, auth.user_id, objective).await?;

    let file_name = export_file_name(Utc::now().date_naive());
    let disposition = format!("attachment; filename=\"{file_name}\"");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        leads_to_csv(&leads),
    ))
}
