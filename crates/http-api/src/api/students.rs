use axum::extract::{Query, State};
use axum::Json;
use campuscard_common::error::CampusCardError;
use campuscard_student_model::{StudentRecord, TenantId};
use serde::Deserialize;

use super::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct StudentsQuery {
    pub tenant: String,
}

/// `GET /students?tenant=..` -- a tenant's records; empty when it has none.
pub async fn list_students(
    State(state): State<AppState>,
    Query(query): Query<StudentsQuery>,
) -> Result<Json<Vec<StudentRecord>>, ApiError> {
    let tenant = TenantId::new(query.tenant);
    let records = state.records.clone();
    let result = tokio::task::spawn_blocking(move || records.fetch_records_for_tenant(&tenant))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    match result {
        Ok(records) => Ok(Json(records)),
        Err(CampusCardError::NotFound { .. }) => Ok(Json(Vec::new())),
        Err(err) => Err(err.into()),
    }
}
