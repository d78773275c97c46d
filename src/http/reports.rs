use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::envelope::ApiResponse;
use crate::models::Report;
use crate::page::{paginate, Page, PageParams};
use crate::validate::{validate_report, FieldError, Validated};

use super::{error::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    page: Option<String>,
    page_size: Option<String>,
    student_id: Option<String>,
}

/// Lists reports, optionally narrowed to one student by exact id match
/// before the page window is applied.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<Report>>>, ApiError> {
    let params = PageParams::from_query(query.page.as_deref(), query.page_size.as_deref());
    let reports = state
        .store
        .list_reports()
        .map_err(|e| ApiError::internal("Failed to fetch reports", e))?;
    let reports = match query.student_id.as_deref() {
        Some(student_id) if !student_id.is_empty() => reports
            .into_iter()
            .filter(|r| r.student_id == student_id)
            .collect(),
        _ => reports,
    };
    Ok(Json(ApiResponse::ok(paginate(reports, &params))))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Report>>), ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::Internal {
        context: "Failed to create report",
        detail: rejection.body_text(),
    })?;
    let new = match validate_report(&body) {
        Validated::Valid(new) => new,
        Validated::Invalid(fields) => return Err(ApiError::Validation(fields)),
    };
    // Schema checks stay pure; the referential check needs the store.
    let known = state
        .store
        .find_student(&new.student_id)
        .map_err(|e| ApiError::internal("Failed to create report", e))?;
    if known.is_none() {
        return Err(ApiError::Validation(vec![FieldError {
            field: "studentId",
            message: "must reference an existing student".into(),
        }]));
    }
    let report = state
        .store
        .append_report(new)
        .map_err(|e| ApiError::internal("Failed to create report", e))?;
    debug!(id = %report.id, student = %report.student_id, "report created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            report,
            "Report created successfully",
        )),
    ))
}
