use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::envelope::ApiResponse;
use crate::models::Student;
use crate::page::{paginate, Page, PageParams};
use crate::validate::{validate_student, Validated};

use super::{error::ApiError, state::AppState};

/// Raw query strings; parsing is deliberately lenient, so no typed numbers
/// here. Unknown parameters are ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    page: Option<String>,
    page_size: Option<String>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Page<Student>>>, ApiError> {
    let params = PageParams::from_query(query.page.as_deref(), query.page_size.as_deref());
    let students = state
        .store
        .list_students()
        .map_err(|e| ApiError::internal("Failed to fetch students", e))?;
    Ok(Json(ApiResponse::ok(paginate(students, &params))))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Student>>), ApiError> {
    // Unreadable bodies are an infrastructure failure here, not a validation
    // one; the 400 path is reserved for schema violations.
    let Json(body) = body.map_err(|rejection| ApiError::Internal {
        context: "Failed to create student",
        detail: rejection.body_text(),
    })?;
    let new = match validate_student(&body) {
        Validated::Valid(new) => new,
        Validated::Invalid(fields) => return Err(ApiError::Validation(fields)),
    };
    let student = state
        .store
        .append_student(new)
        .map_err(|e| ApiError::internal("Failed to create student", e))?;
    debug!(id = %student.id, "student created");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(
            student,
            "Student created successfully",
        )),
    ))
}
