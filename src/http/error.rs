use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::envelope::ApiResponse;
use crate::validate::FieldError;

/// Route-level failures, rendered as envelope bodies. Validation problems
/// name the offending fields; everything else collapses to a fixed per-route
/// error string with the underlying detail carried in `message`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("{context}")]
    Internal {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, source: anyhow::Error) -> Self {
        Self::Internal {
            context,
            detail: format!("{source:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(fields) => {
                let message = fields
                    .iter()
                    .map(|f| format!("{} {}", f.field, f.message))
                    .collect::<Vec<_>>()
                    .join("; ");
                let body = ApiResponse::<()>::fail("Validation failed", Some(message));
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            ApiError::Internal { context, detail } => {
                error!(%context, %detail, "request failed");
                let message = (!detail.is_empty()).then_some(detail);
                let body = ApiResponse::<()>::fail(context, message);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_renders_400_with_joined_fields() {
        let err = ApiError::Validation(vec![
            FieldError {
                field: "firstName",
                message: "is required".into(),
            },
            FieldError {
                field: "email",
                message: "is required".into(),
            },
        ]);
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": "Validation failed",
                "message": "firstName is required; email is required"
            })
        );
    }

    #[tokio::test]
    async fn internal_renders_500_with_fixed_error_and_detail() {
        let err = ApiError::internal("Failed to fetch students", anyhow::anyhow!("disk on fire"));
        let (status, body) = render(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            serde_json::json!({
                "success": false,
                "error": "Failed to fetch students",
                "message": "disk on fire"
            })
        );
    }

    #[tokio::test]
    async fn internal_without_detail_omits_message() {
        let err = ApiError::Internal {
            context: "Failed to fetch students",
            detail: String::new(),
        };
        let (_, body) = render(err).await;
        assert_eq!(
            body,
            serde_json::json!({"success": false, "error": "Failed to fetch students"})
        );
    }
}
