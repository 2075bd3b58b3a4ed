//! HTTP error responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use ledgerlens_core::reports::ReportError;
use ledgerlens_shared::AppError;
use serde_json::json;
use tracing::{error, warn};

/// Handler error rendered as `{"error": ..., "message": ...}`.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl From<ReportError> for ApiError {
    fn from(err: ReportError) -> Self {
        Self(AppError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server-side failures are logged in full and reported generically
        let message = if status.is_server_error() {
            error!(error = %self.0, "Report request failed");
            "An error occurred while generating the report".to_string()
        } else {
            warn!(error = %self.0, "Report request rejected");
            self.0.to_string()
        };

        (
            status,
            Json(json!({
                "error": self.0.error_code(),
                "message": message,
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[case(AppError::Validation("bad".into()), StatusCode::BAD_REQUEST, "VALIDATION_ERROR")]
    #[case(AppError::BusinessRule("cycle".into()), StatusCode::UNPROCESSABLE_ENTITY, "BUSINESS_RULE_VIOLATION")]
    #[case(AppError::Database("down".into()), StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR")]
    #[tokio::test]
    async fn test_error_response(
        #[case] err: AppError,
        #[case] status: StatusCode,
        #[case] code: &str,
    ) {
        let response = ApiError(err).into_response();
        assert_eq!(response.status(), status);

        let body = body_json(response).await;
        assert_eq!(body["error"], code);
    }

    #[tokio::test]
    async fn test_database_details_are_hidden() {
        let response = ApiError(AppError::Database("password authentication failed".into())).into_response();
        let body = body_json(response).await;
        assert!(!body["message"].as_str().unwrap().contains("password"));
    }

    #[tokio::test]
    async fn test_validation_message_is_forwarded() {
        let response = ApiError::from(ReportError::MissingFilter("company")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["message"], "Validation error: Please select a 'company' filter");
    }
}
