use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::features::locations::GeoError;
use crate::shared::types::ApiResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl From<GeoError> for AppError {
    fn from(err: GeoError) -> Self {
        match err {
            GeoError::InvalidCoordinate(msg) | GeoError::InvalidParameter(msg) => {
                AppError::Validation(msg)
            }
            GeoError::NotFound(msg) => AppError::NotFound(msg),
            GeoError::DuplicateIdentity(id) => {
                AppError::BadRequest(format!("Record with id {} already exists", id))
            }
            GeoError::StorageUnavailable(msg) => AppError::ServiceUnavailable(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, errors) = match self {
            AppError::NotFound(ref msg) => (StatusCode::NOT_FOUND, msg.clone(), None),
            AppError::Validation(ref msg) => (
                StatusCode::BAD_REQUEST,
                msg.clone(),
                Some(vec![msg.clone()]),
            ),
            AppError::BadRequest(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            AppError::ServiceUnavailable(ref msg) => {
                tracing::error!("Storage unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Storage is temporarily unavailable".to_string(),
                    None,
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(Some(message), errors));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_geo_error_status_codes() {
        let cases = [
            (GeoError::InvalidCoordinate("lat".into()), StatusCode::BAD_REQUEST),
            (GeoError::InvalidParameter("limit".into()), StatusCode::BAD_REQUEST),
            (GeoError::NotFound("doctor".into()), StatusCode::NOT_FOUND),
            (GeoError::DuplicateIdentity(Uuid::nil()), StatusCode::BAD_REQUEST),
            (
                GeoError::StorageUnavailable("timeout".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (err, expected) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), expected);
        }
    }

    #[tokio::test]
    async fn test_storage_details_not_leaked() {
        let response = AppError::from(GeoError::StorageUnavailable(
            "password authentication failed for user".into(),
        ))
        .into_response();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Storage is temporarily unavailable");
        assert!(!body.to_string().contains("password"));
    }
}
