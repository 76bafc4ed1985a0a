use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Dependency(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Dependency(_) => StatusCode::BAD_GATEWAY,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self, "Request failed");
        }
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Failures raised while guarding or advancing a rent record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RentRecordError {
    #[error("{field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("Rent for {rent_month} is already paid for this tenant and property.")]
    DuplicateRentRecord {
        tenant_id: String,
        property_id: String,
        rent_month: String,
    },
    #[error("Rent record store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Cannot move rent record from '{from}' to '{to}'.")]
    InvalidTransition { from: &'static str, to: &'static str },
}

impl RentRecordError {
    pub fn missing(field: &'static str) -> Self {
        Self::Validation {
            field,
            message: "is required.".to_string(),
        }
    }
}

impl From<RentRecordError> for AppError {
    fn from(error: RentRecordError) -> Self {
        match error {
            RentRecordError::Validation { .. } | RentRecordError::InvalidTransition { .. } => {
                AppError::UnprocessableEntity(error.to_string())
            }
            RentRecordError::DuplicateRentRecord { .. } => AppError::Conflict(error.to_string()),
            RentRecordError::StoreUnavailable(_) => {
                AppError::ServiceUnavailable(error.to_string())
            }
        }
    }
}
