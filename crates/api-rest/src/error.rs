use api_shared::dto::ErrorRes;
use api_shared::AuthError;
use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use ups_core::{NoticeKeyError, PropertyError};

/// Errors a REST handler can answer with.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("{0}")]
    InvalidParameter(String),
    #[error(transparent)]
    Persistence(#[from] PropertyError),
}

impl ApiError {
    pub fn missing_parameter(name: &str) -> Self {
        ApiError::InvalidParameter(format!("The '{name}' parameter is missing"))
    }

    pub fn invalid_notice(e: NoticeKeyError) -> Self {
        ApiError::InvalidParameter(format!(
            "Value of parameter 'notice' ({}) must be one of: [{}]",
            e.value, e.expected
        ))
    }

    pub fn invalid_query(rejection: QueryRejection) -> Self {
        ApiError::InvalidParameter(rejection.body_text())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Auth(AuthError::MissingUserUuid) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::Auth(AuthError::MissingUserUuid) | ApiError::Persistence(_) => {
                tracing::error!("Request failed: {:?}", self);
                "Internal error".to_string()
            }
            ApiError::Auth(_) => "Authentication required".to_string(),
            ApiError::InvalidParameter(message) => message.clone(),
        };
        (status, Json(ErrorRes { error: message })).into_response()
    }
}
