use crate::auth::AuthError;
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// JSON error envelope `{error, details?}` for every failing route, including
/// request bodies that do not parse.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error: String,
    details: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            details: None,
        }
    }

    pub fn internal(error: impl Into<String>, details: impl ToString) -> Self {
        Self {
            details: Some(details.to_string()),
            ..Self::new(StatusCode::INTERNAL_SERVER_ERROR, error)
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Envelope {
            error: &self.error,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::EmailInUse => StatusCode::CONFLICT,
            AuthError::WeakPassword => StatusCode::BAD_REQUEST,
        };
        Self::new(status, err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            error: "Invalid request body".into(),
            details: Some(rejection.body_text()),
        }
    }
}
