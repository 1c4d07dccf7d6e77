use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bs_core::Error;
use serde_json::json;

/// A library error on its way out as a JSON `{ "error": ... }` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::MissingApiKey | Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Error::SitemapParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Error::DuplicateSitemap(_) | Error::InvalidTransition { .. } => StatusCode::CONFLICT,
            Error::SitemapNotFound(_) => StatusCode::NOT_FOUND,
            Error::SettingsSave(_) | Error::Publish(_) | Error::Http(_) | Error::Api { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!("{}: {}", self.status, self.message);
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;
