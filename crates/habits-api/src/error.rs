use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::pages;

/// Failure taxonomy shared by every handler.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Malformed or out-of-range input.
    #[error("{0}")]
    Validation(String),

    /// Bad username or password. Deliberately does not say which.
    #[error("Invalid credentials")]
    Authentication,

    /// No usable session cookie on a protected route.
    #[error("Not logged in")]
    Unauthenticated,

    /// Valid session, but the target belongs to someone else (or does not parse).
    #[error("Forbidden")]
    Authorization,

    /// Unique key already taken.
    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Conflict(_) => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Unauthenticated => StatusCode::SEE_OTHER,
            Self::Authorization => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Unauthenticated => Redirect::to("/login").into_response(),
            Self::Internal(e) => {
                error!("Request failed: {:#}", e);
                (status, pages::error_page(status, "Something went wrong")).into_response()
            }
            other => (status, pages::error_page(status, &other.to_string())).into_response(),
        }
    }
}
