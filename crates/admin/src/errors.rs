use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::render;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("no admin view registered as `{0}`")]
    UnknownView(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("view `{0}` is already registered")]
    DuplicateView(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AdminError {
    pub fn status(&self) -> StatusCode {
        match self {
            AdminError::UnknownView(_) | AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AdminError::DuplicateView(_) | AdminError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(event = "admin_error", status = status.as_u16(), error = %self);
        }
        let title = status.canonical_reason().unwrap_or("Error");
        render::html(status, render::error_page(status.as_u16(), title, &self.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_follow_variant() {
        assert_eq!(AdminError::UnknownView("x".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AdminError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AdminError::Internal("x".into()).into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
