use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{csrf::CsrfError, models::StoreError, views};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(id) => AppError::NotFound(format!("Cafe {id} not found")),
            // add_cafe показывает дубликат в самой форме; сюда попадают прочие вызовы insert
            dup @ StoreError::DuplicateName(_) => AppError::BadRequest(dup.to_string()),
            StoreError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                AppError::Internal(err.to_string())
            }
        }
    }
}

impl From<CsrfError> for AppError {
    fn from(e: CsrfError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            // детали уже в логах, пользователю не показываем
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Something went wrong. Please try again later.".to_string(),
            ),
        };

        (status, views::error_page(status, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_statuses() {
        let not_found = AppError::from(StoreError::NotFound(3)).into_response();
        assert_eq!(not_found.status(), StatusCode::NOT_FOUND);

        let duplicate = AppError::from(StoreError::DuplicateName("Joe".into()));
        assert!(matches!(duplicate, AppError::BadRequest(ref msg) if msg.contains("\"Joe\"")));
        assert_eq!(duplicate.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = AppError::from(StoreError::Database(sqlx::Error::RowNotFound)).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn csrf_errors_are_bad_requests() {
        let response = AppError::from(CsrfError::MissingSession).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[axum::http::header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }
}
