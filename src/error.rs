use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

use crate::models::week::WeekKey;

/// Typed failures surfaced to route handlers. The handler layer owns the
/// user-facing messaging; collaborator failures (email, webhook) are logged
/// at the call site and never reach this type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("the order window for week {}/{} is closed", .0.week, .0.year)]
    WindowClosed(WeekKey),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid menu: {0}")]
    InvalidMenu(String),

    #[error("unknown kiosk token")]
    UnknownToken,

    #[error("{0} is outside the lunch service calendar")]
    OutOfRange(NaiveDate),

    #[error("access denied")]
    Forbidden,

    #[error("too many requests, try again in a minute")]
    RateLimited,

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::WindowClosed(_) => StatusCode::CONFLICT,
            AppError::InvalidSelection(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidMenu(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::UnknownToken => StatusCode::NOT_FOUND,
            AppError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code so clients can distinguish e.g.
    /// "window_closed" from a generic conflict.
    fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyExists(_) => "already_exists",
            AppError::WindowClosed(_) => "window_closed",
            AppError::InvalidSelection(_) => "invalid_selection",
            AppError::InvalidMenu(_) => "invalid_menu",
            AppError::UnknownToken => "unknown_token",
            AppError::OutOfRange(_) => "out_of_range",
            AppError::Forbidden => "forbidden",
            AppError::RateLimited => "rate_limited",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Database(ref e) = self {
            tracing::error!("Database error: {}", e);
        }
        if let AppError::Internal(ref e) = self {
            tracing::error!("Internal error: {}", e);
        }
        let body = Json(json!({ "error": self.to_string(), "code": self.code() }));
        (self.status(), body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_distinguish_failure_kinds() {
        let wk = WeekKey { week: 42, year: 2025 };
        assert_eq!(AppError::NotFound("menu").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::AlreadyExists("menu".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::WindowClosed(wk).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidSelection("x".into()).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::UnknownToken.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn closed_window_and_duplicate_menu_share_status_but_not_code() {
        let wk = WeekKey { week: 7, year: 2026 };
        assert_eq!(AppError::WindowClosed(wk).code(), "window_closed");
        assert_eq!(AppError::AlreadyExists("menu".into()).code(), "already_exists");
    }
}
