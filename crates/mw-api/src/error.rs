//! HTTP mapping for [`AppError`].

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use askama::Template;
use mw_core::error::AppError;
use mw_ui::NotFoundTemplate;
use std::fmt;

/// Wraps the core error so actix can turn it into a response.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<askama::Error> for ApiError {
    fn from(err: askama::Error) -> Self {
        ApiError(AppError::Internal(format!("template rendering failed: {err}")))
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.0 {
            AppError::NotFound(_, key) => not_found_page(key),
            AppError::Invalid(errors) => HttpResponse::UnprocessableEntity()
                .content_type("text/plain; charset=utf-8")
                .body(errors.join("\n")),
            AppError::Internal(msg) => {
                log::error!("request failed: {msg}");
                HttpResponse::InternalServerError().finish()
            }
        }
    }
}

/// Renders the 404 page for `condition`, falling back to a bare 404.
pub fn not_found_page(condition: &str) -> HttpResponse {
    let page = NotFoundTemplate {
        title: "Not found".to_string(),
        condition: condition.to_string(),
    };
    match page.render() {
        Ok(html) => HttpResponse::NotFound()
            .content_type("text/html; charset=utf-8")
            .body(html),
        Err(e) => {
            log::error!("404 template failed: {e}");
            HttpResponse::NotFound().finish()
        }
    }
}
