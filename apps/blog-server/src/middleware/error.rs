//! Error handling middleware - HTML error pages built from RFC 7807 details.

use std::fmt;
use std::sync::LazyLock;

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, ResponseError};
use blog_core::error::{DomainError, RepoError};
use blog_shared::ErrorResponse;
use tera::Context;

use crate::render::Renderer;

static ERROR_PAGES: LazyLock<Option<Renderer>> = LazyLock::new(|| match Renderer::embedded() {
    Ok(renderer) => Some(renderer),
    Err(e) => {
        tracing::error!("Error page templates failed to load: {}", e);
        None
    }
});

/// Application-level error type rendered as an HTML error page.
#[derive(Debug)]
pub enum AppError {
    NotFound,
    BadRequest(String),
    Unauthorized(String),
    /// Send the client to the login page at the given location.
    LoginRequired(String),
    Conflict(String),
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound => write!(f, "Not found"),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::LoginRequired(location) => write!(f, "Login required: {}", location),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::LoginRequired(_) => StatusCode::FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let problem = match self {
            AppError::LoginRequired(location) => {
                return HttpResponse::Found()
                    .insert_header((header::LOCATION, location.as_str()))
                    .finish();
            }
            AppError::NotFound => ErrorResponse::not_found(),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::Unauthorized(detail) => {
                ErrorResponse::new(401, "Unauthorized").with_detail(detail)
            }
            AppError::Conflict(detail) => ErrorResponse::conflict(detail),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code())
            .content_type("text/html; charset=utf-8")
            .body(error_page(&problem))
    }
}

fn error_page(problem: &ErrorResponse) -> String {
    let mut context = Context::new();
    context.insert("user", &Option::<String>::None);
    context.insert("query", "");
    context.insert("error", problem);

    let rendered = ERROR_PAGES
        .as_ref()
        .map(|pages| pages.render("error.html", &context));

    match rendered {
        Some(Ok(html)) => html,
        Some(Err(e)) => {
            tracing::error!("Error page failed to render: {}", e);
            format!("{} {}", problem.status, problem.title)
        }
        None => format!("{} {}", problem.status, problem.title),
    }
}

// Conversion from domain errors
impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity, key } => {
                tracing::debug!(entity, key = %key, "Not found");
                AppError::NotFound
            }
            DomainError::Validation(errors) => AppError::BadRequest(errors.to_string()),
            DomainError::AuthenticationRequired => {
                AppError::Unauthorized("Please log in to continue.".to_string())
            }
            DomainError::InvalidCredentials => {
                AppError::Unauthorized("Invalid username or password.".to_string())
            }
            DomainError::Duplicate(msg) => AppError::Conflict(msg),
            DomainError::Repository(err) => err.into(),
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound => AppError::NotFound,
            RepoError::Constraint(msg) => AppError::Conflict(msg),
            RepoError::Connection(msg) => {
                tracing::error!("Database connection error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!("Database query error: {}", msg);
                AppError::Internal("Database error".to_string())
            }
        }
    }
}

impl From<tera::Error> for AppError {
    fn from(err: tera::Error) -> Self {
        AppError::Internal(format!("template error: {err:?}"))
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;

    use super::*;

    #[actix_web::test]
    async fn test_not_found_hides_entity_details() {
        let err: AppError = DomainError::not_found("post", 7).into();
        let response = err.error_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body()).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("404 Not Found"));
        assert!(!body.contains("post 7"));
    }

    #[actix_web::test]
    async fn test_login_required_redirects() {
        let response =
            AppError::LoginRequired("/accounts/login?next=%2F".to_string()).error_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/accounts/login?next=%2F"
        );
    }

    #[test]
    fn test_repository_failures_are_internal() {
        let err: AppError = DomainError::Repository(RepoError::Query("boom".into())).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let err: AppError = RepoError::Constraint("dup".into()).into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }
}
