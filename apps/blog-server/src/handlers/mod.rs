//! HTTP handlers and route configuration.

mod accounts;
mod comments;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::http::header;
use actix_web::{HttpRequest, HttpResponse, web};
use blog_core::error::DomainError;
use tera::Context;

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/category/{slug}", web::get().to(posts::by_category))
        .route("/tag/{slug}", web::get().to(posts::by_tag))
        .route("/search", web::get().to(posts::search))
        .route("/post/{id}", web::get().to(posts::detail))
        .service(
            web::resource("/post/{post_id}/comment")
                .route(web::get().to(comments::comment_form))
                .route(web::post().to(comments::create_comment)),
        )
        .service(
            web::resource("/comment/{comment_id}/reply")
                .route(web::get().to(comments::reply_form))
                .route(web::post().to(comments::create_reply)),
        )
        .service(
            web::resource("/comment/{id}/delete")
                .route(web::get().to(comments::confirm_comment_delete))
                .route(web::post().to(comments::delete_comment)),
        )
        .service(
            web::resource("/reply/{id}/delete")
                .route(web::get().to(comments::confirm_reply_delete))
                .route(web::post().to(comments::delete_reply)),
        )
        .service(
            web::scope("/accounts")
                .service(
                    web::resource("/login")
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .route("/logout", web::post().to(accounts::logout)),
        )
        .route("/health", web::get().to(health::health_check));
}

/// Context every page template expects.
fn base_context(identity: &OptionalIdentity) -> Context {
    let mut context = Context::new();
    context.insert("user", &identity.username());
    context.insert("query", "");
    context
}

fn html(state: &AppState, template: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = state.renderer.render(template, context)?;
    Ok(HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body))
}

/// Redirect after a successful form submission.
fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn post_url(post_id: i64) -> String {
    format!("/post/{post_id}")
}

/// Turn a missing login into a redirect back to this request after login.
fn login_or(state: &AppState, req: &HttpRequest) -> impl FnOnce(DomainError) -> AppError {
    let next = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| req.path().to_string());
    let location = state.login_redirect(&next);

    move |err| match err {
        DomainError::AuthenticationRequired => AppError::LoginRequired(location),
        other => other.into(),
    }
}

/// Only local paths are honoured as post-login destinations.
fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| n.starts_with('/') && !n.starts_with("//") && !n.contains('\\'))
}
