//! Login and logout.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::{HttpResponse, web};
use blog_core::error::DomainError;
use blog_shared::dto::{LoginForm, NextParams};

use super::{base_context, html, safe_next};
use crate::middleware::auth::{AUTH_COOKIE, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /accounts/login
pub async fn login_form(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    params: web::Query<NextParams>,
) -> AppResult<HttpResponse> {
    render_login(&state, &identity, "", params.next.as_deref(), None)
}

/// POST /accounts/login
pub async fn login(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let form = form.into_inner();

    let session = match state.accounts.login(form.username.trim(), &form.password).await {
        Ok(session) => session,
        Err(DomainError::InvalidCredentials) => {
            return render_login(
                &state,
                &identity,
                &form.username,
                form.next.as_deref(),
                Some("Please enter a correct username and password."),
            );
        }
        Err(e) => return Err(e.into()),
    };

    let cookie = Cookie::build(AUTH_COOKIE, session.token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .max_age(Duration::seconds(session.expires_in))
        .finish();

    let location = safe_next(form.next.as_deref()).unwrap_or("/");
    Ok(HttpResponse::SeeOther()
        .insert_header((actix_web::http::header::LOCATION, location))
        .cookie(cookie)
        .finish())
}

/// POST /accounts/logout
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    let mut cookie = Cookie::build(AUTH_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.secure_cookies)
        .finish();
    cookie.make_removal();

    HttpResponse::SeeOther()
        .insert_header((actix_web::http::header::LOCATION, "/"))
        .cookie(cookie)
        .finish()
}

fn render_login(
    state: &AppState,
    identity: &OptionalIdentity,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
) -> AppResult<HttpResponse> {
    let mut context = base_context(identity);
    context.insert("username", username);
    context.insert("next", safe_next(next).unwrap_or(""));
    context.insert("error", &error);
    html(state, "login.html", &context)
}
