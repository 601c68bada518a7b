//! Authentication extractors.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use blog_core::domain::Viewer;
use blog_core::ports::{AuthError, TokenClaims};

use crate::state::AppState;

/// Cookie carrying the access token for browser sessions.
pub const AUTH_COOKIE: &str = "access_token";

/// Authenticated user identity.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl From<TokenClaims> for Identity {
    fn from(claims: TokenClaims) -> Self {
        Self {
            user_id: claims.user_id,
            username: claims.username,
        }
    }
}

impl Identity {
    /// Resolve the identity from a Bearer header, else the session cookie.
    /// Other authorization schemes are left to the cookie.
    fn from_http(req: &HttpRequest) -> Result<Self, AuthError> {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            tracing::error!("AppState not found in app data");
            return Err(AuthError::InvalidToken(
                "Server configuration error".to_string(),
            ));
        };

        let bearer = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_string);

        let token = match bearer {
            Some(token) => token,
            None => req
                .cookie(AUTH_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .ok_or(AuthError::MissingAuth)?,
        };

        state.tokens.validate_token(&token).map(Identity::from)
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
///
/// Expired or tampered tokens count as anonymous.
pub struct OptionalIdentity(pub Option<Identity>);

impl OptionalIdentity {
    pub fn viewer(&self) -> Viewer {
        match &self.0 {
            Some(identity) => Viewer::Authenticated {
                user_id: identity.user_id,
            },
            None => Viewer::Anonymous,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.0.as_ref().map(|identity| identity.username.as_str())
    }
}

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match Identity::from_http(req) {
            Ok(identity) => ready(Ok(OptionalIdentity(Some(identity)))),
            Err(AuthError::MissingAuth) => ready(Ok(OptionalIdentity(None))),
            Err(e) => {
                tracing::debug!("Ignoring credentials: {}", e);
                ready(Ok(OptionalIdentity(None)))
            }
        }
    }
}
