//! Access control for protected handlers.
//!
//! Handlers declare what they need through their argument types: taking an
//! [`Authenticated`] requires any valid token, taking an [`AdminOnly`] also
//! requires the admin claim. Both run before the handler body.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, FromRequest, HttpRequest};
use common::{Claims, Result, WipiError, BEARER_PREFIX};
use futures::future::{ready, Ready};
use log::warn;
use std::sync::Arc;

use super::token::TokenService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    Operator,
    Admin,
}

#[derive(Clone)]
pub struct AccessGuard {
    tokens: Arc<TokenService>,
}

impl AccessGuard {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Validates the raw `Authorization` header value against `required`.
    pub fn authorize(&self, header: Option<&str>, required: Privilege) -> Result<Claims> {
        let token = header
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(WipiError::unauthorized)?;

        let check = match self.tokens.verify(token) {
            Ok(check) => check,
            Err(e) => {
                warn!("Rejected access token: {}", e);
                return Err(WipiError::unauthorized());
            }
        };

        if !check.valid {
            return Err(WipiError::TokenExpired);
        }

        if required == Privilege::Admin && !check.claims.admin {
            warn!("User {} attempted an admin operation", check.claims.username);
            return Err(WipiError::unauthorized());
        }

        Ok(check.claims)
    }

    fn authorize_request(req: &HttpRequest, required: Privilege) -> Result<Claims> {
        let guard = req
            .app_data::<web::Data<AccessGuard>>()
            .ok_or_else(|| WipiError::InternalError("access guard not configured".to_string()))?;

        let header = req
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        guard.authorize(header, required)
    }
}

/// Claims of a caller holding any valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Claims of a caller holding a valid admin token.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub Claims);

impl FromRequest for Authenticated {
    type Error = WipiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AccessGuard::authorize_request(req, Privilege::Operator).map(Authenticated))
    }
}

impl FromRequest for AdminOnly {
    type Error = WipiError;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(AccessGuard::authorize_request(req, Privilege::Admin).map(AdminOnly))
    }
}
