//! JWT access tokens for the SmartQ API.
//!
//! Access tokens are HMAC-SHA256 JWTs signed with the server's `SQ_JWT_SIGNING_KEY`. Handlers that need the
//! caller's identity take a [`JwtClaims`] argument; its `FromRequest` impl pulls the token out of the
//! `Authorization: Bearer` header and validates it against the [`TokenIssuer`] stored in app data.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
    TimeOptions,
    UntrustedToken,
};
use serde::{Deserialize, Serialize};

use crate::{config::AuthConfig, errors::AuthError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The authenticated user's id.
    pub sub: String,
    pub email: String,
}

pub struct TokenIssuer {
    key: Hs256Key,
    expiry: chrono::Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let key = Hs256Key::new(config.jwt_signing_key.reveal().as_bytes());
        Self { key, expiry: config.jwt_expiry }
    }

    /// Issue a new access token for the given user.
    pub fn issue_token(&self, claims: JwtClaims) -> Result<String, AuthError> {
        let time_options = TimeOptions::default();
        let claims = Claims::new(claims).set_duration_and_issuance(&time_options, self.expiry);
        let header = Header::empty().with_token_type("JWT");
        Hs256.token(&header, &claims, &self.key).map_err(|e| AuthError::ValidationError(e.to_string()))
    }

    /// Validate an access token, returning its claims. Checks the signature and the expiry time.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let untrusted = UntrustedToken::new(token).map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
        let token = Hs256
            .validator::<JwtClaims>(&self.key)
            .validate(&untrusted)
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        token
            .claims()
            .validate_expiration(&TimeOptions::default())
            .map_err(|e| AuthError::ValidationError(e.to_string()))?;
        Ok(token.claims().custom.clone())
    }
}

fn claims_from_request(req: &HttpRequest) -> Result<JwtClaims, AuthError> {
    let header = req.headers().get("Authorization").ok_or(AuthError::MissingToken)?;
    let value = header.to_str().map_err(|e| AuthError::PoorlyFormattedToken(e.to_string()))?;
    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        AuthError::PoorlyFormattedToken("Authorization header is not a Bearer token".to_string())
    })?;
    let issuer = req
        .app_data::<web::Data<TokenIssuer>>()
        .ok_or_else(|| AuthError::ValidationError("Token issuer is not configured".to_string()))?;
    issuer.validate_token(token.trim())
}

impl FromRequest for JwtClaims {
    type Error = crate::errors::ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(claims_from_request(req).map_err(crate::errors::ServerError::AuthenticationError))
    }
}
