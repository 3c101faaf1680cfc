//! Bearer-token authentication.
//!
//! Tokens are HS256 JWTs issued elsewhere; this service only verifies them
//! and turns the claims into a [`Principal`].

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::messages::{self, MessageCatalog};
use crate::schemas::AppState;

pub const ROLE_ADMIN: &str = "ADMIN";

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username or email of the user
    pub sub: String,
    /// Id of the user
    pub uid: i32,
    #[serde(default)]
    pub roles: Vec<String>,
    pub exp: i64,
    #[serde(default)]
    pub iat: i64,
}

pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier").finish_non_exhaustive()
    }
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(token, &self.key, &self.validation).map(|data| data.claims)
    }
}

/// The authenticated identity attached to a request.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: i32,
    /// Username or email, as written in the token
    pub login: String,
    pub roles: Vec<String>,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.uid,
            login: claims.sub,
            roles: claims.roles,
        }
    }
}

impl Principal {
    /// Accepts both `ADMIN` and the `ROLE_ADMIN` spelling.
    pub fn is_admin(&self) -> bool {
        self.roles
            .iter()
            .any(|role| role.strip_prefix("ROLE_").unwrap_or(role) == ROLE_ADMIN)
    }

    pub fn require_admin(&self, catalog: &MessageCatalog) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            warn!("User '{}' attempted an administrator operation", self.login);
            Err(ApiError::AccessDenied(catalog.get(messages::ADMIN_REQUIRED)))
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let unauthorized = || ApiError::Unauthorized(state.messages.get(messages::UNAUTHORIZED));

        let token = bearer_token(parts).ok_or_else(|| {
            debug!("Request without bearer token");
            unauthorized()
        })?;

        let claims = state.auth.verify(token).map_err(|e| {
            warn!("Rejected access token: {}", e);
            unauthorized()
        })?;

        debug!("Authenticated '{}' (id {})", claims.sub, claims.uid);
        Ok(Principal::from(claims))
    }
}

/// A [`Principal`] holding the administrator role.
///
/// Rejects with 403 before the request body is read, so non-admins never
/// see payload validation errors.
#[derive(Debug, Clone)]
pub struct AdminPrincipal(pub Principal);

#[async_trait]
impl<S> FromRequestParts<S> for AdminPrincipal
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);
        principal.require_admin(&app_state.messages)?;
        Ok(AdminPrincipal(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, exp: i64) -> String {
        let claims = Claims {
            sub: "admin".to_string(),
            uid: 1,
            roles: vec!["ROLE_ADMIN".to_string()],
            exp,
            iat: 0,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_accepts_valid_token() {
        let verifier = JwtVerifier::new("secret");
        let claims = verifier
            .verify(&token("secret", chrono::Utc::now().timestamp() + 600))
            .unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.uid, 1);
    }

    #[test]
    fn test_verify_rejects_wrong_secret_and_expired() {
        let verifier = JwtVerifier::new("secret");
        let future = chrono::Utc::now().timestamp() + 600;
        assert!(verifier.verify(&token("other", future)).is_err());
        assert!(verifier.verify(&token("secret", 1_000)).is_err());
        assert!(verifier.verify("not-a-token").is_err());
    }

    #[test]
    fn test_admin_role_spellings() {
        let mut principal = Principal {
            user_id: 1,
            login: "admin".to_string(),
            roles: vec!["ADMIN".to_string()],
        };
        assert!(principal.is_admin());
        principal.roles = vec!["ROLE_ADMIN".to_string()];
        assert!(principal.is_admin());
        principal.roles = vec!["USER".to_string(), "ROLE_USER".to_string()];
        assert!(!principal.is_admin());
        assert!(matches!(
            principal.require_admin(&MessageCatalog::builtin()),
            Err(ApiError::AccessDenied(_))
        ));
    }
}
