//! HS256 session tokens.
//!
//! A token carries the actor triple `{sub, role_id, branch_id}`. Every
//! authenticated response reissues a fresh token, so an active admin never
//! hits the expiry while idle admins do.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use stockroom_core::{AdminRole, AdminUserId, BranchId};

use super::AuthError;
use crate::models::CurrentAdmin;

/// Claims stored in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Admin user id.
    pub sub: i32,
    /// [`AdminRole::role_id`] of the admin.
    pub role_id: i32,
    pub branch_id: i32,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued at (Unix timestamp).
    pub iat: i64,
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("keys", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenService {
    /// Build a token service from the signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Issue a token for an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Encoding` if signing fails.
    pub fn issue(&self, admin: &CurrentAdmin) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);

        let claims = Claims {
            sub: admin.id.as_i32(),
            role_id: admin.role.role_id(),
            branch_id: admin.branch_id.as_i32(),
            exp: now.saturating_add(ttl),
            iat: now,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Validate a token and recover the admin it was issued to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ExpiredToken` if the token has expired,
    /// `AuthError::UnknownRole` if the role id is not recognised, and
    /// `AuthError::InvalidToken` for any other failure.
    pub fn validate(&self, token: &str) -> Result<CurrentAdmin, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            }
        })?;

        let claims = data.claims;
        let role =
            AdminRole::from_role_id(claims.role_id).ok_or(AuthError::UnknownRole(claims.role_id))?;

        Ok(CurrentAdmin {
            id: AdminUserId::new(claims.sub),
            role,
            branch_id: BranchId::new(claims.branch_id),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn service(ttl: Duration) -> TokenService {
        TokenService::new(
            &SecretString::from("q8Z!vR2#mL9@tX4$wK7%nB3^hJ6&pF1*"),
            ttl,
        )
    }

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::new(42),
            role: AdminRole::Admin,
            branch_id: BranchId::new(2),
        }
    }

    #[test]
    fn test_issue_then_validate() {
        let tokens = service(Duration::from_secs(3600));
        let token = tokens.issue(&admin()).unwrap();
        assert_eq!(tokens.validate(&token).unwrap(), admin());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let token = service(Duration::from_secs(3600)).issue(&admin()).unwrap();
        let other = TokenService::new(
            &SecretString::from("a-completely-different-signing-key-000"),
            Duration::from_secs(3600),
        );
        assert!(matches!(other.validate(&token), Err(AuthError::InvalidToken)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = service(Duration::from_secs(3600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            role_id: 2,
            branch_id: 2,
            exp: now - 120,
            iat: now - 3720,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &tokens.encoding_key).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::ExpiredToken)));
    }

    #[test]
    fn test_unknown_role_rejected() {
        let tokens = service(Duration::from_secs(3600));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: 42,
            role_id: 99,
            branch_id: 2,
            exp: now + 600,
            iat: now,
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &tokens.encoding_key).unwrap();
        assert!(matches!(tokens.validate(&token), Err(AuthError::UnknownRole(99))));
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(matches!(
            service(Duration::from_secs(60)).validate("not.a.token"),
            Err(AuthError::InvalidToken)
        ));
    }
}
