//! JWT access token issuance and verification.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rollcall_core::models::role::Role;
use rollcall_core::models::user::User;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::error::AuthError;

/// JWT claims embedded in every access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Subject: user ID (UUID string).
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed HS256 JWT access token for `user`.
pub fn issue_access_token(user: &User, config: &AuthConfig) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let lifetime = i64::try_from(config.access_token_lifetime_secs).unwrap_or(i64::MAX);
    let claims = AccessTokenClaims {
        sub: user.id.to_string(),
        email: user.email.clone(),
        role: user.role,
        name: user.name.clone(),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now.saturating_add(lifetime),
        jti: Uuid::new_v4().to_string(),
    };
    encode_claims(&claims, config)
}

pub(crate) fn encode_claims(
    claims: &AccessTokenClaims,
    config: &AuthConfig,
) -> Result<String, AuthError> {
    if config.jwt_secret.is_empty() {
        return Err(AuthError::Crypto("JWT secret is not configured".into()));
    }
    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &key)
        .map_err(|e| AuthError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify an HS256 JWT access token (signature, expiry,
/// issuer).
///
/// Expiry is reported as [`AuthError::TokenExpired`]; every other
/// failure (bad signature, garbage input, wrong issuer) as
/// [`AuthError::TokenInvalid`].
pub fn decode_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<AccessTokenClaims, AuthError> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);
    validation.leeway = 0;

    jsonwebtoken::decode::<AccessTokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

/// Validated JWT claims. A newtype proving the token was verified.
///
/// Used by the API layer to extract authenticated context from
/// incoming requests.
#[derive(Debug, Clone)]
pub struct ValidatedClaims(pub AccessTokenClaims);

impl ValidatedClaims {
    pub fn user_id(&self) -> &str {
        &self.0.sub
    }

    pub fn role(&self) -> Role {
        self.0.role
    }
}

/// Validate a bearer token and return the verified claims.
///
/// Purely stateless: no database lookup is performed.
pub fn validate_access_token(
    token: &str,
    config: &AuthConfig,
) -> Result<ValidatedClaims, AuthError> {
    decode_access_token(token, config).map(ValidatedClaims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rollcall_core::models::user::LifecycleState;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "an-hmac-secret-of-at-least-32-bytes!!".into(),
            jwt_issuer: "rollcall-test".into(),
            ..AuthConfig::default()
        }
    }

    fn test_user(role: Role) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            role,
            lifecycle_state: LifecycleState::Active,
            national_id: Some("42".into()),
            external_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn jwt_roundtrip_carries_identity_and_role() {
        let config = test_config();
        let user = test_user(Role::Secretary);

        let token = issue_access_token(&user, &config).unwrap();
        let claims = decode_access_token(&token, &config).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, "grace@example.com");
        assert_eq!(claims.role, Role::Secretary);
        assert_eq!(claims.name, "Grace Hopper");
        assert_eq!(claims.iss, "rollcall-test");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn jti_is_unique() {
        let config = test_config();
        let user = test_user(Role::Student);

        let t1 = issue_access_token(&user, &config).unwrap();
        let t2 = issue_access_token(&user, &config).unwrap();

        let c1 = decode_access_token(&t1, &config).unwrap();
        let c2 = decode_access_token(&t2, &config).unwrap();
        assert_ne!(c1.jti, c2.jti);
    }

    #[test]
    fn expired_token_is_reported_as_expired() {
        let config = test_config();
        let now = Utc::now().timestamp();
        let claims = AccessTokenClaims {
            sub: Uuid::new_v4().to_string(),
            email: "old@example.com".into(),
            role: Role::Student,
            name: "Old".into(),
            iss: config.jwt_issuer.clone(),
            iat: now - 7200,
            exp: now - 3600,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode_claims(&claims, &config).unwrap();

        let err = decode_access_token(&token, &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let config = test_config();
        let token = issue_access_token(&test_user(Role::Student), &config).unwrap();

        let other = AuthConfig {
            jwt_secret: "a-completely-different-secret-value!!".into(),
            ..test_config()
        };
        let err = decode_access_token(&token, &other).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));

        let err = decode_access_token("not.a.jwt", &config).unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid(_)));
    }

    #[test]
    fn wrong_issuer_is_invalid() {
        let config = test_config();
        let token = issue_access_token(&test_user(Role::Admin), &config).unwrap();
        let other = AuthConfig {
            jwt_issuer: "someone-else".into(),
            ..test_config()
        };
        assert!(matches!(
            decode_access_token(&token, &other),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn missing_secret_refuses_to_sign() {
        let config = AuthConfig::default();
        let err = issue_access_token(&test_user(Role::Student), &config).unwrap_err();
        assert!(matches!(err, AuthError::Crypto(_)));
    }
}
